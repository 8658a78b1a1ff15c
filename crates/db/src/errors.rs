//! Translation of driver errors into the domain taxonomy.
//!
//! Only constraint names are inspected; driver text is kept for the logs and
//! never shown to callers.

use eyre::eyre;
use gym_core::errors::{EntityKind, GymError};
use sqlx::error::ErrorKind;

use crate::schema::constraints;

fn referenced_entity(constraint: &str) -> Option<EntityKind> {
    let kind = match constraint {
        constraints::MEMBERS_USER_FK => EntityKind::User,
        constraints::MEMBERSHIPS_MEMBER_FK
        | constraints::BOOKINGS_MEMBER_FK
        | constraints::ATTENDANCE_MEMBER_FK
        | constraints::PAYMENTS_MEMBER_FK => EntityKind::Member,
        constraints::MEMBERSHIPS_PLAN_FK => EntityKind::Plan,
        constraints::CLASSES_GYM_FK => EntityKind::Gym,
        constraints::CLASSES_TRAINER_FK => EntityKind::Trainer,
        constraints::SESSIONS_CLASS_FK => EntityKind::Class,
        constraints::BOOKINGS_SESSION_FK | constraints::ATTENDANCE_SESSION_FK => {
            EntityKind::Session
        }
        _ => return None,
    };
    Some(kind)
}

pub fn map_db_error(err: sqlx::Error) -> GymError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or_default();
        match db_err.kind() {
            ErrorKind::UniqueViolation => match constraint {
                constraints::BOOKINGS_ACTIVE_UNIQUE => return GymError::AlreadyBooked,
                constraints::ATTENDANCE_UNIQUE => return GymError::AlreadyCheckedIn,
                constraints::MEMBERS_USER_UNIQUE => {
                    return GymError::Validation(
                        "User already has a member profile".to_string(),
                    );
                }
                constraints::USERS_EMAIL => {
                    return GymError::DuplicateIdentity("this address".to_string());
                }
                _ => {}
            },
            ErrorKind::ForeignKeyViolation => {
                if let Some(kind) = referenced_entity(constraint) {
                    return GymError::InvalidReference(kind);
                }
            }
            ErrorKind::CheckViolation => {
                tracing::warn!(constraint, "check constraint rejected a write");
                return GymError::Validation("Value is out of the accepted range".to_string());
            }
            _ => {}
        }
    }

    GymError::persistence(eyre!(err))
}

/// Like [`map_db_error`], but reports a duplicate email with the address.
pub fn map_user_insert_error(err: sqlx::Error, email: &str) -> GymError {
    match map_db_error(err) {
        GymError::DuplicateIdentity(_) => GymError::DuplicateIdentity(email.to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(constraints::MEMBERSHIPS_MEMBER_FK, EntityKind::Member)]
    #[case(constraints::MEMBERSHIPS_PLAN_FK, EntityKind::Plan)]
    #[case(constraints::CLASSES_TRAINER_FK, EntityKind::Trainer)]
    #[case(constraints::BOOKINGS_SESSION_FK, EntityKind::Session)]
    #[case(constraints::SESSIONS_CLASS_FK, EntityKind::Class)]
    fn foreign_keys_name_their_entity(#[case] constraint: &str, #[case] expected: EntityKind) {
        assert_eq!(referenced_entity(constraint), Some(expected));
    }

    #[test]
    fn unknown_constraint_has_no_entity() {
        assert_eq!(referenced_entity("something_else_fkey"), None);
    }

    #[test]
    fn non_database_errors_are_opaque() {
        let err = map_db_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, GymError::Persistence(_)));
        assert_eq!(err.to_string(), "Persistence failure");
    }
}
