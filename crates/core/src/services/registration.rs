use std::sync::Arc;

use chrono::{DateTime, Months, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::PasswordHasher;
use crate::errors::{EntityKind, GymError, GymResult};
use crate::models::member::{EmergencyContact, Member};
use crate::models::membership::{Membership, OverlapPolicy};
use crate::models::user::{normalize_email, RegisterRequest, RegisterResponse, Role, User};
use crate::services::memberships::insert_checked;
use crate::services::{finish, ServiceContext};
use crate::store::Transaction;

/// Everything a member-role sign-up writes besides the user row.
struct Enrollment {
    plan_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    auto_renew: bool,
}

/// Registration Orchestrator.
///
/// Creates the user, and for members the profile and first membership, in a
/// single transaction. A failure at any step leaves nothing behind.
#[derive(Clone)]
pub struct RegistrationService {
    ctx: ServiceContext,
    hasher: Arc<dyn PasswordHasher>,
    overlap_policy: OverlapPolicy,
}

impl RegistrationService {
    pub fn new(
        ctx: ServiceContext,
        hasher: Arc<dyn PasswordHasher>,
        overlap_policy: OverlapPolicy,
    ) -> Self {
        Self {
            ctx,
            hasher,
            overlap_policy,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> GymResult<RegisterResponse> {
        self.ctx
            .within("registration.register", self.register_inner(request))
            .await
    }

    async fn register_inner(&self, request: RegisterRequest) -> GymResult<RegisterResponse> {
        let now = self.ctx.clock.now();
        let RegisterRequest {
            identity,
            password,
            plan_id,
            membership_start,
            membership_end,
            auto_renew,
        } = request;

        let email = normalize_email(&identity.email);
        if email.is_empty() || !email.contains('@') {
            return Err(GymError::Validation(
                "A valid email address is required".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(GymError::Validation("Password cannot be empty".to_string()));
        }

        let enrollment = if identity.role == Role::Member {
            let plan_id = plan_id.ok_or_else(|| {
                GymError::Validation("plan_id is required when registering a member".to_string())
            })?;
            let start = membership_start.unwrap_or(now);
            let end = match membership_end {
                Some(end) => end,
                None => start.checked_add_months(Months::new(1)).ok_or_else(|| {
                    GymError::Validation(format!("cannot derive a membership end from {start}"))
                })?,
            };
            crate::time::ensure_window(start, end)?;
            Some(Enrollment {
                plan_id,
                start,
                end,
                auto_renew: auto_renew.unwrap_or(true),
            })
        } else {
            if plan_id.is_some()
                || membership_start.is_some()
                || membership_end.is_some()
                || auto_renew.is_some()
            {
                return Err(GymError::Validation(format!(
                    "membership fields are only accepted when registering a member, not a {}",
                    identity.role
                )));
            }
            None
        };

        let password_hash = self.hasher.hash(&password)?;

        let user = User {
            id: Uuid::new_v4(),
            first_name: identity.first_name,
            last_name: identity.last_name,
            email,
            password_hash,
            phone_number: identity.phone_number,
            date_of_birth: identity.date_of_birth,
            gender: identity.gender,
            fitness_goals: identity.fitness_goals,
            emergency_contact_name: identity.emergency_contact_name,
            emergency_contact_phone: identity.emergency_contact_phone,
            role: identity.role,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.ctx.db.begin().await?;
        let result = write_registration(tx.as_mut(), user, enrollment, self.overlap_policy, now).await;
        let response = finish(tx, result).await.inspect_err(|err| {
            if err.is_conflict() || matches!(err, GymError::InvalidReference(_)) {
                warn!(error = %err, "registration rejected");
            }
        })?;

        info!(
            user_id = %response.user.id,
            role = %response.user.role,
            member_id = ?response.member.as_ref().map(|m| m.id),
            "user registered"
        );
        Ok(response)
    }
}

async fn write_registration(
    tx: &mut dyn Transaction,
    user: User,
    enrollment: Option<Enrollment>,
    policy: OverlapPolicy,
    now: DateTime<Utc>,
) -> GymResult<RegisterResponse> {
    if tx.find_user_by_email(&user.email).await?.is_some() {
        return Err(GymError::DuplicateIdentity(user.email));
    }
    tx.insert_user(&user).await?;

    let Some(enrollment) = enrollment else {
        return Ok(RegisterResponse {
            user,
            member: None,
            membership: None,
        });
    };

    if tx.find_plan_by_id(enrollment.plan_id).await?.is_none() {
        return Err(GymError::InvalidReference(EntityKind::Plan));
    }

    let member = Member {
        id: Uuid::new_v4(),
        user_id: user.id,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        date_of_birth: user.date_of_birth,
        gender: user.gender.clone(),
        emergency_contact: EmergencyContact {
            name: user.emergency_contact_name.clone(),
            phone: user.emergency_contact_phone.clone(),
        },
        notes: None,
        created_at: now,
        updated_at: now,
    };
    tx.insert_member(&member).await?;

    let membership = Membership::new(
        member.id,
        enrollment.plan_id,
        enrollment.start,
        enrollment.end,
        enrollment.auto_renew,
        now,
    )?;
    insert_checked(tx, &membership, policy).await?;

    Ok(RegisterResponse {
        user,
        member: Some(member),
        membership: Some(membership),
    })
}
