//! Row shapes as stored in Postgres, and their conversion into domain types.
//!
//! Enumerations are stored as lower-case text; a value the domain does not
//! know is reported as a persistence failure.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use eyre::eyre;
use serde_json::Value;
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use gym_core::errors::GymError;
use gym_core::models::{
    attendance::Attendance,
    booking::Booking,
    class::{Class, ClassSession},
    gym::Gym,
    member::{EmergencyContact, Member},
    membership::Membership,
    payment::Payment,
    plan::Plan,
    user::User,
};

fn column<T>(table: &str, column: &str, raw: &str) -> Result<T, GymError>
where
    T: FromStr<Err = GymError>,
{
    raw.parse()
        .map_err(|_| GymError::persistence(eyre!("{table}.{column} holds unknown value {raw:?}")))
}

#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub fitness_goals: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbUser> for User {
    type Error = GymError;

    fn try_from(row: DbUser) -> Result<Self, Self::Error> {
        Ok(User {
            role: column("users", "role", &row.role)?,
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            phone_number: row.phone_number,
            date_of_birth: row.date_of_birth,
            gender: row.gender,
            fitness_goals: row.fitness_goals,
            emergency_contact_name: row.emergency_contact_name,
            emergency_contact_phone: row.emergency_contact_phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbMember {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub emergency_contact: Json<EmergencyContact>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbMember> for Member {
    fn from(row: DbMember) -> Self {
        Member {
            id: row.id,
            user_id: row.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            date_of_birth: row.date_of_birth,
            gender: row.gender,
            emergency_contact: row.emergency_contact.0,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbPlan {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub billing_cycle: String,
    pub session_quota: Option<i32>,
    pub access: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbPlan> for Plan {
    type Error = GymError;

    fn try_from(row: DbPlan) -> Result<Self, Self::Error> {
        Ok(Plan {
            billing_cycle: column("plans", "billing_cycle", &row.billing_cycle)?,
            id: row.id,
            title: row.title,
            description: row.description,
            price_cents: row.price_cents,
            session_quota: row.session_quota,
            access: row.access,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbMembership {
    pub id: Uuid,
    pub member_id: Uuid,
    pub plan_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: String,
    pub auto_renew: bool,
    pub payment_method_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbMembership> for Membership {
    type Error = GymError;

    fn try_from(row: DbMembership) -> Result<Self, Self::Error> {
        Ok(Membership {
            status: column("memberships", "status", &row.status)?,
            id: row.id,
            member_id: row.member_id,
            plan_id: row.plan_id,
            start_date: row.start_date,
            end_date: row.end_date,
            auto_renew: row.auto_renew,
            payment_method_id: row.payment_method_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbGym {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub timezone: Option<String>,
    pub opening_hours: Value,
    pub settings: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbGym> for Gym {
    fn from(row: DbGym) -> Self {
        Gym {
            id: row.id,
            name: row.name,
            address: row.address,
            phone: row.phone,
            timezone: row.timezone,
            opening_hours: row.opening_hours,
            settings: row.settings,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbClass {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub trainer_id: Uuid,
    pub capacity: i32,
    pub recurring_rule: Option<Value>,
    pub duration_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbClass> for Class {
    fn from(row: DbClass) -> Self {
        Class {
            id: row.id,
            gym_id: row.gym_id,
            title: row.title,
            description: row.description,
            trainer_id: row.trainer_id,
            capacity: row.capacity,
            recurring_rule: row.recurring_rule,
            duration_minutes: row.duration_minutes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbClassSession {
    pub id: Uuid,
    pub class_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbClassSession> for ClassSession {
    type Error = GymError;

    fn try_from(row: DbClassSession) -> Result<Self, Self::Error> {
        Ok(ClassSession {
            status: column("class_sessions", "status", &row.status)?,
            id: row.id,
            class_id: row.class_id,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            capacity: row.capacity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub session_id: Uuid,
    pub member_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbBooking> for Booking {
    type Error = GymError;

    fn try_from(row: DbBooking) -> Result<Self, Self::Error> {
        Ok(Booking {
            status: column("bookings", "status", &row.status)?,
            id: row.id,
            session_id: row.session_id,
            member_id: row.member_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbAttendance {
    pub id: Uuid,
    pub session_id: Uuid,
    pub member_id: Uuid,
    pub checkin_method: String,
    pub checked_in_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbAttendance> for Attendance {
    type Error = GymError;

    fn try_from(row: DbAttendance) -> Result<Self, Self::Error> {
        Ok(Attendance {
            checkin_method: column("attendance", "checkin_method", &row.checkin_method)?,
            id: row.id,
            session_id: row.session_id,
            member_id: row.member_id,
            checked_in_at: row.checked_in_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbPayment {
    pub id: Uuid,
    pub member_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub method: String,
    pub status: String,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbPayment> for Payment {
    type Error = GymError;

    fn try_from(row: DbPayment) -> Result<Self, Self::Error> {
        Ok(Payment {
            status: column("payments", "status", &row.status)?,
            id: row.id,
            member_id: row.member_id,
            amount_cents: row.amount_cents,
            currency: row.currency,
            method: row.method,
            reference: row.reference,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Converts every row, failing on the first one that does not fit the domain.
pub fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, GymError>
where
    T: TryFrom<R, Error = GymError>,
{
    rows.into_iter().map(T::try_from).collect()
}
