//! Postgres implementation of the persistence ports.
//!
//! A [`PgTransaction`] owns one pooled connection for its whole life.
//! Dropping it without committing rolls back, which is what a timed-out
//! operation relies on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::WrapErr;
use sqlx::{Postgres, Transaction as SqlxTransaction};
use uuid::Uuid;

use gym_core::errors::{GymError, GymResult};
use gym_core::models::{
    attendance::Attendance,
    booking::Booking,
    class::{Class, ClassSession},
    gym::Gym,
    member::Member,
    membership::Membership,
    payment::Payment,
    plan::Plan,
    user::{Role, User},
};
use gym_core::store::{
    AttendanceRepository, BookingRepository, ClassRepository, Database, GymRepository,
    MemberRepository, MembershipRepository, PaymentRepository, PlanRepository,
    SessionRepository, Transaction, UserRepository,
};

use crate::repositories::{
    attendance, bookings, classes, gyms, members, memberships, payments, plans, sessions, users,
};
use crate::DbPool;

#[derive(Clone)]
pub struct PgDatabase {
    pool: DbPool,
}

impl PgDatabase {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn begin(&self) -> GymResult<Box<dyn Transaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .wrap_err("failed to start transaction")
            .map_err(GymError::persistence)?;
        Ok(Box::new(PgTransaction { tx }))
    }

    async fn ping(&self) -> GymResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .wrap_err("database ping failed")
            .map_err(GymError::persistence)?;
        Ok(())
    }
}

pub struct PgTransaction {
    tx: SqlxTransaction<'static, Postgres>,
}

#[async_trait]
impl UserRepository for PgTransaction {
    async fn insert_user(&mut self, user: &User) -> GymResult<()> {
        users::insert(&mut self.tx, user).await
    }

    async fn find_user_by_id(&mut self, id: Uuid) -> GymResult<Option<User>> {
        users::find_by_id(&mut self.tx, id).await
    }

    async fn find_user_by_email(&mut self, email: &str) -> GymResult<Option<User>> {
        users::find_by_email(&mut self.tx, email).await
    }

    async fn list_users(&mut self, role: Option<Role>) -> GymResult<Vec<User>> {
        users::list(&mut self.tx, role).await
    }
}

#[async_trait]
impl MemberRepository for PgTransaction {
    async fn insert_member(&mut self, member: &Member) -> GymResult<()> {
        members::insert(&mut self.tx, member).await
    }

    async fn find_member_by_id(&mut self, id: Uuid) -> GymResult<Option<Member>> {
        members::find_by_id(&mut self.tx, id).await
    }

    async fn lock_member(&mut self, id: Uuid) -> GymResult<Option<Member>> {
        members::lock(&mut self.tx, id).await
    }

    async fn find_member_by_user_id(&mut self, user_id: Uuid) -> GymResult<Option<Member>> {
        members::find_by_user_id(&mut self.tx, user_id).await
    }

    async fn list_members(&mut self) -> GymResult<Vec<Member>> {
        members::list(&mut self.tx).await
    }

    async fn update_member(&mut self, member: &Member) -> GymResult<()> {
        members::update(&mut self.tx, member).await
    }

    async fn delete_member(&mut self, id: Uuid) -> GymResult<bool> {
        members::delete(&mut self.tx, id).await
    }
}

#[async_trait]
impl PlanRepository for PgTransaction {
    async fn insert_plan(&mut self, plan: &Plan) -> GymResult<()> {
        plans::insert(&mut self.tx, plan).await
    }

    async fn find_plan_by_id(&mut self, id: Uuid) -> GymResult<Option<Plan>> {
        plans::find_by_id(&mut self.tx, id).await
    }

    async fn list_plans(&mut self) -> GymResult<Vec<Plan>> {
        plans::list(&mut self.tx).await
    }

    async fn update_plan(&mut self, plan: &Plan) -> GymResult<()> {
        plans::update(&mut self.tx, plan).await
    }
}

#[async_trait]
impl MembershipRepository for PgTransaction {
    async fn insert_membership(&mut self, membership: &Membership) -> GymResult<()> {
        memberships::insert(&mut self.tx, membership).await
    }

    async fn find_membership_by_id(&mut self, id: Uuid) -> GymResult<Option<Membership>> {
        memberships::find_by_id(&mut self.tx, id).await
    }

    async fn lock_membership(&mut self, id: Uuid) -> GymResult<Option<Membership>> {
        memberships::lock(&mut self.tx, id).await
    }

    async fn list_memberships_by_member(&mut self, member_id: Uuid) -> GymResult<Vec<Membership>> {
        memberships::list_by_member(&mut self.tx, member_id).await
    }

    async fn list_due_memberships(&mut self, now: DateTime<Utc>) -> GymResult<Vec<Membership>> {
        memberships::list_due(&mut self.tx, now).await
    }

    async fn update_membership(&mut self, membership: &Membership) -> GymResult<()> {
        memberships::update(&mut self.tx, membership).await
    }
}

#[async_trait]
impl GymRepository for PgTransaction {
    async fn insert_gym(&mut self, gym: &Gym) -> GymResult<()> {
        gyms::insert(&mut self.tx, gym).await
    }

    async fn find_gym_by_id(&mut self, id: Uuid) -> GymResult<Option<Gym>> {
        gyms::find_by_id(&mut self.tx, id).await
    }

    async fn list_gyms(&mut self) -> GymResult<Vec<Gym>> {
        gyms::list(&mut self.tx).await
    }

    async fn update_gym(&mut self, gym: &Gym) -> GymResult<()> {
        gyms::update(&mut self.tx, gym).await
    }
}

#[async_trait]
impl ClassRepository for PgTransaction {
    async fn insert_class(&mut self, class: &Class) -> GymResult<()> {
        classes::insert(&mut self.tx, class).await
    }

    async fn find_class_by_id(&mut self, id: Uuid) -> GymResult<Option<Class>> {
        classes::find_by_id(&mut self.tx, id).await
    }

    async fn list_classes(&mut self) -> GymResult<Vec<Class>> {
        classes::list(&mut self.tx).await
    }
}

#[async_trait]
impl SessionRepository for PgTransaction {
    async fn insert_session(&mut self, session: &ClassSession) -> GymResult<()> {
        sessions::insert(&mut self.tx, session).await
    }

    async fn find_session_by_id(&mut self, id: Uuid) -> GymResult<Option<ClassSession>> {
        sessions::find_by_id(&mut self.tx, id).await
    }

    async fn lock_session(&mut self, id: Uuid) -> GymResult<Option<ClassSession>> {
        sessions::lock(&mut self.tx, id).await
    }

    async fn list_sessions(&mut self, class_id: Option<Uuid>) -> GymResult<Vec<ClassSession>> {
        sessions::list(&mut self.tx, class_id).await
    }

    async fn update_session(&mut self, session: &ClassSession) -> GymResult<()> {
        sessions::update(&mut self.tx, session).await
    }
}

#[async_trait]
impl BookingRepository for PgTransaction {
    async fn insert_booking(&mut self, booking: &Booking) -> GymResult<()> {
        bookings::insert(&mut self.tx, booking).await
    }

    async fn find_booking_by_id(&mut self, id: Uuid) -> GymResult<Option<Booking>> {
        bookings::find_by_id(&mut self.tx, id).await
    }

    async fn lock_booking(&mut self, id: Uuid) -> GymResult<Option<Booking>> {
        bookings::lock(&mut self.tx, id).await
    }

    async fn find_active_booking(
        &mut self,
        member_id: Uuid,
        session_id: Uuid,
    ) -> GymResult<Option<Booking>> {
        bookings::find_active(&mut self.tx, member_id, session_id).await
    }

    async fn count_active_bookings(&mut self, session_id: Uuid) -> GymResult<i64> {
        bookings::count_active(&mut self.tx, session_id).await
    }

    async fn update_booking(&mut self, booking: &Booking) -> GymResult<()> {
        bookings::update(&mut self.tx, booking).await
    }

    async fn list_bookings_by_member(&mut self, member_id: Uuid) -> GymResult<Vec<Booking>> {
        bookings::list_by_member(&mut self.tx, member_id).await
    }

    async fn list_bookings_by_session(&mut self, session_id: Uuid) -> GymResult<Vec<Booking>> {
        bookings::list_by_session(&mut self.tx, session_id).await
    }
}

#[async_trait]
impl AttendanceRepository for PgTransaction {
    async fn insert_attendance(&mut self, attendance: &Attendance) -> GymResult<()> {
        attendance::insert(&mut self.tx, attendance).await
    }

    async fn find_attendance(
        &mut self,
        member_id: Uuid,
        session_id: Uuid,
    ) -> GymResult<Option<Attendance>> {
        attendance::find(&mut self.tx, member_id, session_id).await
    }

    async fn list_attendance_by_member(&mut self, member_id: Uuid) -> GymResult<Vec<Attendance>> {
        attendance::list_by_member(&mut self.tx, member_id).await
    }

    async fn list_attendance(&mut self) -> GymResult<Vec<Attendance>> {
        attendance::list(&mut self.tx).await
    }
}

#[async_trait]
impl PaymentRepository for PgTransaction {
    async fn insert_payment(&mut self, payment: &Payment) -> GymResult<()> {
        payments::insert(&mut self.tx, payment).await
    }

    async fn list_payments_by_member(&mut self, member_id: Uuid) -> GymResult<Vec<Payment>> {
        payments::list_by_member(&mut self.tx, member_id).await
    }

    async fn list_payments(&mut self) -> GymResult<Vec<Payment>> {
        payments::list(&mut self.tx).await
    }
}

#[async_trait]
impl Transaction for PgTransaction {
    async fn commit(self: Box<Self>) -> GymResult<()> {
        self.tx
            .commit()
            .await
            .wrap_err("failed to commit transaction")
            .map_err(GymError::persistence)
    }

    async fn rollback(self: Box<Self>) -> GymResult<()> {
        self.tx
            .rollback()
            .await
            .wrap_err("failed to roll back transaction")
            .map_err(GymError::persistence)
    }
}
