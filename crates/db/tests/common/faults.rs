//! A store that misbehaves at one chosen step of a transaction.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
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
use gym_db::MemoryDatabase;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub enum Fault {
    /// `insert_membership` fails with a persistence error.
    FailMembershipInsert,
    /// `insert_member` sleeps before writing.
    StallMemberInsert(Duration),
    /// `commit` sleeps before writing.
    StallCommit(Duration),
}

#[derive(Clone)]
pub struct FaultyDatabase {
    inner: MemoryDatabase,
    fault: Fault,
}

impl FaultyDatabase {
    pub fn new(inner: MemoryDatabase, fault: Fault) -> Self {
        Self { inner, fault }
    }
}

#[async_trait]
impl Database for FaultyDatabase {
    async fn begin(&self) -> GymResult<Box<dyn Transaction>> {
        Ok(Box::new(FaultyTransaction {
            inner: self.inner.begin().await?,
            fault: self.fault,
        }))
    }

    async fn ping(&self) -> GymResult<()> {
        self.inner.ping().await
    }
}

pub struct FaultyTransaction {
    inner: Box<dyn Transaction>,
    fault: Fault,
}

#[async_trait]
impl UserRepository for FaultyTransaction {
    async fn insert_user(&mut self, user: &User) -> GymResult<()> {
        self.inner.insert_user(user).await
    }

    async fn find_user_by_id(&mut self, id: Uuid) -> GymResult<Option<User>> {
        self.inner.find_user_by_id(id).await
    }

    async fn find_user_by_email(&mut self, email: &str) -> GymResult<Option<User>> {
        self.inner.find_user_by_email(email).await
    }

    async fn list_users(&mut self, role: Option<Role>) -> GymResult<Vec<User>> {
        self.inner.list_users(role).await
    }
}

#[async_trait]
impl MemberRepository for FaultyTransaction {
    async fn insert_member(&mut self, member: &Member) -> GymResult<()> {
        if let Fault::StallMemberInsert(pause) = self.fault {
            tokio::time::sleep(pause).await;
        }
        self.inner.insert_member(member).await
    }

    async fn find_member_by_id(&mut self, id: Uuid) -> GymResult<Option<Member>> {
        self.inner.find_member_by_id(id).await
    }

    async fn lock_member(&mut self, id: Uuid) -> GymResult<Option<Member>> {
        self.inner.lock_member(id).await
    }

    async fn find_member_by_user_id(&mut self, user_id: Uuid) -> GymResult<Option<Member>> {
        self.inner.find_member_by_user_id(user_id).await
    }

    async fn list_members(&mut self) -> GymResult<Vec<Member>> {
        self.inner.list_members().await
    }

    async fn update_member(&mut self, member: &Member) -> GymResult<()> {
        self.inner.update_member(member).await
    }

    async fn delete_member(&mut self, id: Uuid) -> GymResult<bool> {
        self.inner.delete_member(id).await
    }
}

#[async_trait]
impl PlanRepository for FaultyTransaction {
    async fn insert_plan(&mut self, plan: &Plan) -> GymResult<()> {
        self.inner.insert_plan(plan).await
    }

    async fn find_plan_by_id(&mut self, id: Uuid) -> GymResult<Option<Plan>> {
        self.inner.find_plan_by_id(id).await
    }

    async fn list_plans(&mut self) -> GymResult<Vec<Plan>> {
        self.inner.list_plans().await
    }

    async fn update_plan(&mut self, plan: &Plan) -> GymResult<()> {
        self.inner.update_plan(plan).await
    }
}

#[async_trait]
impl MembershipRepository for FaultyTransaction {
    async fn insert_membership(&mut self, membership: &Membership) -> GymResult<()> {
        if let Fault::FailMembershipInsert = self.fault {
            return Err(GymError::Internal(eyre::eyre!("disk full")));
        }
        self.inner.insert_membership(membership).await
    }

    async fn find_membership_by_id(&mut self, id: Uuid) -> GymResult<Option<Membership>> {
        self.inner.find_membership_by_id(id).await
    }

    async fn lock_membership(&mut self, id: Uuid) -> GymResult<Option<Membership>> {
        self.inner.lock_membership(id).await
    }

    async fn list_memberships_by_member(&mut self, member_id: Uuid) -> GymResult<Vec<Membership>> {
        self.inner.list_memberships_by_member(member_id).await
    }

    async fn list_due_memberships(&mut self, now: DateTime<Utc>) -> GymResult<Vec<Membership>> {
        self.inner.list_due_memberships(now).await
    }

    async fn update_membership(&mut self, membership: &Membership) -> GymResult<()> {
        self.inner.update_membership(membership).await
    }
}

#[async_trait]
impl GymRepository for FaultyTransaction {
    async fn insert_gym(&mut self, gym: &Gym) -> GymResult<()> {
        self.inner.insert_gym(gym).await
    }

    async fn find_gym_by_id(&mut self, id: Uuid) -> GymResult<Option<Gym>> {
        self.inner.find_gym_by_id(id).await
    }

    async fn list_gyms(&mut self) -> GymResult<Vec<Gym>> {
        self.inner.list_gyms().await
    }

    async fn update_gym(&mut self, gym: &Gym) -> GymResult<()> {
        self.inner.update_gym(gym).await
    }
}

#[async_trait]
impl ClassRepository for FaultyTransaction {
    async fn insert_class(&mut self, class: &Class) -> GymResult<()> {
        self.inner.insert_class(class).await
    }

    async fn find_class_by_id(&mut self, id: Uuid) -> GymResult<Option<Class>> {
        self.inner.find_class_by_id(id).await
    }

    async fn list_classes(&mut self) -> GymResult<Vec<Class>> {
        self.inner.list_classes().await
    }
}

#[async_trait]
impl SessionRepository for FaultyTransaction {
    async fn insert_session(&mut self, session: &ClassSession) -> GymResult<()> {
        self.inner.insert_session(session).await
    }

    async fn find_session_by_id(&mut self, id: Uuid) -> GymResult<Option<ClassSession>> {
        self.inner.find_session_by_id(id).await
    }

    async fn lock_session(&mut self, id: Uuid) -> GymResult<Option<ClassSession>> {
        self.inner.lock_session(id).await
    }

    async fn list_sessions(&mut self, class_id: Option<Uuid>) -> GymResult<Vec<ClassSession>> {
        self.inner.list_sessions(class_id).await
    }

    async fn update_session(&mut self, session: &ClassSession) -> GymResult<()> {
        self.inner.update_session(session).await
    }
}

#[async_trait]
impl BookingRepository for FaultyTransaction {
    async fn insert_booking(&mut self, booking: &Booking) -> GymResult<()> {
        self.inner.insert_booking(booking).await
    }

    async fn find_booking_by_id(&mut self, id: Uuid) -> GymResult<Option<Booking>> {
        self.inner.find_booking_by_id(id).await
    }

    async fn lock_booking(&mut self, id: Uuid) -> GymResult<Option<Booking>> {
        self.inner.lock_booking(id).await
    }

    async fn find_active_booking(
        &mut self,
        member_id: Uuid,
        session_id: Uuid,
    ) -> GymResult<Option<Booking>> {
        self.inner.find_active_booking(member_id, session_id).await
    }

    async fn count_active_bookings(&mut self, session_id: Uuid) -> GymResult<i64> {
        self.inner.count_active_bookings(session_id).await
    }

    async fn update_booking(&mut self, booking: &Booking) -> GymResult<()> {
        self.inner.update_booking(booking).await
    }

    async fn list_bookings_by_member(&mut self, member_id: Uuid) -> GymResult<Vec<Booking>> {
        self.inner.list_bookings_by_member(member_id).await
    }

    async fn list_bookings_by_session(&mut self, session_id: Uuid) -> GymResult<Vec<Booking>> {
        self.inner.list_bookings_by_session(session_id).await
    }
}

#[async_trait]
impl AttendanceRepository for FaultyTransaction {
    async fn insert_attendance(&mut self, attendance: &Attendance) -> GymResult<()> {
        self.inner.insert_attendance(attendance).await
    }

    async fn find_attendance(
        &mut self,
        member_id: Uuid,
        session_id: Uuid,
    ) -> GymResult<Option<Attendance>> {
        self.inner.find_attendance(member_id, session_id).await
    }

    async fn list_attendance_by_member(&mut self, member_id: Uuid) -> GymResult<Vec<Attendance>> {
        self.inner.list_attendance_by_member(member_id).await
    }

    async fn list_attendance(&mut self) -> GymResult<Vec<Attendance>> {
        self.inner.list_attendance().await
    }
}

#[async_trait]
impl PaymentRepository for FaultyTransaction {
    async fn insert_payment(&mut self, payment: &Payment) -> GymResult<()> {
        self.inner.insert_payment(payment).await
    }

    async fn list_payments_by_member(&mut self, member_id: Uuid) -> GymResult<Vec<Payment>> {
        self.inner.list_payments_by_member(member_id).await
    }

    async fn list_payments(&mut self) -> GymResult<Vec<Payment>> {
        self.inner.list_payments().await
    }
}

#[async_trait]
impl Transaction for FaultyTransaction {
    async fn commit(self: Box<Self>) -> GymResult<()> {
        if let Fault::StallCommit(pause) = self.fault {
            tokio::time::sleep(pause).await;
        }
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> GymResult<()> {
        self.inner.rollback().await
    }
}
