//! Persistence ports.
//!
//! Every repository method runs on a [`Transaction`] obtained from a
//! [`Database`]. Services do their check-then-insert sequences on one
//! transaction and either commit or roll back as a unit; correctness under
//! concurrency comes from the store's isolation, never from in-process locks.
//!
//! Adapters must honour:
//! - `lock_*` methods block concurrent writers of the same row until the
//!   holding transaction ends.
//! - `insert_*` methods report a violated uniqueness rule with the matching
//!   domain error (`DuplicateIdentity`, `AlreadyBooked`, `AlreadyCheckedIn`)
//!   and a missing foreign row with `InvalidReference`.
//! - Dropping a transaction without committing discards its writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::GymResult;
use crate::models::{
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

#[async_trait]
pub trait UserRepository: Send {
    async fn insert_user(&mut self, user: &User) -> GymResult<()>;
    async fn find_user_by_id(&mut self, id: Uuid) -> GymResult<Option<User>>;
    /// `email` is expected in normalized form.
    async fn find_user_by_email(&mut self, email: &str) -> GymResult<Option<User>>;
    async fn list_users(&mut self, role: Option<Role>) -> GymResult<Vec<User>>;
}

#[async_trait]
pub trait MemberRepository: Send {
    async fn insert_member(&mut self, member: &Member) -> GymResult<()>;
    async fn find_member_by_id(&mut self, id: Uuid) -> GymResult<Option<Member>>;
    /// Locks the profile row; membership writes for one member serialize on
    /// this lock.
    async fn lock_member(&mut self, id: Uuid) -> GymResult<Option<Member>>;
    async fn find_member_by_user_id(&mut self, user_id: Uuid) -> GymResult<Option<Member>>;
    async fn list_members(&mut self) -> GymResult<Vec<Member>>;
    async fn update_member(&mut self, member: &Member) -> GymResult<()>;
    /// Removes the profile and everything it owns. Returns false if absent.
    async fn delete_member(&mut self, id: Uuid) -> GymResult<bool>;
}

#[async_trait]
pub trait PlanRepository: Send {
    async fn insert_plan(&mut self, plan: &Plan) -> GymResult<()>;
    async fn find_plan_by_id(&mut self, id: Uuid) -> GymResult<Option<Plan>>;
    async fn list_plans(&mut self) -> GymResult<Vec<Plan>>;
    async fn update_plan(&mut self, plan: &Plan) -> GymResult<()>;
}

#[async_trait]
pub trait MembershipRepository: Send {
    async fn insert_membership(&mut self, membership: &Membership) -> GymResult<()>;
    async fn find_membership_by_id(&mut self, id: Uuid) -> GymResult<Option<Membership>>;
    /// Locks the row for the rest of the transaction.
    async fn lock_membership(&mut self, id: Uuid) -> GymResult<Option<Membership>>;
    /// Newest first.
    async fn list_memberships_by_member(&mut self, member_id: Uuid) -> GymResult<Vec<Membership>>;
    /// Stored-active memberships with `end_date <= now`, locked.
    async fn list_due_memberships(&mut self, now: DateTime<Utc>) -> GymResult<Vec<Membership>>;
    async fn update_membership(&mut self, membership: &Membership) -> GymResult<()>;
}

#[async_trait]
pub trait GymRepository: Send {
    async fn insert_gym(&mut self, gym: &Gym) -> GymResult<()>;
    async fn find_gym_by_id(&mut self, id: Uuid) -> GymResult<Option<Gym>>;
    async fn list_gyms(&mut self) -> GymResult<Vec<Gym>>;
    async fn update_gym(&mut self, gym: &Gym) -> GymResult<()>;
}

#[async_trait]
pub trait ClassRepository: Send {
    async fn insert_class(&mut self, class: &Class) -> GymResult<()>;
    async fn find_class_by_id(&mut self, id: Uuid) -> GymResult<Option<Class>>;
    async fn list_classes(&mut self) -> GymResult<Vec<Class>>;
}

#[async_trait]
pub trait SessionRepository: Send {
    async fn insert_session(&mut self, session: &ClassSession) -> GymResult<()>;
    async fn find_session_by_id(&mut self, id: Uuid) -> GymResult<Option<ClassSession>>;
    /// Locks the session row; bookings and check-ins for one session
    /// serialize on this lock.
    async fn lock_session(&mut self, id: Uuid) -> GymResult<Option<ClassSession>>;
    /// Ordered by start time. `class_id` narrows to one class.
    async fn list_sessions(&mut self, class_id: Option<Uuid>) -> GymResult<Vec<ClassSession>>;
    async fn update_session(&mut self, session: &ClassSession) -> GymResult<()>;
}

#[async_trait]
pub trait BookingRepository: Send {
    async fn insert_booking(&mut self, booking: &Booking) -> GymResult<()>;
    async fn find_booking_by_id(&mut self, id: Uuid) -> GymResult<Option<Booking>>;
    async fn lock_booking(&mut self, id: Uuid) -> GymResult<Option<Booking>>;
    /// The member's non-cancelled booking for the session, if any.
    async fn find_active_booking(
        &mut self,
        member_id: Uuid,
        session_id: Uuid,
    ) -> GymResult<Option<Booking>>;
    async fn count_active_bookings(&mut self, session_id: Uuid) -> GymResult<i64>;
    async fn update_booking(&mut self, booking: &Booking) -> GymResult<()>;
    /// Newest first.
    async fn list_bookings_by_member(&mut self, member_id: Uuid) -> GymResult<Vec<Booking>>;
    /// Oldest first.
    async fn list_bookings_by_session(&mut self, session_id: Uuid) -> GymResult<Vec<Booking>>;
}

#[async_trait]
pub trait AttendanceRepository: Send {
    async fn insert_attendance(&mut self, attendance: &Attendance) -> GymResult<()>;
    async fn find_attendance(
        &mut self,
        member_id: Uuid,
        session_id: Uuid,
    ) -> GymResult<Option<Attendance>>;
    /// Most recent check-in first.
    async fn list_attendance_by_member(&mut self, member_id: Uuid) -> GymResult<Vec<Attendance>>;
    /// Most recent check-in first.
    async fn list_attendance(&mut self) -> GymResult<Vec<Attendance>>;
}

#[async_trait]
pub trait PaymentRepository: Send {
    async fn insert_payment(&mut self, payment: &Payment) -> GymResult<()>;
    /// Newest first.
    async fn list_payments_by_member(&mut self, member_id: Uuid) -> GymResult<Vec<Payment>>;
    /// Newest first.
    async fn list_payments(&mut self) -> GymResult<Vec<Payment>>;
}

/// One all-or-nothing unit of work scoped to a single storage connection.
#[async_trait]
pub trait Transaction:
    UserRepository
    + MemberRepository
    + PlanRepository
    + MembershipRepository
    + GymRepository
    + ClassRepository
    + SessionRepository
    + BookingRepository
    + AttendanceRepository
    + PaymentRepository
    + Send
{
    async fn commit(self: Box<Self>) -> GymResult<()>;
    async fn rollback(self: Box<Self>) -> GymResult<()>;
}

/// Handle to the store, passed explicitly to every service.
#[async_trait]
pub trait Database: Send + Sync {
    async fn begin(&self) -> GymResult<Box<dyn Transaction>>;

    /// Cheap liveness probe.
    async fn ping(&self) -> GymResult<()>;
}
