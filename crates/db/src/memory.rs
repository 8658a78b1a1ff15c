//! In-process store with the same transactional contract as Postgres.
//!
//! `begin` takes an exclusive lock on the whole state and works on a copy.
//! `commit` publishes the copy; dropping or rolling back discards it. The
//! lock makes every transaction serializable, which is stronger than what
//! the Postgres adapter gives but satisfies the same invariants. Uniqueness,
//! foreign keys and cascades mirror the SQL schema.
//!
//! Never hold two transactions from the same task: the second `begin` waits
//! for the first to finish.

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use gym_core::errors::{EntityKind, GymError, GymResult};
use gym_core::models::{
    attendance::Attendance,
    booking::Booking,
    class::{Class, ClassSession},
    gym::Gym,
    member::Member,
    membership::{Membership, MembershipStatus},
    payment::Payment,
    plan::Plan,
    user::{Role, User},
};
use gym_core::store::{
    AttendanceRepository, BookingRepository, ClassRepository, Database, GymRepository,
    MemberRepository, MembershipRepository, PaymentRepository, PlanRepository,
    SessionRepository, Transaction, UserRepository,
};

/// Rows in insertion order.
#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: Vec<User>,
    members: Vec<Member>,
    plans: Vec<Plan>,
    memberships: Vec<Membership>,
    gyms: Vec<Gym>,
    classes: Vec<Class>,
    sessions: Vec<ClassSession>,
    bookings: Vec<Booking>,
    attendance: Vec<Attendance>,
    payments: Vec<Payment>,
}

/// Row counts, for asserting what a failed operation left behind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub users: usize,
    pub members: usize,
    pub plans: usize,
    pub memberships: usize,
    pub gyms: usize,
    pub classes: usize,
    pub sessions: usize,
    pub bookings: usize,
    pub attendance: usize,
    pub payments: usize,
}

#[derive(Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn counts(&self) -> TableCounts {
        let state = self.state.lock().await;
        TableCounts {
            users: state.users.len(),
            members: state.members.len(),
            plans: state.plans.len(),
            memberships: state.memberships.len(),
            gyms: state.gyms.len(),
            classes: state.classes.len(),
            sessions: state.sessions.len(),
            bookings: state.bookings.len(),
            attendance: state.attendance.len(),
            payments: state.payments.len(),
        }
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn begin(&self) -> GymResult<Box<dyn Transaction>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }

    async fn ping(&self) -> GymResult<()> {
        Ok(())
    }
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

fn replace<T, F>(rows: &mut [T], row: &T, what: &str, id: Uuid, same: F) -> GymResult<()>
where
    T: Clone,
    F: Fn(&T) -> bool,
{
    match rows.iter_mut().find(|r| same(&**r)) {
        Some(slot) => {
            *slot = row.clone();
            Ok(())
        }
        None => Err(GymError::NotFound(format!("{what} with ID {id} not found"))),
    }
}

/// Newest-inserted first, then stably ordered by `key` descending.
fn newest_first<T, K, F>(rows: impl Iterator<Item = T>, key: F) -> Vec<T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut rows: Vec<T> = rows.collect();
    rows.reverse();
    rows.sort_by_key(|r| Reverse(key(r)));
    rows
}

impl MemoryState {
    fn has_member(&self, id: Uuid) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    fn has_session(&self, id: Uuid) -> bool {
        self.sessions.iter().any(|s| s.id == id)
    }
}

#[async_trait]
impl UserRepository for MemoryTransaction {
    async fn insert_user(&mut self, user: &User) -> GymResult<()> {
        if self.working.users.iter().any(|u| u.email == user.email) {
            return Err(GymError::DuplicateIdentity(user.email.clone()));
        }
        self.working.users.push(user.clone());
        Ok(())
    }

    async fn find_user_by_id(&mut self, id: Uuid) -> GymResult<Option<User>> {
        Ok(self.working.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> GymResult<Option<User>> {
        Ok(self.working.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&mut self, role: Option<Role>) -> GymResult<Vec<User>> {
        let rows = self
            .working
            .users
            .iter()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .cloned();
        Ok(newest_first(rows, |u| u.created_at))
    }
}

#[async_trait]
impl MemberRepository for MemoryTransaction {
    async fn insert_member(&mut self, member: &Member) -> GymResult<()> {
        if !self.working.users.iter().any(|u| u.id == member.user_id) {
            return Err(GymError::InvalidReference(EntityKind::User));
        }
        if self.working.members.iter().any(|m| m.user_id == member.user_id) {
            return Err(GymError::Validation(
                "User already has a member profile".to_string(),
            ));
        }
        self.working.members.push(member.clone());
        Ok(())
    }

    async fn find_member_by_id(&mut self, id: Uuid) -> GymResult<Option<Member>> {
        Ok(self.working.members.iter().find(|m| m.id == id).cloned())
    }

    async fn lock_member(&mut self, id: Uuid) -> GymResult<Option<Member>> {
        self.find_member_by_id(id).await
    }

    async fn find_member_by_user_id(&mut self, user_id: Uuid) -> GymResult<Option<Member>> {
        Ok(self
            .working
            .members
            .iter()
            .find(|m| m.user_id == user_id)
            .cloned())
    }

    async fn list_members(&mut self) -> GymResult<Vec<Member>> {
        let rows = self.working.members.iter().cloned();
        Ok(newest_first(rows, |m| m.created_at))
    }

    async fn update_member(&mut self, member: &Member) -> GymResult<()> {
        replace(&mut self.working.members, member, "Member", member.id, |m| {
            m.id == member.id
        })
    }

    async fn delete_member(&mut self, id: Uuid) -> GymResult<bool> {
        let state = &mut self.working;
        let before = state.members.len();
        state.members.retain(|m| m.id != id);
        if state.members.len() == before {
            return Ok(false);
        }
        state.memberships.retain(|m| m.member_id != id);
        state.bookings.retain(|b| b.member_id != id);
        state.attendance.retain(|a| a.member_id != id);
        state.payments.retain(|p| p.member_id != id);
        Ok(true)
    }
}

#[async_trait]
impl PlanRepository for MemoryTransaction {
    async fn insert_plan(&mut self, plan: &Plan) -> GymResult<()> {
        self.working.plans.push(plan.clone());
        Ok(())
    }

    async fn find_plan_by_id(&mut self, id: Uuid) -> GymResult<Option<Plan>> {
        Ok(self.working.plans.iter().find(|p| p.id == id).cloned())
    }

    async fn list_plans(&mut self) -> GymResult<Vec<Plan>> {
        let mut plans = self.working.plans.clone();
        plans.sort_by(|a, b| {
            a.price_cents
                .cmp(&b.price_cents)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(plans)
    }

    async fn update_plan(&mut self, plan: &Plan) -> GymResult<()> {
        replace(&mut self.working.plans, plan, "Plan", plan.id, |p| p.id == plan.id)
    }
}

#[async_trait]
impl MembershipRepository for MemoryTransaction {
    async fn insert_membership(&mut self, membership: &Membership) -> GymResult<()> {
        if !self.working.has_member(membership.member_id) {
            return Err(GymError::InvalidReference(EntityKind::Member));
        }
        if !self.working.plans.iter().any(|p| p.id == membership.plan_id) {
            return Err(GymError::InvalidReference(EntityKind::Plan));
        }
        self.working.memberships.push(membership.clone());
        Ok(())
    }

    async fn find_membership_by_id(&mut self, id: Uuid) -> GymResult<Option<Membership>> {
        Ok(self.working.memberships.iter().find(|m| m.id == id).cloned())
    }

    async fn lock_membership(&mut self, id: Uuid) -> GymResult<Option<Membership>> {
        self.find_membership_by_id(id).await
    }

    async fn list_memberships_by_member(&mut self, member_id: Uuid) -> GymResult<Vec<Membership>> {
        let rows = self
            .working
            .memberships
            .iter()
            .filter(|m| m.member_id == member_id)
            .cloned();
        Ok(newest_first(rows, |m| (m.start_date, m.created_at)))
    }

    async fn list_due_memberships(&mut self, now: DateTime<Utc>) -> GymResult<Vec<Membership>> {
        let mut due: Vec<Membership> = self
            .working
            .memberships
            .iter()
            .filter(|m| m.status == MembershipStatus::Active && m.end_date <= now)
            .cloned()
            .collect();
        due.sort_by_key(|m| m.end_date);
        Ok(due)
    }

    async fn update_membership(&mut self, membership: &Membership) -> GymResult<()> {
        replace(
            &mut self.working.memberships,
            membership,
            "Membership",
            membership.id,
            |m| m.id == membership.id,
        )
    }
}

#[async_trait]
impl GymRepository for MemoryTransaction {
    async fn insert_gym(&mut self, gym: &Gym) -> GymResult<()> {
        self.working.gyms.push(gym.clone());
        Ok(())
    }

    async fn find_gym_by_id(&mut self, id: Uuid) -> GymResult<Option<Gym>> {
        Ok(self.working.gyms.iter().find(|g| g.id == id).cloned())
    }

    async fn list_gyms(&mut self) -> GymResult<Vec<Gym>> {
        let mut gyms = self.working.gyms.clone();
        gyms.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(gyms)
    }

    async fn update_gym(&mut self, gym: &Gym) -> GymResult<()> {
        replace(&mut self.working.gyms, gym, "Gym", gym.id, |g| g.id == gym.id)
    }
}

#[async_trait]
impl ClassRepository for MemoryTransaction {
    async fn insert_class(&mut self, class: &Class) -> GymResult<()> {
        if !self.working.gyms.iter().any(|g| g.id == class.gym_id) {
            return Err(GymError::InvalidReference(EntityKind::Gym));
        }
        if !self.working.users.iter().any(|u| u.id == class.trainer_id) {
            return Err(GymError::InvalidReference(EntityKind::Trainer));
        }
        self.working.classes.push(class.clone());
        Ok(())
    }

    async fn find_class_by_id(&mut self, id: Uuid) -> GymResult<Option<Class>> {
        Ok(self.working.classes.iter().find(|c| c.id == id).cloned())
    }

    async fn list_classes(&mut self) -> GymResult<Vec<Class>> {
        let mut classes = self.working.classes.clone();
        classes.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(classes)
    }
}

#[async_trait]
impl SessionRepository for MemoryTransaction {
    async fn insert_session(&mut self, session: &ClassSession) -> GymResult<()> {
        if !self.working.classes.iter().any(|c| c.id == session.class_id) {
            return Err(GymError::InvalidReference(EntityKind::Class));
        }
        self.working.sessions.push(session.clone());
        Ok(())
    }

    async fn find_session_by_id(&mut self, id: Uuid) -> GymResult<Option<ClassSession>> {
        Ok(self.working.sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn lock_session(&mut self, id: Uuid) -> GymResult<Option<ClassSession>> {
        self.find_session_by_id(id).await
    }

    async fn list_sessions(&mut self, class_id: Option<Uuid>) -> GymResult<Vec<ClassSession>> {
        let mut sessions: Vec<ClassSession> = self
            .working
            .sessions
            .iter()
            .filter(|s| class_id.is_none_or(|c| s.class_id == c))
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.starts_at);
        Ok(sessions)
    }

    async fn update_session(&mut self, session: &ClassSession) -> GymResult<()> {
        replace(
            &mut self.working.sessions,
            session,
            "Session",
            session.id,
            |s| s.id == session.id,
        )
    }
}

#[async_trait]
impl BookingRepository for MemoryTransaction {
    async fn insert_booking(&mut self, booking: &Booking) -> GymResult<()> {
        if !self.working.has_session(booking.session_id) {
            return Err(GymError::InvalidReference(EntityKind::Session));
        }
        if !self.working.has_member(booking.member_id) {
            return Err(GymError::InvalidReference(EntityKind::Member));
        }
        let duplicate = booking.holds_seat()
            && self.working.bookings.iter().any(|b| {
                b.holds_seat()
                    && b.member_id == booking.member_id
                    && b.session_id == booking.session_id
            });
        if duplicate {
            return Err(GymError::AlreadyBooked);
        }
        self.working.bookings.push(booking.clone());
        Ok(())
    }

    async fn find_booking_by_id(&mut self, id: Uuid) -> GymResult<Option<Booking>> {
        Ok(self.working.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn lock_booking(&mut self, id: Uuid) -> GymResult<Option<Booking>> {
        self.find_booking_by_id(id).await
    }

    async fn find_active_booking(
        &mut self,
        member_id: Uuid,
        session_id: Uuid,
    ) -> GymResult<Option<Booking>> {
        Ok(self
            .working
            .bookings
            .iter()
            .find(|b| b.holds_seat() && b.member_id == member_id && b.session_id == session_id)
            .cloned())
    }

    async fn count_active_bookings(&mut self, session_id: Uuid) -> GymResult<i64> {
        let count = self
            .working
            .bookings
            .iter()
            .filter(|b| b.holds_seat() && b.session_id == session_id)
            .count();
        Ok(count as i64)
    }

    async fn update_booking(&mut self, booking: &Booking) -> GymResult<()> {
        replace(
            &mut self.working.bookings,
            booking,
            "Booking",
            booking.id,
            |b| b.id == booking.id,
        )
    }

    async fn list_bookings_by_member(&mut self, member_id: Uuid) -> GymResult<Vec<Booking>> {
        let rows = self
            .working
            .bookings
            .iter()
            .filter(|b| b.member_id == member_id)
            .cloned();
        Ok(newest_first(rows, |b| b.created_at))
    }

    async fn list_bookings_by_session(&mut self, session_id: Uuid) -> GymResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .working
            .bookings
            .iter()
            .filter(|b| b.session_id == session_id)
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.created_at);
        Ok(bookings)
    }
}

#[async_trait]
impl AttendanceRepository for MemoryTransaction {
    async fn insert_attendance(&mut self, attendance: &Attendance) -> GymResult<()> {
        if !self.working.has_session(attendance.session_id) {
            return Err(GymError::InvalidReference(EntityKind::Session));
        }
        if !self.working.has_member(attendance.member_id) {
            return Err(GymError::InvalidReference(EntityKind::Member));
        }
        if self.working.attendance.iter().any(|a| {
            a.member_id == attendance.member_id && a.session_id == attendance.session_id
        }) {
            return Err(GymError::AlreadyCheckedIn);
        }
        self.working.attendance.push(attendance.clone());
        Ok(())
    }

    async fn find_attendance(
        &mut self,
        member_id: Uuid,
        session_id: Uuid,
    ) -> GymResult<Option<Attendance>> {
        Ok(self
            .working
            .attendance
            .iter()
            .find(|a| a.member_id == member_id && a.session_id == session_id)
            .cloned())
    }

    async fn list_attendance_by_member(&mut self, member_id: Uuid) -> GymResult<Vec<Attendance>> {
        let rows = self
            .working
            .attendance
            .iter()
            .filter(|a| a.member_id == member_id)
            .cloned();
        Ok(newest_first(rows, |a| a.checked_in_at))
    }

    async fn list_attendance(&mut self) -> GymResult<Vec<Attendance>> {
        let rows = self.working.attendance.iter().cloned();
        Ok(newest_first(rows, |a| a.checked_in_at))
    }
}

#[async_trait]
impl PaymentRepository for MemoryTransaction {
    async fn insert_payment(&mut self, payment: &Payment) -> GymResult<()> {
        if !self.working.has_member(payment.member_id) {
            return Err(GymError::InvalidReference(EntityKind::Member));
        }
        self.working.payments.push(payment.clone());
        Ok(())
    }

    async fn list_payments_by_member(&mut self, member_id: Uuid) -> GymResult<Vec<Payment>> {
        let rows = self
            .working
            .payments
            .iter()
            .filter(|p| p.member_id == member_id)
            .cloned();
        Ok(newest_first(rows, |p| p.created_at))
    }

    async fn list_payments(&mut self) -> GymResult<Vec<Payment>> {
        let rows = self.working.payments.iter().cloned();
        Ok(newest_first(rows, |p| p.created_at))
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn commit(self: Box<Self>) -> GymResult<()> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> GymResult<()> {
        Ok(())
    }
}
