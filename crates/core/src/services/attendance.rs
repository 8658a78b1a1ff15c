//! Attendance Manager.
//!
//! Check-ins for a session serialize on the session row lock, the same one
//! bookings take, so the existence check and the insert see a stable view.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::{EntityKind, GymError, GymResult};
use crate::models::attendance::{Attendance, CheckinMethod};
use crate::models::booking::BookingStatus;
use crate::models::class::SessionStatus;
use crate::services::{finish, ServiceContext};
use crate::store::Transaction;

async fn check_in_in(
    tx: &mut dyn Transaction,
    member_id: Uuid,
    session_id: Uuid,
    method: CheckinMethod,
    now: DateTime<Utc>,
) -> GymResult<Attendance> {
    let session = tx
        .lock_session(session_id)
        .await?
        .ok_or(GymError::InvalidReference(EntityKind::Session))?;
    if session.status == SessionStatus::Cancelled {
        return Err(GymError::InvalidState(format!(
            "session {session_id} was cancelled"
        )));
    }
    if tx.find_member_by_id(member_id).await?.is_none() {
        return Err(GymError::InvalidReference(EntityKind::Member));
    }
    if tx.find_attendance(member_id, session_id).await?.is_some() {
        return Err(GymError::AlreadyCheckedIn);
    }

    let attendance = Attendance {
        id: Uuid::new_v4(),
        session_id,
        member_id,
        checkin_method: method,
        checked_in_at: now,
        created_at: now,
    };
    tx.insert_attendance(&attendance).await?;

    if let Some(mut booking) = tx.find_active_booking(member_id, session_id).await? {
        if booking.status == BookingStatus::Booked {
            booking.status = BookingStatus::Attended;
            booking.updated_at = now;
            tx.update_booking(&booking).await?;
        }
    }

    Ok(attendance)
}

#[derive(Clone)]
pub struct AttendanceService {
    ctx: ServiceContext,
}

impl AttendanceService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Records that the member showed up. A second check-in for the same
    /// session fails with [`GymError::AlreadyCheckedIn`] whatever the method.
    pub async fn check_in(
        &self,
        member_id: Uuid,
        session_id: Uuid,
        method: CheckinMethod,
    ) -> GymResult<Attendance> {
        self.ctx
            .within(
                "attendance.check_in",
                self.check_in_inner(member_id, session_id, method),
            )
            .await
    }

    /// Most recent first.
    pub async fn list_by_member(&self, member_id: Uuid) -> GymResult<Vec<Attendance>> {
        self.ctx
            .within("attendance.list_by_member", self.list_by_member_inner(member_id))
            .await
    }

    pub async fn list_all(&self) -> GymResult<Vec<Attendance>> {
        self.ctx
            .within("attendance.list_all", self.list_all_inner())
            .await
    }

    async fn check_in_inner(
        &self,
        member_id: Uuid,
        session_id: Uuid,
        method: CheckinMethod,
    ) -> GymResult<Attendance> {
        let now = self.ctx.clock.now();
        let mut tx = self.ctx.db.begin().await?;
        let result = check_in_in(tx.as_mut(), member_id, session_id, method, now).await;
        let attendance = finish(tx, result).await.inspect_err(|err| {
            if err.is_conflict() {
                warn!(%member_id, %session_id, error = %err, "check-in rejected");
            }
        })?;
        info!(
            attendance_id = %attendance.id,
            %member_id,
            %session_id,
            method = %method,
            "member checked in"
        );
        Ok(attendance)
    }

    async fn list_by_member_inner(&self, member_id: Uuid) -> GymResult<Vec<Attendance>> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.list_attendance_by_member(member_id).await;
        let records = finish(tx, result).await?;
        debug!(%member_id, count = records.len(), "listed attendance");
        Ok(records)
    }

    async fn list_all_inner(&self) -> GymResult<Vec<Attendance>> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.list_attendance().await;
        let records = finish(tx, result).await?;
        debug!(count = records.len(), "listed all attendance");
        Ok(records)
    }
}
