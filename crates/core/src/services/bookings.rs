//! Booking Manager.
//!
//! `book` serializes on the session row lock: the capacity count, the
//! duplicate check and the insert all happen while the lock is held, so two
//! concurrent requests for the last seat cannot both pass the count.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::{EntityKind, GymError, GymResult};
use crate::models::booking::{Booking, BookingStatus};
use crate::models::class::SessionStatus;
use crate::services::{finish, ServiceContext};
use crate::store::Transaction;

async fn book_in(
    tx: &mut dyn Transaction,
    member_id: Uuid,
    session_id: Uuid,
    now: DateTime<Utc>,
) -> GymResult<Booking> {
    let session = tx
        .lock_session(session_id)
        .await?
        .ok_or(GymError::InvalidReference(EntityKind::Session))?;
    if session.status != SessionStatus::Scheduled {
        return Err(GymError::InvalidState(format!(
            "session {session_id} is {}, bookings are closed",
            session.status
        )));
    }
    if tx.find_member_by_id(member_id).await?.is_none() {
        return Err(GymError::InvalidReference(EntityKind::Member));
    }

    let taken = tx.count_active_bookings(session_id).await?;
    if taken >= i64::from(session.capacity) {
        return Err(GymError::SessionFull);
    }
    if tx.find_active_booking(member_id, session_id).await?.is_some() {
        return Err(GymError::AlreadyBooked);
    }

    let booking = Booking {
        id: Uuid::new_v4(),
        session_id,
        member_id,
        status: BookingStatus::Booked,
        created_at: now,
        updated_at: now,
    };
    tx.insert_booking(&booking).await?;
    Ok(booking)
}

async fn cancel_in(tx: &mut dyn Transaction, id: Uuid, now: DateTime<Utc>) -> GymResult<Booking> {
    let mut booking = tx
        .lock_booking(id)
        .await?
        .ok_or_else(|| GymError::NotFound(format!("Booking with ID {id} not found")))?;
    if booking.status != BookingStatus::Booked {
        return Err(GymError::InvalidState(format!(
            "booking {id} is {} and cannot be cancelled",
            booking.status
        )));
    }
    booking.status = BookingStatus::Cancelled;
    booking.updated_at = now;
    tx.update_booking(&booking).await?;
    Ok(booking)
}

#[derive(Clone)]
pub struct BookingService {
    ctx: ServiceContext,
}

impl BookingService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Reserves one seat. A full session wins over a duplicate booking.
    pub async fn book(&self, member_id: Uuid, session_id: Uuid) -> GymResult<Booking> {
        self.ctx
            .within("booking.book", self.book_inner(member_id, session_id))
            .await
    }

    /// Frees the seat. History is kept.
    pub async fn cancel(&self, id: Uuid) -> GymResult<Booking> {
        self.ctx.within("booking.cancel", self.cancel_inner(id)).await
    }

    pub async fn list_by_member(&self, member_id: Uuid) -> GymResult<Vec<Booking>> {
        self.ctx
            .within("booking.list_by_member", self.list_by_member_inner(member_id))
            .await
    }

    pub async fn list_by_session(&self, session_id: Uuid) -> GymResult<Vec<Booking>> {
        self.ctx
            .within("booking.list_by_session", self.list_by_session_inner(session_id))
            .await
    }

    async fn book_inner(&self, member_id: Uuid, session_id: Uuid) -> GymResult<Booking> {
        let now = self.ctx.clock.now();
        let mut tx = self.ctx.db.begin().await?;
        let result = book_in(tx.as_mut(), member_id, session_id, now).await;
        let booking = finish(tx, result).await.inspect_err(|err| {
            if err.is_conflict() {
                warn!(%member_id, %session_id, error = %err, "booking rejected");
            }
        })?;
        info!(booking_id = %booking.id, %member_id, %session_id, "seat booked");
        Ok(booking)
    }

    async fn cancel_inner(&self, id: Uuid) -> GymResult<Booking> {
        let now = self.ctx.clock.now();
        let mut tx = self.ctx.db.begin().await?;
        let result = cancel_in(tx.as_mut(), id, now).await;
        let booking = finish(tx, result).await.inspect_err(|err| {
            if err.is_conflict() {
                warn!(booking_id = %id, error = %err, "booking cancel rejected");
            }
        })?;
        info!(booking_id = %id, session_id = %booking.session_id, "booking cancelled");
        Ok(booking)
    }

    async fn list_by_member_inner(&self, member_id: Uuid) -> GymResult<Vec<Booking>> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.list_bookings_by_member(member_id).await;
        let bookings = finish(tx, result).await?;
        debug!(%member_id, count = bookings.len(), "listed bookings");
        Ok(bookings)
    }

    async fn list_by_session_inner(&self, session_id: Uuid) -> GymResult<Vec<Booking>> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.list_bookings_by_session(session_id).await;
        let bookings = finish(tx, result).await?;
        debug!(%session_id, count = bookings.len(), "listed bookings");
        Ok(bookings)
    }
}
