//! Membership records and their status state machine.
//!
//! ```text
//! active ──(now >= end)──▶ expired
//!   │
//!   └──(cancel)──────────▶ cancelled
//! ```
//!
//! Renewal never revives a record: the expired one stays as history and a
//! fresh active record covers the next billing cycle.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{GymError, GymResult};
use crate::models::plan::BillingCycle;
use crate::time::ensure_window;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    Expired,
    Cancelled,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "active",
            MembershipStatus::Expired => "expired",
            MembershipStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, MembershipStatus::Active)
    }

    pub fn can_transition_to(&self, target: MembershipStatus) -> bool {
        matches!(
            (self, target),
            (MembershipStatus::Active, MembershipStatus::Expired)
                | (MembershipStatus::Active, MembershipStatus::Cancelled)
        )
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipStatus {
    type Err = GymError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(MembershipStatus::Active),
            "expired" => Ok(MembershipStatus::Expired),
            "cancelled" | "canceled" => Ok(MembershipStatus::Cancelled),
            other => Err(GymError::Validation(format!("Unknown membership status: {other}"))),
        }
    }
}

/// Binding of a member to a plan over the half-open window `[start_date, end_date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub member_id: Uuid,
    pub plan_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: MembershipStatus,
    pub auto_renew: bool,
    pub payment_method_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(
        member_id: Uuid,
        plan_id: Uuid,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        auto_renew: bool,
        now: DateTime<Utc>,
    ) -> GymResult<Self> {
        ensure_window(start_date, end_date)?;
        Ok(Self {
            id: Uuid::new_v4(),
            member_id,
            plan_id,
            start_date,
            end_date,
            status: MembershipStatus::Active,
            auto_renew,
            payment_method_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Status as observed at `now`. An active record whose window has ended
    /// reads as expired even before the lifecycle sweep writes it.
    pub fn status_at(&self, now: DateTime<Utc>) -> MembershipStatus {
        if self.is_due(now) {
            MembershipStatus::Expired
        } else {
            self.status
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == MembershipStatus::Active && now >= self.end_date
    }

    pub fn covers(&self, instant: DateTime<Utc>) -> bool {
        self.start_date <= instant && instant < self.end_date
    }

    /// True when this record is active and its window intersects `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.status == MembershipStatus::Active && start < self.end_date && self.start_date < end
    }

    pub fn transition_to(&mut self, target: MembershipStatus, now: DateTime<Utc>) -> GymResult<()> {
        if !self.status.can_transition_to(target) {
            return Err(GymError::InvalidState(format!(
                "membership {} cannot move from {} to {}",
                self.id, self.status, target
            )));
        }
        self.status = target;
        self.updated_at = now;
        Ok(())
    }

    /// The record that continues this one for the next billing cycle.
    pub fn renewal(&self, cycle: BillingCycle, now: DateTime<Utc>) -> GymResult<Membership> {
        let end_date = cycle.advance(self.end_date)?;
        let mut next = Membership::new(
            self.member_id,
            self.plan_id,
            self.end_date,
            end_date,
            self.auto_renew,
            now,
        )?;
        next.payment_method_id = self.payment_method_id.clone();
        Ok(next)
    }
}

/// Whether a member may hold overlapping active memberships.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    #[default]
    Allow,
    Reject,
}

impl FromStr for OverlapPolicy {
    type Err = GymError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow" => Ok(OverlapPolicy::Allow),
            "reject" => Ok(OverlapPolicy::Reject),
            other => Err(GymError::Validation(format!("Unknown overlap policy: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembershipRequest {
    pub member_id: Uuid,
    pub plan_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub auto_renew: Option<bool>,
    pub payment_method_id: Option<String>,
}

/// Outcome of one lifecycle sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LifecycleReport {
    pub expired: Vec<Membership>,
    pub renewed: Vec<Membership>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn january() -> Membership {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        Membership::new(Uuid::new_v4(), Uuid::new_v4(), start, end, true, start).unwrap()
    }

    #[test]
    fn rejects_empty_window() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let err = Membership::new(Uuid::new_v4(), Uuid::new_v4(), start, start, true, start)
            .unwrap_err();
        assert!(matches!(err, GymError::Validation(_)));
    }

    #[test]
    fn reads_expired_once_window_ends() {
        let membership = january();
        assert_eq!(membership.status_at(membership.start_date), MembershipStatus::Active);
        assert_eq!(
            membership.status_at(membership.end_date - Duration::seconds(1)),
            MembershipStatus::Active
        );
        assert_eq!(membership.status_at(membership.end_date), MembershipStatus::Expired);
    }

    #[test]
    fn cancelled_stays_cancelled_after_end() {
        let mut membership = january();
        membership
            .transition_to(MembershipStatus::Cancelled, membership.start_date)
            .unwrap();
        assert_eq!(
            membership.status_at(membership.end_date + Duration::days(30)),
            MembershipStatus::Cancelled
        );
        assert!(!membership.is_due(membership.end_date));
    }

    #[test]
    fn terminal_states_reject_transitions() {
        let mut membership = january();
        let now = membership.end_date;
        membership.transition_to(MembershipStatus::Expired, now).unwrap();

        let err = membership
            .transition_to(MembershipStatus::Cancelled, now)
            .unwrap_err();
        assert!(matches!(err, GymError::InvalidState(_)));
        assert!(MembershipStatus::Expired.is_terminal());
        assert!(MembershipStatus::Cancelled.is_terminal());
    }

    #[test]
    fn renewal_starts_where_previous_ended() {
        let membership = january();
        let next = membership
            .renewal(BillingCycle::Monthly, membership.end_date)
            .unwrap();

        assert_ne!(next.id, membership.id);
        assert_eq!(next.start_date, membership.end_date);
        assert_eq!(next.end_date, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(next.status, MembershipStatus::Active);
        assert!(next.auto_renew);
    }

    #[test]
    fn overlap_is_half_open() {
        let membership = january();
        assert!(membership.overlaps(
            membership.end_date - Duration::days(1),
            membership.end_date + Duration::days(1)
        ));
        assert!(!membership.overlaps(membership.end_date, membership.end_date + Duration::days(30)));
        assert!(membership.covers(membership.start_date));
        assert!(!membership.covers(membership.end_date));
    }
}
