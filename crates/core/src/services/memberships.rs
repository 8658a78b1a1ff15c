use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::{EntityKind, GymError, GymResult};
use crate::models::membership::{
    CreateMembershipRequest, LifecycleReport, Membership, MembershipStatus, OverlapPolicy,
};
use crate::services::{ServiceContext, finish};
use crate::store::Transaction;

/// The member's active membership whose window intersects `candidate`'s.
async fn find_overlap(
    tx: &mut dyn Transaction,
    candidate: &Membership,
) -> GymResult<Option<Membership>> {
    let existing = tx.list_memberships_by_member(candidate.member_id).await?;
    Ok(existing
        .into_iter()
        .find(|m| m.id != candidate.id && m.overlaps(candidate.start_date, candidate.end_date)))
}

/// Validates references and overlap, then writes `membership` on `tx`.
///
/// Under [`OverlapPolicy::Reject`] the member row stays locked until `tx`
/// ends, so concurrent writers for one member cannot both pass the check.
pub(crate) async fn insert_checked(
    tx: &mut dyn Transaction,
    membership: &Membership,
    policy: OverlapPolicy,
) -> GymResult<()> {
    crate::time::ensure_window(membership.start_date, membership.end_date)?;

    if tx.lock_member(membership.member_id).await?.is_none() {
        return Err(GymError::InvalidReference(EntityKind::Member));
    }
    if tx.find_plan_by_id(membership.plan_id).await?.is_none() {
        return Err(GymError::InvalidReference(EntityKind::Plan));
    }

    if policy == OverlapPolicy::Reject && membership.status == MembershipStatus::Active {
        if let Some(clash) = find_overlap(tx, membership).await? {
            return Err(GymError::Validation(format!(
                "membership window overlaps active membership {}",
                clash.id
            )));
        }
    }

    tx.insert_membership(membership).await
}

async fn sweep(
    tx: &mut dyn Transaction,
    policy: OverlapPolicy,
    now: DateTime<Utc>,
) -> GymResult<LifecycleReport> {
    let mut report = LifecycleReport::default();

    for mut membership in tx.list_due_memberships(now).await? {
        membership.transition_to(MembershipStatus::Expired, now)?;
        tx.update_membership(&membership).await?;

        if membership.auto_renew {
            let plan = tx
                .find_plan_by_id(membership.plan_id)
                .await?
                .ok_or(GymError::InvalidReference(EntityKind::Plan))?;

            // Catch up on every cycle missed since the window ended.
            let mut lapsed = Vec::new();
            let mut next = membership.renewal(plan.billing_cycle, now)?;
            while next.is_due(now) {
                next.transition_to(MembershipStatus::Expired, now)?;
                let following = next.renewal(plan.billing_cycle, now)?;
                lapsed.push(std::mem::replace(&mut next, following));
            }

            let clash = match policy {
                OverlapPolicy::Reject => {
                    tx.lock_member(membership.member_id).await?;
                    find_overlap(tx, &next).await?
                }
                OverlapPolicy::Allow => None,
            };

            match clash {
                Some(clash) => warn!(
                    membership_id = %membership.id,
                    clash_id = %clash.id,
                    "renewal skipped, window overlaps an active membership"
                ),
                None => {
                    for record in lapsed {
                        tx.insert_membership(&record).await?;
                        report.expired.push(record);
                    }
                    tx.insert_membership(&next).await?;
                    report.renewed.push(next);
                }
            }
        }

        report.expired.push(membership);
    }

    Ok(report)
}

async fn cancel_in(
    tx: &mut dyn Transaction,
    id: Uuid,
    now: DateTime<Utc>,
) -> GymResult<Membership> {
    let mut membership = tx
        .lock_membership(id)
        .await?
        .ok_or_else(|| GymError::NotFound(format!("Membership with ID {id} not found")))?;
    if membership.is_due(now) {
        return Err(GymError::InvalidState(format!(
            "membership {id} has already ended"
        )));
    }
    membership.transition_to(MembershipStatus::Cancelled, now)?;
    tx.update_membership(&membership).await?;
    Ok(membership)
}

/// Membership Lifecycle Manager.
#[derive(Clone)]
pub struct MembershipService {
    ctx: ServiceContext,
    overlap_policy: OverlapPolicy,
}

impl MembershipService {
    pub fn new(ctx: ServiceContext, overlap_policy: OverlapPolicy) -> Self {
        Self {
            ctx,
            overlap_policy,
        }
    }

    pub async fn create(&self, request: CreateMembershipRequest) -> GymResult<Membership> {
        self.ctx
            .within("membership.create", self.create_inner(request))
            .await
    }

    pub async fn get(&self, id: Uuid) -> GymResult<Membership> {
        self.ctx.within("membership.get", self.get_inner(id)).await
    }

    /// All of a member's memberships, newest first, with status as of now.
    pub async fn list_by_member(&self, member_id: Uuid) -> GymResult<Vec<Membership>> {
        self.ctx
            .within("membership.list_by_member", self.list_by_member_inner(member_id))
            .await
    }

    pub async fn cancel(&self, id: Uuid) -> GymResult<Membership> {
        self.ctx
            .within("membership.cancel", self.cancel_inner(id))
            .await
    }

    /// Expires every lapsed active membership and renews the auto-renewing
    /// ones, all in one transaction.
    pub async fn process_lifecycle(&self) -> GymResult<LifecycleReport> {
        self.ctx
            .within("membership.process_lifecycle", self.process_lifecycle_inner())
            .await
    }

    async fn create_inner(&self, request: CreateMembershipRequest) -> GymResult<Membership> {
        let now = self.ctx.clock.now();
        let mut membership = Membership::new(
            request.member_id,
            request.plan_id,
            request.start_date,
            request.end_date,
            request.auto_renew.unwrap_or(true),
            now,
        )?;
        membership.payment_method_id = request.payment_method_id;

        let mut tx = self.ctx.db.begin().await?;
        let result = insert_checked(tx.as_mut(), &membership, self.overlap_policy).await;
        finish(tx, result).await?;

        info!(
            membership_id = %membership.id,
            member_id = %membership.member_id,
            plan_id = %membership.plan_id,
            "membership created"
        );
        Ok(membership)
    }

    async fn get_inner(&self, id: Uuid) -> GymResult<Membership> {
        let now = self.ctx.clock.now();
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.find_membership_by_id(id).await;
        let mut membership = finish(tx, result)
            .await?
            .ok_or_else(|| GymError::NotFound(format!("Membership with ID {id} not found")))?;
        membership.status = membership.status_at(now);
        Ok(membership)
    }

    async fn list_by_member_inner(&self, member_id: Uuid) -> GymResult<Vec<Membership>> {
        let now = self.ctx.clock.now();
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.list_memberships_by_member(member_id).await;
        let mut memberships = finish(tx, result).await?;
        for membership in &mut memberships {
            membership.status = membership.status_at(now);
        }
        debug!(%member_id, count = memberships.len(), "listed memberships");
        Ok(memberships)
    }

    async fn cancel_inner(&self, id: Uuid) -> GymResult<Membership> {
        let now = self.ctx.clock.now();
        let mut tx = self.ctx.db.begin().await?;
        let result = cancel_in(tx.as_mut(), id, now).await;
        let membership = finish(tx, result).await.inspect_err(|err| {
            if err.is_conflict() {
                warn!(membership_id = %id, error = %err, "membership cancel rejected");
            }
        })?;
        info!(membership_id = %id, "membership cancelled");
        Ok(membership)
    }

    async fn process_lifecycle_inner(&self) -> GymResult<LifecycleReport> {
        let now = self.ctx.clock.now();
        let mut tx = self.ctx.db.begin().await?;
        let result = sweep(tx.as_mut(), self.overlap_policy, now).await;
        let report = finish(tx, result).await?;
        info!(
            expired = report.expired.len(),
            renewed = report.renewed.len(),
            "membership lifecycle processed"
        );
        Ok(report)
    }
}
