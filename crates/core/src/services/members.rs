use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{EntityKind, GymError, GymResult};
use crate::models::member::{CreateMemberRequest, Member, UpdateMemberRequest};
use crate::models::user::Role;
use crate::services::{finish, ServiceContext};
use crate::store::Transaction;

fn not_found(id: Uuid) -> GymError {
    GymError::NotFound(format!("Member with ID {id} not found"))
}

async fn create_in(
    tx: &mut dyn Transaction,
    request: CreateMemberRequest,
    now: DateTime<Utc>,
) -> GymResult<Member> {
    let user = tx
        .find_user_by_id(request.user_id)
        .await?
        .ok_or(GymError::InvalidReference(EntityKind::User))?;
    if user.role != Role::Member {
        return Err(GymError::Validation(format!(
            "User {} has role {}, only members get a profile",
            user.id, user.role
        )));
    }
    if tx.find_member_by_user_id(user.id).await?.is_some() {
        return Err(GymError::Validation(format!(
            "User {} already has a member profile",
            user.id
        )));
    }

    let member = Member {
        id: Uuid::new_v4(),
        user_id: user.id,
        first_name: request.first_name,
        last_name: request.last_name,
        date_of_birth: request.date_of_birth,
        gender: request.gender,
        emergency_contact: request.emergency_contact.unwrap_or_default(),
        notes: request.notes,
        created_at: now,
        updated_at: now,
    };
    tx.insert_member(&member).await?;
    Ok(member)
}

async fn update_in(
    tx: &mut dyn Transaction,
    id: Uuid,
    update: UpdateMemberRequest,
    now: DateTime<Utc>,
) -> GymResult<Member> {
    let mut member = tx.find_member_by_id(id).await?.ok_or_else(|| not_found(id))?;
    member.apply(update, now);
    tx.update_member(&member).await?;
    Ok(member)
}

/// Member profiles.
#[derive(Clone)]
pub struct MemberService {
    ctx: ServiceContext,
}

impl MemberService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn create(&self, request: CreateMemberRequest) -> GymResult<Member> {
        self.ctx.within("member.create", self.create_inner(request)).await
    }

    pub async fn get(&self, id: Uuid) -> GymResult<Member> {
        self.ctx.within("member.get", self.get_inner(id)).await
    }

    pub async fn list(&self) -> GymResult<Vec<Member>> {
        self.ctx.within("member.list", self.list_inner()).await
    }

    pub async fn update(&self, id: Uuid, update: UpdateMemberRequest) -> GymResult<Member> {
        self.ctx
            .within("member.update", self.update_inner(id, update))
            .await
    }

    /// Deletes the profile together with its memberships, bookings,
    /// attendance and payments.
    pub async fn delete(&self, id: Uuid) -> GymResult<()> {
        self.ctx.within("member.delete", self.delete_inner(id)).await
    }

    async fn create_inner(&self, request: CreateMemberRequest) -> GymResult<Member> {
        let now = self.ctx.clock.now();
        let mut tx = self.ctx.db.begin().await?;
        let result = create_in(tx.as_mut(), request, now).await;
        let member = finish(tx, result).await?;
        info!(member_id = %member.id, user_id = %member.user_id, "member created");
        Ok(member)
    }

    async fn get_inner(&self, id: Uuid) -> GymResult<Member> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.find_member_by_id(id).await;
        finish(tx, result).await?.ok_or_else(|| not_found(id))
    }

    async fn list_inner(&self) -> GymResult<Vec<Member>> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.list_members().await;
        let members = finish(tx, result).await?;
        debug!(count = members.len(), "listed members");
        Ok(members)
    }

    async fn update_inner(&self, id: Uuid, update: UpdateMemberRequest) -> GymResult<Member> {
        let now = self.ctx.clock.now();
        let mut tx = self.ctx.db.begin().await?;
        let result = update_in(tx.as_mut(), id, update, now).await;
        let member = finish(tx, result).await?;
        info!(member_id = %id, "member updated");
        Ok(member)
    }

    async fn delete_inner(&self, id: Uuid) -> GymResult<()> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.delete_member(id).await;
        if !finish(tx, result).await? {
            return Err(not_found(id));
        }
        info!(member_id = %id, "member deleted");
        Ok(())
    }
}
