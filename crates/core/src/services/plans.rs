use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{GymError, GymResult};
use crate::models::plan::{CreatePlanRequest, Plan, UpdatePlanRequest};
use crate::services::{finish, ServiceContext};

fn not_found(id: Uuid) -> GymError {
    GymError::NotFound(format!("Plan with ID {id} not found"))
}

/// Plan catalog. Plans are never deleted; memberships keep pointing at them.
#[derive(Clone)]
pub struct PlanService {
    ctx: ServiceContext,
}

impl PlanService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn create(&self, request: CreatePlanRequest) -> GymResult<Plan> {
        self.ctx.within("plan.create", self.create_inner(request)).await
    }

    pub async fn list(&self) -> GymResult<Vec<Plan>> {
        self.ctx.within("plan.list", self.list_inner()).await
    }

    pub async fn get(&self, id: Uuid) -> GymResult<Plan> {
        self.ctx.within("plan.get", self.get_inner(id)).await
    }

    pub async fn update(&self, id: Uuid, update: UpdatePlanRequest) -> GymResult<Plan> {
        self.ctx.within("plan.update", self.update_inner(id, update)).await
    }

    async fn create_inner(&self, request: CreatePlanRequest) -> GymResult<Plan> {
        let now = self.ctx.clock.now();
        let plan = Plan {
            id: Uuid::new_v4(),
            title: request.title,
            description: request.description,
            price_cents: request.price_cents,
            billing_cycle: request.billing_cycle,
            session_quota: request.session_quota,
            access: request.access,
            created_at: now,
            updated_at: now,
        };
        plan.validate()?;

        let mut tx = self.ctx.db.begin().await?;
        let result = tx.insert_plan(&plan).await;
        finish(tx, result).await?;

        info!(plan_id = %plan.id, cycle = %plan.billing_cycle, "plan created");
        Ok(plan)
    }

    async fn list_inner(&self) -> GymResult<Vec<Plan>> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.list_plans().await;
        let plans = finish(tx, result).await?;
        debug!(count = plans.len(), "listed plans");
        Ok(plans)
    }

    async fn get_inner(&self, id: Uuid) -> GymResult<Plan> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.find_plan_by_id(id).await;
        finish(tx, result).await?.ok_or_else(|| not_found(id))
    }

    async fn update_inner(&self, id: Uuid, update: UpdatePlanRequest) -> GymResult<Plan> {
        let now = self.ctx.clock.now();
        let mut tx = self.ctx.db.begin().await?;
        let result = async {
            let mut plan = tx.find_plan_by_id(id).await?.ok_or_else(|| not_found(id))?;
            plan.apply(update, now);
            plan.validate()?;
            tx.update_plan(&plan).await?;
            Ok::<_, GymError>(plan)
        }
        .await;
        let plan = finish(tx, result).await?;
        info!(plan_id = %id, "plan updated");
        Ok(plan)
    }
}
