use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use gym_core::models::plan::{CreatePlanRequest, Plan, UpdatePlanRequest};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn create_plan(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<Plan>), AppError> {
    let plan = state.services.plans.create(payload).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

#[axum::debug_handler]
pub async fn list_plans(State(state): State<Arc<ApiState>>) -> Result<Json<Vec<Plan>>, AppError> {
    Ok(Json(state.services.plans.list().await?))
}

#[axum::debug_handler]
pub async fn get_plan(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Plan>, AppError> {
    Ok(Json(state.services.plans.get(id).await?))
}

#[axum::debug_handler]
pub async fn update_plan(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePlanRequest>,
) -> Result<Json<Plan>, AppError> {
    Ok(Json(state.services.plans.update(id, payload).await?))
}
