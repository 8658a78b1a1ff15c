use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use gym_core::models::membership::{CreateMembershipRequest, LifecycleReport, Membership};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn create_membership(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateMembershipRequest>,
) -> Result<(StatusCode, Json<Membership>), AppError> {
    let membership = state.services.memberships.create(payload).await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

#[axum::debug_handler]
pub async fn get_membership(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Membership>, AppError> {
    Ok(Json(state.services.memberships.get(id).await?))
}

#[axum::debug_handler]
pub async fn list_member_memberships(
    State(state): State<Arc<ApiState>>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<Membership>>, AppError> {
    Ok(Json(state.services.memberships.list_by_member(member_id).await?))
}

#[axum::debug_handler]
pub async fn cancel_membership(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Membership>, AppError> {
    Ok(Json(state.services.memberships.cancel(id).await?))
}

/// Operator trigger for the expiry and renewal sweep.
#[axum::debug_handler]
pub async fn process_lifecycle(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<LifecycleReport>, AppError> {
    Ok(Json(state.services.memberships.process_lifecycle().await?))
}
