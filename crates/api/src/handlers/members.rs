use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use gym_core::models::member::{CreateMemberRequest, Member, UpdateMemberRequest};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn create_member(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<Member>), AppError> {
    let member = state.services.members.create(payload).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

#[axum::debug_handler]
pub async fn list_members(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<Member>>, AppError> {
    Ok(Json(state.services.members.list().await?))
}

#[axum::debug_handler]
pub async fn get_member(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Member>, AppError> {
    Ok(Json(state.services.members.get(id).await?))
}

#[axum::debug_handler]
pub async fn update_member(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMemberRequest>,
) -> Result<Json<Member>, AppError> {
    Ok(Json(state.services.members.update(id, payload).await?))
}

#[axum::debug_handler]
pub async fn delete_member(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.services.members.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
