use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use gym_core::models::user::{
    ListUsersQuery, LoginRequest, RegisterRequest, RegisterResponse, Role, User,
    UserListResponse,
};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let response = state.services.registration.register(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<User>, AppError> {
    let user = state
        .services
        .identity
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(user))
}

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    let users = state.services.identity.list_users(query.role).await?;
    Ok(Json(UserListResponse {
        count: users.len(),
        users,
    }))
}

#[axum::debug_handler]
pub async fn list_trainers(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<UserListResponse>, AppError> {
    let users = state.services.identity.list_users(Some(Role::Trainer)).await?;
    Ok(Json(UserListResponse {
        count: users.len(),
        users,
    }))
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.services.identity.get_user(id).await?))
}
