use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use gym_core::models::{
    booking::Booking,
    class::{Class, ClassSession, CreateClassRequest, CreateSessionRequest},
    gym::{CreateGymRequest, Gym, UpdateGymRequest},
};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn create_gym(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateGymRequest>,
) -> Result<(StatusCode, Json<Gym>), AppError> {
    let gym = state.services.catalog.create_gym(payload).await?;
    Ok((StatusCode::CREATED, Json(gym)))
}

#[axum::debug_handler]
pub async fn list_gyms(State(state): State<Arc<ApiState>>) -> Result<Json<Vec<Gym>>, AppError> {
    Ok(Json(state.services.catalog.list_gyms().await?))
}

#[axum::debug_handler]
pub async fn get_gym(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Gym>, AppError> {
    Ok(Json(state.services.catalog.get_gym(id).await?))
}

#[axum::debug_handler]
pub async fn update_gym(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateGymRequest>,
) -> Result<Json<Gym>, AppError> {
    Ok(Json(state.services.catalog.update_gym(id, payload).await?))
}

#[axum::debug_handler]
pub async fn create_class(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateClassRequest>,
) -> Result<(StatusCode, Json<Class>), AppError> {
    let class = state.services.catalog.create_class(payload).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

#[axum::debug_handler]
pub async fn list_classes(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<Class>>, AppError> {
    Ok(Json(state.services.catalog.list_classes().await?))
}

#[axum::debug_handler]
pub async fn get_class(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Class>, AppError> {
    Ok(Json(state.services.catalog.get_class(id).await?))
}

#[axum::debug_handler]
pub async fn list_class_sessions(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ClassSession>>, AppError> {
    Ok(Json(state.services.catalog.list_sessions(Some(id)).await?))
}

/// Session times arrive as RFC 3339 strings and are parsed before the store
/// is touched.
#[axum::debug_handler]
pub async fn create_session(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<ClassSession>), AppError> {
    let new = payload.parse()?;
    let session = state.services.catalog.create_session(new).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[axum::debug_handler]
pub async fn list_sessions(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<ClassSession>>, AppError> {
    Ok(Json(state.services.catalog.list_sessions(None).await?))
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClassSession>, AppError> {
    Ok(Json(state.services.catalog.get_session(id).await?))
}

#[axum::debug_handler]
pub async fn cancel_session(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClassSession>, AppError> {
    Ok(Json(state.services.catalog.cancel_session(id).await?))
}

#[axum::debug_handler]
pub async fn complete_session(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClassSession>, AppError> {
    Ok(Json(state.services.catalog.complete_session(id).await?))
}

#[axum::debug_handler]
pub async fn list_session_bookings(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.services.bookings.list_by_session(id).await?))
}
