use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use gym_core::models::attendance::{Attendance, CheckInRequest, CheckinMethod};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn check_in(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CheckInRequest>,
) -> Result<(StatusCode, Json<Attendance>), AppError> {
    let method: CheckinMethod = payload.method.parse()?;
    let attendance = state
        .services
        .attendance
        .check_in(payload.member_id, payload.session_id, method)
        .await?;
    Ok((StatusCode::CREATED, Json(attendance)))
}

#[axum::debug_handler]
pub async fn list_member_attendance(
    State(state): State<Arc<ApiState>>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<Attendance>>, AppError> {
    Ok(Json(state.services.attendance.list_by_member(member_id).await?))
}

#[axum::debug_handler]
pub async fn list_attendance(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<Attendance>>, AppError> {
    Ok(Json(state.services.attendance.list_all().await?))
}
