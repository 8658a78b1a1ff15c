use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use gym_core::models::booking::{BookRequest, Booking};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn book(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<BookRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = state
        .services
        .bookings
        .book(payload.member_id, payload.session_id)
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.services.bookings.cancel(id).await?))
}

#[axum::debug_handler]
pub async fn list_member_bookings(
    State(state): State<Arc<ApiState>>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.services.bookings.list_by_member(member_id).await?))
}
