use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use gym_core::models::payment::{Payment, RecordPaymentRequest};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn record_payment(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), AppError> {
    let payment = state.services.payments.record(payload).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

#[axum::debug_handler]
pub async fn list_payments(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<Payment>>, AppError> {
    Ok(Json(state.services.payments.list_all().await?))
}

#[axum::debug_handler]
pub async fn list_member_payments(
    State(state): State<Arc<ApiState>>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<Payment>>, AppError> {
    Ok(Json(state.services.payments.list_by_member(member_id).await?))
}
