use axum::{extract::State, routing::get, Json, Router};
use gym_core::store::Database;
use serde::Serialize;
use std::sync::Arc;

use crate::{middleware::error_handling::AppError, ApiState};

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct VersionResponse {
    version: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Ready only when the store answers.
async fn readiness(State(state): State<Arc<ApiState>>) -> Result<Json<HealthResponse>, AppError> {
    state.db.ping().await?;
    Ok(Json(HealthResponse {
        status: "ready".to_string(),
    }))
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
        .route("/version", get(version))
}
