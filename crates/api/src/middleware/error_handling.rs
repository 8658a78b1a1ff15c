//! # Error Handling
//!
//! Maps the domain error taxonomy onto HTTP status codes. The response body is
//! always `{"error": "<message>"}`; persistence and internal failures only
//! ever expose their fixed display text, while the full report goes to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gym_core::errors::GymError;
use serde_json::json;
use tracing::error;

/// Wraps a [`GymError`] so handlers can return it with `?`.
#[derive(Debug)]
pub struct AppError(pub GymError);

pub fn status_code(err: &GymError) -> StatusCode {
    match err {
        GymError::Validation(_) => StatusCode::BAD_REQUEST,
        GymError::Authentication(_) => StatusCode::UNAUTHORIZED,
        GymError::NotFound(_) => StatusCode::NOT_FOUND,
        GymError::InvalidReference(_) => StatusCode::UNPROCESSABLE_ENTITY,
        GymError::DuplicateIdentity(_)
        | GymError::AlreadyBooked
        | GymError::AlreadyCheckedIn
        | GymError::SessionFull
        | GymError::InvalidState(_) => StatusCode::CONFLICT,
        GymError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        GymError::Persistence(_) | GymError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_code(&self.0);
        if status.is_server_error() {
            error!(error = ?self.0, "request failed");
        }

        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl From<GymError> for AppError {
    fn from(err: GymError) -> Self {
        AppError(err)
    }
}
