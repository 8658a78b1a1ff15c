use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers::catalog, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/gyms", post(catalog::create_gym).get(catalog::list_gyms))
        .route("/gyms/:id", get(catalog::get_gym).put(catalog::update_gym))
        .route("/classes", post(catalog::create_class).get(catalog::list_classes))
        .route("/classes/:id", get(catalog::get_class))
        .route("/classes/:id/sessions", get(catalog::list_class_sessions))
        .route(
            "/sessions",
            post(catalog::create_session).get(catalog::list_sessions),
        )
        .route("/sessions/:id", get(catalog::get_session))
        .route("/sessions/:id/cancel", post(catalog::cancel_session))
        .route("/sessions/:id/complete", post(catalog::complete_session))
        .route("/sessions/:id/bookings", get(catalog::list_session_bookings))
}
