use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/bookings", post(handlers::bookings::book))
        .route("/bookings/:id/cancel", post(handlers::bookings::cancel_booking))
        .route(
            "/bookings/member/:member_id",
            get(handlers::bookings::list_member_bookings),
        )
}
