use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/memberships", post(handlers::memberships::create_membership))
        .route(
            "/memberships/lifecycle",
            post(handlers::memberships::process_lifecycle),
        )
        .route("/memberships/:id", get(handlers::memberships::get_membership))
        .route(
            "/memberships/:id/cancel",
            post(handlers::memberships::cancel_membership),
        )
        .route(
            "/memberships/member/:member_id",
            get(handlers::memberships::list_member_memberships),
        )
}
