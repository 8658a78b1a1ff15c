use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/plans",
            post(handlers::plans::create_plan).get(handlers::plans::list_plans),
        )
        .route(
            "/plans/:id",
            get(handlers::plans::get_plan).put(handlers::plans::update_plan),
        )
}
