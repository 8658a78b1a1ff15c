use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/members",
            post(handlers::members::create_member).get(handlers::members::list_members),
        )
        .route(
            "/members/:id",
            get(handlers::members::get_member)
                .put(handlers::members::update_member)
                .delete(handlers::members::delete_member),
        )
}
