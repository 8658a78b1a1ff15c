use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/users", get(handlers::auth::list_users))
        .route("/auth/users/:id", get(handlers::auth::get_user))
        .route("/auth/trainers", get(handlers::auth::list_trainers))
}
