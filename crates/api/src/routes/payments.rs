use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/payments",
            post(handlers::payments::record_payment).get(handlers::payments::list_payments),
        )
        .route(
            "/payments/member/:member_id",
            get(handlers::payments::list_member_payments),
        )
}
