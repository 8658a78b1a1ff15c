use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/attendance/checkin", post(handlers::attendance::check_in))
        .route("/attendance/all", get(handlers::attendance::list_attendance))
        .route(
            "/attendance/member/:member_id",
            get(handlers::attendance::list_member_attendance),
        )
}
