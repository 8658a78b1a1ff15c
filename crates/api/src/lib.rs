//! # Gym API
//!
//! Thin HTTP layer over the gym core services. Routes decode requests, call
//! exactly one core operation and map its error kind to a status code; all
//! domain rules live in `gym-core`.
//!
//! - **Routes**: endpoint paths per area
//! - **Handlers**: request decoding and response shaping
//! - **Middleware**: error mapping and the Argon2 password hasher
//! - **Config**: environment configuration

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Error mapping and password hashing
pub mod middleware;
/// Route definitions
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::{HeaderValue, StatusCode},
    BoxError, Router,
};
use eyre::Result;
use gym_core::clock::SystemClock;
use gym_core::services::Services;
use gym_core::store::Database;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::middleware::auth::Argon2Hasher;

/// Shared state handed to every handler.
pub struct ApiState {
    pub services: Services,
    /// Kept alongside the services for the readiness probe.
    pub db: Arc<dyn Database>,
}

/// Assembles every route over `state`, without server-level layers.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::auth::routes())
        .merge(routes::members::routes())
        .merge(routes::plans::routes())
        .merge(routes::memberships::routes())
        .merge(routes::catalog::routes())
        .merge(routes::bookings::routes())
        .merge(routes::attendance::routes())
        .merge(routes::payments::routes())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring malformed CORS origin");
                None
            }
        })
        .collect::<Vec<HeaderValue>>();

    CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .allow_origin(allowed)
        .allow_credentials(true)
}

/// Installs logging, wires the services to `db` and serves until shutdown.
pub async fn start_server(config: config::ApiConfig, db: Arc<dyn Database>) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let services = Services::new(
        db.clone(),
        Arc::new(Argon2Hasher::default()),
        Arc::new(SystemClock),
        config.service_settings(),
    );
    let state = Arc::new(ApiState { services, db });

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)),
        None => app,
    };

    let app = app.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(|_: BoxError| async {
                StatusCode::REQUEST_TIMEOUT
            }))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(
        operation_timeout_ms = config.operation_timeout.as_millis() as u64,
        overlap_policy = ?config.overlap_policy,
        "Server listening on http://{}",
        addr
    );
    axum::serve(listener, app).await?;

    Ok(())
}
