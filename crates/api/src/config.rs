//! # API Configuration
//!
//! Settings are read from the environment (after `.env` has been loaded by the
//! binary). Only `DATABASE_URL` is required.
//!
//! - `API_HOST`: bind address (default: "0.0.0.0")
//! - `API_PORT`: listen port (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 5)
//! - `LOG_LEVEL`: trace, debug, info, warn or error (default: "info")
//! - `API_CORS_ORIGINS`: comma-separated list of allowed origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: per-request timeout (default: 30)
//! - `OPERATION_TIMEOUT_MS`: deadline for each domain operation (default: 5000)
//! - `MEMBERSHIP_OVERLAP_POLICY`: `allow` or `reject` (default: "allow")

use std::env;
use std::time::Duration;

use eyre::{Result, WrapErr};
use gym_core::models::membership::OverlapPolicy;
use gym_core::services::ServiceSettings;
use tracing::Level;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub log_level: Level,
    pub cors_origins: Option<Vec<String>>,
    /// Whole-request timeout in seconds, enforced by the HTTP layer.
    pub request_timeout: u64,
    /// Deadline handed to every core operation.
    pub operation_timeout: Duration,
    pub overlap_policy: OverlapPolicy,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = var("API_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        let database_url =
            var("DATABASE_URL").ok_or_else(|| eyre::eyre!("DATABASE_URL environment variable must be set"))?;
        let database_max_connections = var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse()
            .wrap_err("Invalid DATABASE_MAX_CONNECTIONS value")?;

        let log_level = match var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()).as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        let cors_origins = var("API_CORS_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        let request_timeout = var("API_REQUEST_TIMEOUT_SECONDS")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(30);

        let operation_timeout = var("OPERATION_TIMEOUT_MS")
            .map(|raw| raw.parse::<u64>().wrap_err("Invalid OPERATION_TIMEOUT_MS value"))
            .transpose()?
            .map(Duration::from_millis)
            .unwrap_or(gym_core::services::DEFAULT_OPERATION_TIMEOUT);

        let overlap_policy = var("MEMBERSHIP_OVERLAP_POLICY")
            .map(|raw| raw.parse::<OverlapPolicy>())
            .transpose()
            .wrap_err("Invalid MEMBERSHIP_OVERLAP_POLICY value")?
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
            log_level,
            cors_origins,
            request_timeout,
            operation_timeout,
            overlap_policy,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            operation_timeout: self.operation_timeout,
            overlap_policy: self.overlap_policy,
        }
    }
}
