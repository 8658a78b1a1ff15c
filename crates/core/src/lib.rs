pub mod auth;
pub mod clock;
pub mod errors;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod models;
pub mod services;
pub mod store;
pub mod time;
