/// Argon2 password hashing
pub mod auth;
/// Domain error to HTTP response mapping
pub mod error_handling;
