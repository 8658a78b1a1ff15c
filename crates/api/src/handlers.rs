/// Registration, login and user listings
pub mod auth;
/// Class bookings
pub mod bookings;
/// Gyms, classes and sessions
pub mod catalog;
/// Check-ins
pub mod attendance;
/// Member profiles
pub mod members;
/// Memberships and the lifecycle sweep
pub mod memberships;
/// Payment ledger
pub mod payments;
/// Plan catalog
pub mod plans;
