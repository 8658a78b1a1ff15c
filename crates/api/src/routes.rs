pub mod attendance;
pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod health;
pub mod members;
pub mod memberships;
pub mod payments;
pub mod plans;
