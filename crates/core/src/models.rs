pub mod attendance;
pub mod booking;
pub mod class;
pub mod gym;
pub mod member;
pub mod membership;
pub mod payment;
pub mod plan;
pub mod user;
