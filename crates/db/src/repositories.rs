//! Query functions over a single Postgres connection.
//!
//! Each function runs exactly one statement on the connection it is handed;
//! callers decide the transaction it belongs to.

pub mod attendance;
pub mod bookings;
pub mod classes;
pub mod gyms;
pub mod members;
pub mod memberships;
pub mod payments;
pub mod plans;
pub mod sessions;
pub mod users;

use gym_core::errors::{GymError, GymResult};
use sqlx::postgres::PgQueryResult;

/// Fails with `NotFound` when an update touched no row.
pub(crate) fn expect_one(result: PgQueryResult, what: &str, id: uuid::Uuid) -> GymResult<()> {
    if result.rows_affected() == 0 {
        return Err(GymError::NotFound(format!("{what} with ID {id} not found")));
    }
    Ok(())
}
