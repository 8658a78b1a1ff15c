//! Boundary timestamp parsing.
//!
//! Exactly one textual format is accepted: RFC 3339 with an explicit offset,
//! e.g. `2025-12-23T05:58:00Z` or `2025-12-23T08:58:00+03:00`. Anything else
//! is rejected instead of guessed at.

use chrono::{DateTime, Utc};

use crate::errors::{GymError, GymResult};

pub const CANONICAL_FORMAT: &str = "RFC 3339 (e.g. 2025-12-23T05:58:00Z)";

pub fn parse_timestamp(field: &str, raw: &str) -> GymResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            GymError::Validation(format!(
                "{field} must be a timestamp in {CANONICAL_FORMAT}, got {raw:?}"
            ))
        })
}

/// Fails unless `start < end`.
pub fn ensure_window(start: DateTime<Utc>, end: DateTime<Utc>) -> GymResult<()> {
    if start < end {
        Ok(())
    } else {
        Err(GymError::Validation(format!(
            "end ({end}) must be after start ({start})"
        )))
    }
}
