use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind of record a failed reference pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Trainer,
    Member,
    Plan,
    Membership,
    Gym,
    Class,
    Session,
    Booking,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::Trainer => "trainer",
            EntityKind::Member => "member",
            EntityKind::Plan => "plan",
            EntityKind::Membership => "membership",
            EntityKind::Gym => "gym",
            EntityKind::Class => "class",
            EntityKind::Session => "class session",
            EntityKind::Booking => "booking",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum GymError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("A user with email {0} already exists")]
    DuplicateIdentity(String),

    #[error("Referenced {0} does not exist")]
    InvalidReference(EntityKind),

    #[error("Member already holds a booking for this session")]
    AlreadyBooked,

    #[error("Member already checked in for this session")]
    AlreadyCheckedIn,

    #[error("Class session is full")]
    SessionFull,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The deadline passed before the operation began committing; nothing
    /// was written.
    #[error("Operation timed out")]
    Timeout,

    #[error("Internal error")]
    Internal(#[source] eyre::Report),

    /// Storage failure. The report is kept for logs; the message shown to
    /// callers never includes it.
    #[error("Persistence failure")]
    Persistence(#[source] eyre::Report),
}

impl GymError {
    /// Wraps an unexpected storage error, logging its full detail.
    pub fn persistence(report: eyre::Report) -> Self {
        tracing::error!(error = ?report, "persistence failure");
        GymError::Persistence(report)
    }

    /// True for rejections caused by domain rules rather than bad input or
    /// infrastructure.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            GymError::DuplicateIdentity(_)
                | GymError::AlreadyBooked
                | GymError::AlreadyCheckedIn
                | GymError::SessionFull
                | GymError::InvalidState(_)
        )
    }
}

pub type GymResult<T> = Result<T, GymError>;
