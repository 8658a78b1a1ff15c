use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::{GymError, GymResult};
use crate::time::parse_timestamp;

/// Seats given to a session when neither the caller nor the class says otherwise.
pub const DEFAULT_SESSION_CAPACITY: i32 = 20;

/// Recurring activity template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub trainer_id: Uuid,
    pub capacity: i32,
    pub recurring_rule: Option<Value>,
    pub duration_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Class {
    /// Capacity a new session inherits.
    pub fn session_capacity(&self) -> i32 {
        if self.capacity > 0 {
            self.capacity
        } else {
            DEFAULT_SESSION_CAPACITY
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClassRequest {
    pub gym_id: Uuid,
    pub trainer_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub capacity: i32,
    pub duration_minutes: i32,
    pub recurring_rule: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Scheduled,
    Cancelled,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = GymError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(SessionStatus::Scheduled),
            "cancelled" | "canceled" => Ok(SessionStatus::Cancelled),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(GymError::Validation(format!("Unknown session status: {other}"))),
        }
    }
}

/// One concrete, time-boxed occurrence of a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSession {
    pub id: Uuid,
    pub class_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: i32,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClassSession {
    pub fn close(&mut self, target: SessionStatus, now: DateTime<Utc>) -> GymResult<()> {
        if self.status != SessionStatus::Scheduled || target == SessionStatus::Scheduled {
            return Err(GymError::InvalidState(format!(
                "session {} cannot move from {} to {}",
                self.id, self.status, target
            )));
        }
        self.status = target;
        self.updated_at = now;
        Ok(())
    }
}

/// Wire form: timestamps arrive as text and are parsed strictly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub class_id: Uuid,
    pub starts_at: String,
    pub ends_at: String,
    pub capacity: Option<i32>,
}

impl CreateSessionRequest {
    pub fn parse(&self) -> GymResult<NewSession> {
        Ok(NewSession {
            class_id: self.class_id,
            starts_at: parse_timestamp("starts_at", &self.starts_at)?,
            ends_at: parse_timestamp("ends_at", &self.ends_at)?,
            capacity: self.capacity,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub class_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: Option<i32>,
}
