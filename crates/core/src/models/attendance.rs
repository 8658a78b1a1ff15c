use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::GymError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckinMethod {
    Qr,
    Staff,
}

impl CheckinMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckinMethod::Qr => "qr",
            CheckinMethod::Staff => "staff",
        }
    }
}

impl fmt::Display for CheckinMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckinMethod {
    type Err = GymError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "qr" => Ok(CheckinMethod::Qr),
            "staff" => Ok(CheckinMethod::Staff),
            other => Err(GymError::Validation(format!(
                "Unknown check-in method {other:?}, expected qr or staff"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: Uuid,
    pub session_id: Uuid,
    pub member_id: Uuid,
    pub checkin_method: CheckinMethod,
    pub checked_in_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub member_id: Uuid,
    pub session_id: Uuid,
    pub method: String,
}
