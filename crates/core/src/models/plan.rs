use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{GymError, GymResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Weekly => "weekly",
            BillingCycle::Monthly => "monthly",
            BillingCycle::Quarterly => "quarterly",
            BillingCycle::Annual => "annual",
        }
    }

    /// Moves `from` forward by one calendar period.
    pub fn advance(&self, from: DateTime<Utc>) -> GymResult<DateTime<Utc>> {
        let next = match self {
            BillingCycle::Weekly => from.checked_add_days(Days::new(7)),
            BillingCycle::Monthly => from.checked_add_months(Months::new(1)),
            BillingCycle::Quarterly => from.checked_add_months(Months::new(3)),
            BillingCycle::Annual => from.checked_add_months(Months::new(12)),
        };
        next.ok_or_else(|| GymError::Validation(format!("cannot advance {from} by one {self} cycle")))
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingCycle {
    type Err = GymError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(BillingCycle::Weekly),
            "monthly" => Ok(BillingCycle::Monthly),
            "quarterly" => Ok(BillingCycle::Quarterly),
            "annual" | "yearly" => Ok(BillingCycle::Annual),
            other => Err(GymError::Validation(format!("Unknown billing cycle: {other}"))),
        }
    }
}

/// Purchasable subscription template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Minor currency units.
    pub price_cents: i64,
    pub billing_cycle: BillingCycle,
    /// `None` means unlimited sessions.
    pub session_quota: Option<i32>,
    pub access: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    pub fn validate(&self) -> GymResult<()> {
        if self.title.trim().is_empty() {
            return Err(GymError::Validation("Plan title cannot be empty".to_string()));
        }
        if self.price_cents < 0 {
            return Err(GymError::Validation("Plan price cannot be negative".to_string()));
        }
        if matches!(self.session_quota, Some(quota) if quota <= 0) {
            return Err(GymError::Validation(
                "Session quota must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn apply(&mut self, update: UpdatePlanRequest, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(price_cents) = update.price_cents {
            self.price_cents = price_cents;
        }
        if let Some(billing_cycle) = update.billing_cycle {
            self.billing_cycle = billing_cycle;
        }
        if let Some(quota) = update.session_quota {
            self.session_quota = Some(quota);
        }
        if let Some(access) = update.access {
            self.access = access;
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlanRequest {
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub billing_cycle: BillingCycle,
    pub session_quota: Option<i32>,
    pub access: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlanRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub billing_cycle: Option<BillingCycle>,
    pub session_quota: Option<i32>,
    pub access: Option<String>,
}
