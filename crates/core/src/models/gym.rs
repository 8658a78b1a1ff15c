use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gym {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub timezone: Option<String>,
    pub opening_hours: Value,
    pub settings: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Gym {
    pub fn apply(&mut self, update: UpdateGymRequest, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(address) = update.address {
            self.address = Some(address);
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(timezone) = update.timezone {
            self.timezone = Some(timezone);
        }
        if let Some(opening_hours) = update.opening_hours {
            self.opening_hours = opening_hours;
        }
        if let Some(settings) = update.settings {
            self.settings = settings;
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGymRequest {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub timezone: Option<String>,
    #[serde(default)]
    pub opening_hours: Value,
    #[serde(default)]
    pub settings: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGymRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub timezone: Option<String>,
    pub opening_hours: Option<Value>,
    pub settings: Option<Value>,
}
