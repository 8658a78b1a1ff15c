use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Gym-side profile of a user with the member role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub emergency_contact: EmergencyContact,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn apply(&mut self, update: UpdateMemberRequest, now: DateTime<Utc>) {
        if let Some(first_name) = update.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name;
        }
        if let Some(date_of_birth) = update.date_of_birth {
            self.date_of_birth = Some(date_of_birth);
        }
        if let Some(gender) = update.gender {
            self.gender = Some(gender);
        }
        if let Some(contact) = update.emergency_contact {
            self.emergency_contact = contact;
        }
        if let Some(notes) = update.notes {
            self.notes = Some(notes);
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMemberRequest {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMemberRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub notes: Option<String>,
}
