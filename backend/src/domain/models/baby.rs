//! Domain model for a tracked child.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

text_enum! {
    pub enum Gender {
        Unknown => "UNKNOWN",
        Male => "MALE",
        Female => "FEMALE",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baby {
    pub id: String,
    pub family_id: String,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: Gender,
    pub notes: Option<String>,
    /// User ID of who created this baby profile
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Baby {
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}
