//! Domain model for a family (a household sharing baby data).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Baby, FamilyMember};

/// A sharing group. `owner_id` is kept on the family itself so ownership
/// does not depend on the owner's membership row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Family {
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

/// A family as seen by one of its members
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyDetails {
    pub family: Family,
    pub members: Vec<FamilyMember>,
    pub babies: Vec<Baby>,
}
