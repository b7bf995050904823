//! Domain model for a feeding / elimination observation.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

text_enum! {
    pub enum FeedType {
        Bottle => "BOTTLE",
        Breast => "BREAST",
    }
}

text_enum! {
    pub enum StartingBreast {
        Left => "LEFT",
        Right => "RIGHT",
    }
}

/// Date and time are independent calendar/wall-clock values, not a combined
/// timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: String,
    /// `None` only for entries recorded before families existed
    pub baby_id: Option<String>,
    /// User ID of the creator
    pub user_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub feed_type: FeedType,
    pub starting_breast: Option<StartingBreast>,
    pub temperature: Option<f64>,
    pub did_pee: bool,
    pub did_poo: bool,
    pub did_throw_up: bool,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl FeedEntry {
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Only breast feeds record a starting side
    pub fn clear_side_unless_breast(&mut self) {
        if self.feed_type != FeedType::Breast {
            self.starting_breast = None;
        }
    }
}
