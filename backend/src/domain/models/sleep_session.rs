//! Domain model for a sleep interval.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSession {
    pub id: String,
    pub baby_id: Option<String>,
    pub user_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    /// Minutes, as computed by the client (including any overnight wrap)
    pub duration_minutes: Option<i32>,
    /// True while the baby is still sleeping. At most one per baby.
    pub is_active: bool,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SleepSession {
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Closes the session with the caller-supplied end time and duration
    pub fn stop(&mut self, end_time: NaiveTime, duration_minutes: i32, now: DateTime<Utc>) {
        self.end_time = Some(end_time);
        self.duration_minutes = Some(duration_minutes);
        self.is_active = false;
        self.updated_at = Some(now);
    }
}
