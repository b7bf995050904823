//! Domain-level command and query types.
//!
//! Services consume these instead of the public DTOs in `shared`; the io
//! mappers translate between the two. Dates and times stay as the raw strings
//! the client sent so that format validation happens in one place, inside the
//! services.

pub mod families {
    /// Input for creating a family; the caller becomes its owner.
    #[derive(Debug, Clone)]
    pub struct CreateFamilyCommand {
        pub name: String,
        pub owner_display_name: Option<String>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateFamilyCommand {
        pub name: Option<String>,
    }
}

pub mod babies {
    use crate::domain::models::Gender;

    #[derive(Debug, Clone)]
    pub struct CreateBabyCommand {
        pub family_id: String,
        pub name: String,
        pub birth_date: Option<String>,
        pub gender: Option<Gender>,
        pub notes: Option<String>,
    }

    /// Partial update; `None` leaves the field untouched.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateBabyCommand {
        pub name: Option<String>,
        pub birth_date: Option<String>,
        pub gender: Option<Gender>,
        pub notes: Option<String>,
    }
}

pub mod invitations {
    use crate::domain::models::FamilyMemberRole;

    #[derive(Debug, Clone)]
    pub struct InviteMemberCommand {
        pub family_id: String,
        pub email: String,
        /// Defaults to `Parent`
        pub role: Option<FamilyMemberRole>,
        pub message: Option<String>,
    }
}

pub mod feed_entries {
    use crate::domain::models::{FeedType, StartingBreast};

    #[derive(Debug, Clone)]
    pub struct CreateFeedEntryCommand {
        pub baby_id: String,
        pub date: String,
        pub time: String,
        pub feed_type: FeedType,
        pub starting_breast: Option<StartingBreast>,
        pub temperature: Option<f64>,
        pub did_pee: bool,
        pub did_poo: bool,
        pub did_throw_up: bool,
        pub comment: Option<String>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateFeedEntryCommand {
        /// Moves the entry to another baby
        pub baby_id: Option<String>,
        pub date: Option<String>,
        pub time: Option<String>,
        pub feed_type: Option<FeedType>,
        pub starting_breast: Option<StartingBreast>,
        pub temperature: Option<f64>,
        pub did_pee: Option<bool>,
        pub did_poo: Option<bool>,
        pub did_throw_up: Option<bool>,
        pub comment: Option<String>,
    }
}

pub mod sleep_sessions {
    #[derive(Debug, Clone)]
    pub struct CreateSleepSessionCommand {
        pub baby_id: String,
        pub date: String,
        pub start_time: String,
        pub end_time: Option<String>,
        pub duration_minutes: Option<i32>,
        pub is_active: bool,
        pub comment: Option<String>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateSleepSessionCommand {
        pub baby_id: Option<String>,
        pub date: Option<String>,
        pub start_time: Option<String>,
        pub end_time: Option<String>,
        pub duration_minutes: Option<i32>,
        pub is_active: Option<bool>,
        pub comment: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct StopSleepCommand {
        pub end_time: String,
        pub duration_minutes: i32,
    }
}

pub mod entries {
    use chrono::NaiveDate;

    use crate::domain::error::{DomainError, DomainResult};
    use crate::domain::validation::parse_date;

    /// Read filters shared by the feed and sleep stores
    #[derive(Debug, Clone, Default)]
    pub struct EntryListQuery {
        pub baby_id: Option<String>,
        pub family_id: Option<String>,
        /// Single day; takes precedence over a range
        pub date: Option<String>,
        pub start_date: Option<String>,
        pub end_date: Option<String>,
    }

    /// What an [`EntryListQuery`] resolves to
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum EntryScope {
        Baby(String),
        /// Inclusive on both bounds
        BabyRange {
            baby_id: String,
            start_date: NaiveDate,
            end_date: NaiveDate,
        },
        Family(String),
        /// Every family the caller actively belongs to
        Caller,
    }

    impl EntryListQuery {
        /// Date filters apply to a single baby only. Scope is chosen in the
        /// order baby, family, caller.
        pub fn scope(&self) -> DomainResult<EntryScope> {
            let has_dates = self.date.is_some() || self.start_date.is_some() || self.end_date.is_some();

            let baby_id = match &self.baby_id {
                Some(baby_id) => baby_id.clone(),
                None if has_dates => {
                    return Err(DomainError::validation("Date filters require a babyId"));
                }
                None => {
                    return Ok(match &self.family_id {
                        Some(family_id) => EntryScope::Family(family_id.clone()),
                        None => EntryScope::Caller,
                    });
                }
            };

            if let Some(date) = &self.date {
                let day = parse_date("Date", date)?;
                return Ok(EntryScope::BabyRange {
                    baby_id,
                    start_date: day,
                    end_date: day,
                });
            }

            match (&self.start_date, &self.end_date) {
                (None, None) => Ok(EntryScope::Baby(baby_id)),
                (Some(start), Some(end)) => {
                    let start_date = parse_date("Start date", start)?;
                    let end_date = parse_date("End date", end)?;
                    if start_date > end_date {
                        return Err(DomainError::validation("Start date must not be after end date"));
                    }
                    Ok(EntryScope::BabyRange {
                        baby_id,
                        start_date,
                        end_date,
                    })
                }
                _ => Err(DomainError::validation("A date range needs both start and end")),
            }
        }
    }

}
