//! Feeding and elimination entries, scoped to a baby.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::authorization::AccessPolicy;
use crate::domain::commands::entries::{EntryListQuery, EntryScope};
use crate::domain::commands::feed_entries::{CreateFeedEntryCommand, UpdateFeedEntryCommand};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::identity::CallerIdentity;
use crate::domain::models::FeedEntry;
use crate::domain::validation::{
    optional_text, parse_date, parse_time, validate_temperature, MAX_TEXT_LENGTH,
};
use crate::storage::traits::FeedEntryStorage;
use crate::storage::{DbConnection, FeedEntryRepository};

/// Service for the feeding entry store
#[derive(Clone)]
pub struct FeedEntryService {
    access: AccessPolicy,
    feed_entry_repository: FeedEntryRepository,
}

impl FeedEntryService {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self {
            access: AccessPolicy::new(db.clone()),
            feed_entry_repository: FeedEntryRepository::new((*db).clone()),
        }
    }

    pub async fn create_feed_entry(
        &self,
        caller: &CallerIdentity,
        command: CreateFeedEntryCommand,
    ) -> DomainResult<FeedEntry> {
        info!(
            "Creating feed entry: baby={}, date={}, time={}",
            command.baby_id, command.date, command.time
        );

        self.access.require_baby_access(caller, &command.baby_id).await?;

        let mut entry = FeedEntry {
            id: FeedEntry::generate_id(),
            baby_id: Some(command.baby_id),
            user_id: caller.user_id.clone(),
            date: parse_date("Date", &command.date)?,
            time: parse_time("Time", &command.time)?,
            feed_type: command.feed_type,
            starting_breast: command.starting_breast,
            temperature: validate_temperature(command.temperature)?,
            did_pee: command.did_pee,
            did_poo: command.did_poo,
            did_throw_up: command.did_throw_up,
            comment: optional_text("Comment", command.comment.as_deref(), MAX_TEXT_LENGTH)?,
            created_at: Utc::now(),
            updated_at: None,
        };
        entry.clear_side_unless_breast();

        self.feed_entry_repository.store_feed_entry(&entry).await?;

        info!("Created feed entry: {}", entry.id);
        Ok(entry)
    }

    pub async fn get_feed_entry(&self, caller: &CallerIdentity, entry_id: &str) -> DomainResult<FeedEntry> {
        info!("Getting feed entry: {}", entry_id);

        let entry = self.load(entry_id).await?;
        self.access
            .require_entry_visible(caller, entry.baby_id.as_deref(), &entry.user_id)
            .await?;

        Ok(entry)
    }

    /// Newest first
    pub async fn list_for_baby(&self, caller: &CallerIdentity, baby_id: &str) -> DomainResult<Vec<FeedEntry>> {
        self.access.require_baby_access(caller, baby_id).await?;
        Ok(self.feed_entry_repository.list_feed_entries_for_baby(baby_id).await?)
    }

    /// Chronological within the day
    pub async fn list_for_baby_on_date(
        &self,
        caller: &CallerIdentity,
        baby_id: &str,
        date: NaiveDate,
    ) -> DomainResult<Vec<FeedEntry>> {
        self.list_for_baby_in_range(caller, baby_id, date, date).await
    }

    /// Chronological, inclusive on both bounds
    pub async fn list_for_baby_in_range(
        &self,
        caller: &CallerIdentity,
        baby_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> DomainResult<Vec<FeedEntry>> {
        self.access.require_baby_access(caller, baby_id).await?;
        Ok(self
            .feed_entry_repository
            .list_feed_entries_in_range(baby_id, start_date, end_date)
            .await?)
    }

    pub async fn list_for_family(&self, caller: &CallerIdentity, family_id: &str) -> DomainResult<Vec<FeedEntry>> {
        self.access.require_family_member(caller, family_id).await?;
        Ok(self.feed_entry_repository.list_feed_entries_for_family(family_id).await?)
    }

    /// Entries of every family the caller belongs to; never an authorization failure
    pub async fn list_for_caller(&self, caller: &CallerIdentity) -> DomainResult<Vec<FeedEntry>> {
        Ok(self.feed_entry_repository.list_feed_entries_for_user(&caller.user_id).await?)
    }

    pub async fn list_feed_entries(
        &self,
        caller: &CallerIdentity,
        query: EntryListQuery,
    ) -> DomainResult<Vec<FeedEntry>> {
        info!("Listing feed entries: {:?}", query);

        let entries = match query.scope()? {
            EntryScope::Baby(baby_id) => self.list_for_baby(caller, &baby_id).await?,
            EntryScope::BabyRange {
                baby_id,
                start_date,
                end_date,
            } => {
                self.list_for_baby_in_range(caller, &baby_id, start_date, end_date)
                    .await?
            }
            EntryScope::Family(family_id) => self.list_for_family(caller, &family_id).await?,
            EntryScope::Caller => self.list_for_caller(caller).await?,
        };

        info!("Found {} feed entries", entries.len());
        Ok(entries)
    }

    /// Creator-or-owner. Moving the entry needs access to both babies.
    pub async fn update_feed_entry(
        &self,
        caller: &CallerIdentity,
        entry_id: &str,
        command: UpdateFeedEntryCommand,
    ) -> DomainResult<FeedEntry> {
        info!("Updating feed entry: {}", entry_id);

        let mut entry = self.load(entry_id).await?;
        self.access
            .require_entry_modifiable(caller, entry.baby_id.as_deref(), &entry.user_id)
            .await?;

        if let Some(baby_id) = command.baby_id {
            if entry.baby_id.as_deref() != Some(baby_id.as_str()) {
                self.access.require_baby_access(caller, &baby_id).await?;
                entry.baby_id = Some(baby_id);
            }
        }
        if let Some(date) = command.date {
            entry.date = parse_date("Date", &date)?;
        }
        if let Some(time) = command.time {
            entry.time = parse_time("Time", &time)?;
        }
        if let Some(feed_type) = command.feed_type {
            entry.feed_type = feed_type;
        }
        if let Some(starting_breast) = command.starting_breast {
            entry.starting_breast = Some(starting_breast);
        }
        if let Some(temperature) = command.temperature {
            entry.temperature = validate_temperature(Some(temperature))?;
        }
        if let Some(did_pee) = command.did_pee {
            entry.did_pee = did_pee;
        }
        if let Some(did_poo) = command.did_poo {
            entry.did_poo = did_poo;
        }
        if let Some(did_throw_up) = command.did_throw_up {
            entry.did_throw_up = did_throw_up;
        }
        if let Some(comment) = command.comment {
            entry.comment = optional_text("Comment", Some(&comment), MAX_TEXT_LENGTH)?;
        }
        entry.clear_side_unless_breast();
        entry.updated_at = Some(Utc::now());

        self.feed_entry_repository.update_feed_entry(&entry).await?;

        info!("Updated feed entry: {}", entry.id);
        Ok(entry)
    }

    /// Returns false when the entry does not exist
    pub async fn delete_feed_entry(&self, caller: &CallerIdentity, entry_id: &str) -> DomainResult<bool> {
        info!("Deleting feed entry: {}", entry_id);

        let entry = match self.feed_entry_repository.get_feed_entry(entry_id).await? {
            Some(entry) => entry,
            None => {
                warn!("Feed entry not found: {}", entry_id);
                return Ok(false);
            }
        };
        self.access
            .require_entry_modifiable(caller, entry.baby_id.as_deref(), &entry.user_id)
            .await?;

        Ok(self.feed_entry_repository.delete_feed_entry(entry_id).await?)
    }

    async fn load(&self, entry_id: &str) -> DomainResult<FeedEntry> {
        self.feed_entry_repository
            .get_feed_entry(entry_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Feed entry not found: {}", entry_id)))
    }
}
