//! # Storage Traits
//!
//! Interfaces the domain services program against. Each is implemented by the
//! matching SQLite repository in [`super::repositories`].

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::models::{
    Baby, Family, FamilyInvitation, FamilyMember, FeedEntry, SleepSession,
};

#[async_trait]
pub trait FamilyStorage: Send + Sync {
    /// Store a new family together with its owner's membership, atomically
    async fn create_family_with_owner(&self, family: &Family, owner: &FamilyMember) -> Result<()>;

    async fn get_family(&self, family_id: &str) -> Result<Option<Family>>;

    /// Families the user owns or holds an active membership in, newest first
    async fn list_families_for_user(&self, user_id: &str) -> Result<Vec<Family>>;

    async fn update_family(&self, family: &Family) -> Result<()>;

    /// Delete a family and everything under it.
    /// Returns true if the family was found and deleted, false otherwise
    async fn delete_family(&self, family_id: &str) -> Result<bool>;
}

#[async_trait]
pub trait MemberStorage: Send + Sync {
    async fn get_member(&self, member_id: &str) -> Result<Option<FamilyMember>>;

    /// The user's row in the family regardless of status
    async fn get_member_by_user(&self, family_id: &str, user_id: &str) -> Result<Option<FamilyMember>>;

    async fn is_active_member(&self, family_id: &str, user_id: &str) -> Result<bool>;

    /// Active members ordered by role (owner, parent, caregiver) then display name
    async fn list_active_members(&self, family_id: &str) -> Result<Vec<FamilyMember>>;

    async fn find_active_member_by_email(&self, family_id: &str, email: &str) -> Result<Option<FamilyMember>>;

    async fn list_active_family_ids(&self, user_id: &str) -> Result<Vec<String>>;

    async fn update_member(&self, member: &FamilyMember) -> Result<()>;
}

#[async_trait]
pub trait BabyStorage: Send + Sync {
    async fn store_baby(&self, baby: &Baby) -> Result<()>;

    async fn get_baby(&self, baby_id: &str) -> Result<Option<Baby>>;

    /// Babies of a family in the order they were added
    async fn list_babies(&self, family_id: &str) -> Result<Vec<Baby>>;

    async fn update_baby(&self, baby: &Baby) -> Result<()>;

    /// Returns true if the baby was found and deleted, false otherwise
    async fn delete_baby(&self, baby_id: &str) -> Result<bool>;
}

#[async_trait]
pub trait InvitationStorage: Send + Sync {
    async fn store_invitation(&self, invitation: &FamilyInvitation) -> Result<()>;

    async fn get_invitation(&self, invitation_id: &str) -> Result<Option<FamilyInvitation>>;

    async fn get_invitation_by_token(&self, token: &str) -> Result<Option<FamilyInvitation>>;

    /// The pending invitation for (family, email), expired or not
    async fn find_pending_invitation(&self, family_id: &str, email: &str) -> Result<Option<FamilyInvitation>>;

    /// Pending invitations addressed to `email` that expire after `now`
    async fn list_pending_for_email(&self, email: &str, now: DateTime<Utc>) -> Result<Vec<FamilyInvitation>>;

    /// Pending invitations of a family that expire after `now`
    async fn list_pending_for_family(&self, family_id: &str, now: DateTime<Utc>) -> Result<Vec<FamilyInvitation>>;

    async fn update_invitation(&self, invitation: &FamilyInvitation) -> Result<()>;

    /// Flip a pending invitation to accepted and create or reactivate the
    /// caller's membership in one transaction. Returns the stored membership.
    async fn accept_invitation(
        &self,
        invitation: &FamilyInvitation,
        member: &FamilyMember,
    ) -> Result<FamilyMember>;
}

/// Shared read surface of the two entry stores.
///
/// Unbounded lists are newest first; date-bounded lists are chronological.
#[async_trait]
pub trait FeedEntryStorage: Send + Sync {
    async fn store_feed_entry(&self, entry: &FeedEntry) -> Result<()>;

    async fn get_feed_entry(&self, entry_id: &str) -> Result<Option<FeedEntry>>;

    async fn list_feed_entries_for_baby(&self, baby_id: &str) -> Result<Vec<FeedEntry>>;

    /// Inclusive on both bounds
    async fn list_feed_entries_in_range(
        &self,
        baby_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<FeedEntry>>;

    async fn list_feed_entries_for_family(&self, family_id: &str) -> Result<Vec<FeedEntry>>;

    /// Entries of every baby in every family the user is an active member of
    async fn list_feed_entries_for_user(&self, user_id: &str) -> Result<Vec<FeedEntry>>;

    async fn update_feed_entry(&self, entry: &FeedEntry) -> Result<()>;

    /// Returns true if the entry was found and deleted, false otherwise
    async fn delete_feed_entry(&self, entry_id: &str) -> Result<bool>;
}

#[async_trait]
pub trait SleepSessionStorage: Send + Sync {
    /// Fails with `StorageError::ActiveSleepExists` if the baby is already sleeping
    async fn store_sleep_session(&self, session: &SleepSession) -> Result<()>;

    async fn get_sleep_session(&self, session_id: &str) -> Result<Option<SleepSession>>;

    async fn get_active_session(&self, baby_id: &str) -> Result<Option<SleepSession>>;

    async fn list_sleep_sessions_for_baby(&self, baby_id: &str) -> Result<Vec<SleepSession>>;

    /// Inclusive on both bounds
    async fn list_sleep_sessions_in_range(
        &self,
        baby_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<SleepSession>>;

    async fn list_sleep_sessions_for_family(&self, family_id: &str) -> Result<Vec<SleepSession>>;

    async fn list_sleep_sessions_for_user(&self, user_id: &str) -> Result<Vec<SleepSession>>;

    /// Fails with `StorageError::ActiveSleepExists` if the baby is already sleeping
    async fn update_sleep_session(&self, session: &SleepSession) -> Result<()>;

    /// Returns true if the session was found and deleted, false otherwise
    async fn delete_sleep_session(&self, session_id: &str) -> Result<bool>;
}

/// The family structure created for one user's pre-family entries
#[derive(Debug, Clone)]
pub struct LegacyAdoption {
    pub family: Family,
    pub owner: FamilyMember,
    pub baby: Baby,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyAdoptionCounts {
    pub feed_entries: u64,
    pub sleep_sessions: u64,
}

#[async_trait]
pub trait LegacyMigrationStorage: Send + Sync {
    /// Distinct creators of entries that belong to no baby
    async fn list_legacy_creators(&self) -> Result<Vec<String>>;

    /// Create every adoption's family, owner and baby and attach the owner's
    /// legacy entries to the baby. All adoptions commit together or not at all.
    async fn adopt_legacy_entries(&self, adoptions: &[LegacyAdoption]) -> Result<LegacyAdoptionCounts>;
}
