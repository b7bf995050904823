//! # Storage Module
//!
//! SQLite persistence for families, memberships, babies, invitations and the
//! two entry stores.
//!
//! Repositories return `anyhow::Result`. Failures the domain needs to tell
//! apart travel inside the `anyhow::Error` as a [`StorageError`].
//!
//! Column conventions:
//!
//! - Calendar dates are `YYYY-MM-DD` text and wall-clock times `HH:MM:SS`
//!   text, kept in separate columns.
//! - Timestamps are fixed-width RFC 3339 UTC text so they sort as strings.
//! - Enumerations use their upper-case storage names.

pub mod codec;
pub mod connection;
pub mod repositories;
pub mod traits;

use thiserror::Error;

pub use connection::DbConnection;
pub use repositories::{
    BabyRepository, FamilyRepository, FeedEntryRepository, InvitationRepository,
    LegacyMigrationRepository, MemberRepository, SleepSessionRepository,
};
pub use traits::{
    BabyStorage, FamilyStorage, FeedEntryStorage, InvitationStorage, LegacyMigrationStorage,
    MemberStorage, SleepSessionStorage,
};

#[derive(Debug, Error)]
pub enum StorageError {
    /// The partial unique index on active sleep sessions rejected a write
    #[error("Baby {baby_id} already has an active sleep session")]
    ActiveSleepExists { baby_id: String },

    /// A concurrent request consumed the invitation first
    #[error("Invitation {invitation_id} is no longer pending")]
    InvitationNotPending { invitation_id: String },
}
