//! Conversions between domain models/commands and the wire DTOs in `shared`.
//!
//! Used by both the REST handlers and the GraphQL resolvers.

pub mod baby_mapper;
pub mod family_mapper;
pub mod feed_entry_mapper;
pub mod invitation_mapper;
pub mod member_mapper;
pub mod sleep_session_mapper;

use chrono::{DateTime, SecondsFormat, Utc};

pub use baby_mapper::BabyMapper;
pub use family_mapper::FamilyMapper;
pub use feed_entry_mapper::FeedEntryMapper;
pub use invitation_mapper::InvitationMapper;
pub use member_mapper::MemberMapper;
pub use sleep_session_mapper::SleepSessionMapper;

/// RFC 3339 UTC with millisecond precision
pub(crate) fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn format_optional_timestamp(timestamp: &Option<DateTime<Utc>>) -> Option<String> {
    timestamp.as_ref().map(format_timestamp)
}
