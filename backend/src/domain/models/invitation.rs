//! Domain model for a pending offer of family membership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::member::FamilyMemberRole;

text_enum! {
    /// `Pending` is the only non-terminal state.
    pub enum InvitationStatus {
        Pending => "PENDING",
        Accepted => "ACCEPTED",
        Declined => "DECLINED",
        Expired => "EXPIRED",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyInvitation {
    pub id: String,
    pub family_id: String,
    /// Lower-cased invitee email
    pub email: String,
    pub invited_by: String,
    pub role: FamilyMemberRole,
    pub status: InvitationStatus,
    pub message: Option<String>,
    /// Globally unique, never changes after issue
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl FamilyInvitation {
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn generate_token() -> String {
        Uuid::new_v4().simple().to_string()
    }

    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    /// Pending and not yet past its expiry
    pub fn is_acceptable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_pending() && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invitation(status: InvitationStatus, expires_at: DateTime<Utc>) -> FamilyInvitation {
        FamilyInvitation {
            id: FamilyInvitation::generate_id(),
            family_id: "family-1".to_string(),
            email: "b@x.com".to_string(),
            invited_by: "user-a".to_string(),
            role: FamilyMemberRole::Parent,
            status,
            message: None,
            token: FamilyInvitation::generate_token(),
            expires_at,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_acceptable_only_while_pending_and_unexpired() {
        let now = Utc::now();

        assert!(invitation(InvitationStatus::Pending, now + Duration::days(1)).is_acceptable_at(now));
        assert!(!invitation(InvitationStatus::Pending, now - Duration::seconds(1)).is_acceptable_at(now));
        assert!(!invitation(InvitationStatus::Pending, now).is_acceptable_at(now));
        assert!(!invitation(InvitationStatus::Declined, now + Duration::days(1)).is_acceptable_at(now));
    }

    #[test]
    fn test_generated_tokens_are_distinct() {
        assert_ne!(FamilyInvitation::generate_token(), FamilyInvitation::generate_token());
    }
}
