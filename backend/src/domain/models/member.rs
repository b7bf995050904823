//! Domain model for a user's membership in a family.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

text_enum! {
    /// Role held inside a family. `Owner` is reserved for the family creator.
    pub enum FamilyMemberRole {
        Owner => "OWNER",
        Parent => "PARENT",
        Caregiver => "CAREGIVER",
    }
}

impl FamilyMemberRole {
    /// Owners and parents may invite new members
    pub fn can_invite(&self) -> bool {
        matches!(self, Self::Owner | Self::Parent)
    }
}

text_enum! {
    pub enum MembershipStatus {
        Pending => "PENDING",
        Active => "ACTIVE",
        Inactive => "INACTIVE",
    }
}

/// Membership row. Unique per (family, user); removal flips `status` to
/// `Inactive` and the row stays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: String,
    pub family_id: String,
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub role: FamilyMemberRole,
    pub status: MembershipStatus,
    pub invited_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl FamilyMember {
    /// Placeholder display name given to members joining through an invitation
    pub const INVITED_DISPLAY_NAME: &'static str = "New Member";

    /// Display name used for the owner when none is supplied
    pub const OWNER_DISPLAY_NAME: &'static str = "You";

    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }
}
