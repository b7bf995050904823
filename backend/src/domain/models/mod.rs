//! Domain models for families, babies, invitations and the two entry stores.
//!
//! Enumerations carry a stable upper-case storage representation so the
//! repositories can persist them as text columns.

/// Declares an enum with a fixed text representation and a `FromStr` impl
/// that rejects anything else.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err(anyhow::anyhow!(
                        "Unknown {} value: {}",
                        stringify!($name),
                        other
                    )),
                }
            }
        }
    };
}

pub mod baby;
pub mod family;
pub mod feed_entry;
pub mod invitation;
pub mod member;
pub mod sleep_session;

pub use baby::{Baby, Gender};
pub use family::{Family, FamilyDetails};
pub use feed_entry::{FeedEntry, FeedType, StartingBreast};
pub use invitation::{FamilyInvitation, InvitationStatus};
pub use member::{FamilyMember, FamilyMemberRole, MembershipStatus};
pub use sleep_session::SleepSession;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_text_enums_round_trip_through_storage_text() {
        assert_eq!(FamilyMemberRole::from_str("PARENT").unwrap(), FamilyMemberRole::Parent);
        assert_eq!(MembershipStatus::Inactive.as_str(), "INACTIVE");
        assert_eq!(InvitationStatus::from_str("DECLINED").unwrap(), InvitationStatus::Declined);
        assert_eq!(StartingBreast::Right.to_string(), "RIGHT");
    }

    #[test]
    fn test_text_enum_rejects_unknown_value() {
        let err = FeedType::from_str("SPOON").unwrap_err();
        assert!(err.to_string().contains("FeedType"));
        assert!(Gender::from_str("male").is_err());
    }
}
