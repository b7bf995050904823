//! Wire types shared by the REST and GraphQL surfaces of the baby tracker.
//!
//! Dates travel as `YYYY-MM-DD` strings, times of day as `HH:mm[:ss]`
//! strings and timestamps as RFC 3339. The backend validates and parses them
//! before anything reaches storage.
//!
//! With the `graphql` feature enabled the same structs double as
//! `async-graphql` output objects, input objects and enums.

use serde::{Deserialize, Serialize};

/// Role a member holds inside a family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::Enum))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FamilyMemberRole {
    Owner,
    Parent,
    Caregiver,
}

/// Lifecycle state of a membership row. Removal is `Inactive`, never a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::Enum))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipStatus {
    Pending,
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::Enum))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::Enum))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Unknown,
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::Enum))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedType {
    Bottle,
    Breast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::Enum))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StartingBreast {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: String,
    pub name: String,
    /// User ID of the family owner
    pub owner_id: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// A family together with its active members and babies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
#[serde(rename_all = "camelCase")]
pub struct FamilyDetails {
    pub family: Family,
    pub members: Vec<FamilyMember>,
    pub babies: Vec<Baby>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: String,
    pub family_id: String,
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub role: FamilyMemberRole,
    pub status: MembershipStatus,
    /// User ID of who invited this member (absent for the owner)
    pub invited_by: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
#[serde(rename_all = "camelCase")]
pub struct Baby {
    pub id: String,
    pub family_id: String,
    pub name: String,
    /// Birth date (YYYY-MM-DD)
    pub birth_date: Option<String>,
    pub gender: Gender,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
#[serde(rename_all = "camelCase")]
pub struct FamilyInvitation {
    pub id: String,
    pub family_id: String,
    pub email: String,
    pub invited_by: String,
    pub role: FamilyMemberRole,
    pub status: InvitationStatus,
    pub message: Option<String>,
    /// Token the invitee presents to accept or decline
    pub token: String,
    pub expires_at: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// One feeding / elimination observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub id: String,
    pub baby_id: Option<String>,
    /// User ID of the member who recorded the entry
    pub user_id: String,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:mm or HH:mm:ss
    pub time: String,
    pub feed_type: FeedType,
    pub starting_breast: Option<StartingBreast>,
    pub temperature: Option<f64>,
    pub did_pee: bool,
    pub did_poo: bool,
    pub did_throw_up: bool,
    pub comment: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
#[serde(rename_all = "camelCase")]
pub struct SleepSession {
    pub id: String,
    pub baby_id: Option<String>,
    pub user_id: String,
    pub date: String,
    pub start_time: String,
    /// Absent while the baby is still sleeping
    pub end_time: Option<String>,
    /// Minutes slept, as reported by the client when the session stopped
    pub duration_minutes: Option<i32>,
    pub is_active: bool,
    pub comment: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::InputObject))]
#[cfg_attr(feature = "graphql", graphql(name = "CreateFamilyInput"))]
#[serde(rename_all = "camelCase")]
pub struct CreateFamilyRequest {
    pub name: String,
    #[serde(default)]
    pub owner_display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::InputObject))]
#[cfg_attr(feature = "graphql", graphql(name = "UpdateFamilyInput"))]
#[serde(rename_all = "camelCase")]
pub struct UpdateFamilyRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::InputObject))]
#[cfg_attr(feature = "graphql", graphql(name = "CreateBabyInput"))]
#[serde(rename_all = "camelCase")]
pub struct CreateBabyRequest {
    pub name: String,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::InputObject))]
#[cfg_attr(feature = "graphql", graphql(name = "UpdateBabyInput"))]
#[serde(rename_all = "camelCase")]
pub struct UpdateBabyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::InputObject))]
#[cfg_attr(feature = "graphql", graphql(name = "InviteMemberInput"))]
#[serde(rename_all = "camelCase")]
pub struct InviteMemberRequest {
    pub email: String,
    /// Defaults to `PARENT`
    #[serde(default)]
    pub role: Option<FamilyMemberRole>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRoleRequest {
    pub role: FamilyMemberRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDisplayNameRequest {
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::InputObject))]
#[cfg_attr(feature = "graphql", graphql(name = "CreateFeedEntryInput"))]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedEntryRequest {
    pub baby_id: String,
    pub date: String,
    pub time: String,
    pub feed_type: FeedType,
    #[serde(default)]
    pub starting_breast: Option<StartingBreast>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    #[cfg_attr(feature = "graphql", graphql(default))]
    pub did_pee: bool,
    #[serde(default)]
    #[cfg_attr(feature = "graphql", graphql(default))]
    pub did_poo: bool,
    #[serde(default)]
    #[cfg_attr(feature = "graphql", graphql(default))]
    pub did_throw_up: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::InputObject))]
#[cfg_attr(feature = "graphql", graphql(name = "UpdateFeedEntryInput"))]
#[serde(rename_all = "camelCase")]
pub struct UpdateFeedEntryRequest {
    /// Moves the entry to another baby; requires access to both babies
    #[serde(default)]
    pub baby_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub feed_type: Option<FeedType>,
    #[serde(default)]
    pub starting_breast: Option<StartingBreast>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub did_pee: Option<bool>,
    #[serde(default)]
    pub did_poo: Option<bool>,
    #[serde(default)]
    pub did_throw_up: Option<bool>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::InputObject))]
#[cfg_attr(feature = "graphql", graphql(name = "CreateSleepSessionInput"))]
#[serde(rename_all = "camelCase")]
pub struct CreateSleepSessionRequest {
    pub baby_id: String,
    pub date: String,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    #[cfg_attr(feature = "graphql", graphql(default))]
    pub is_active: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::InputObject))]
#[cfg_attr(feature = "graphql", graphql(name = "UpdateSleepSessionInput"))]
#[serde(rename_all = "camelCase")]
pub struct UpdateSleepSessionRequest {
    #[serde(default)]
    pub baby_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopSleepRequest {
    pub end_time: String,
    pub duration_minutes: i32,
}

/// Error body returned by every REST endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_entry_request_uses_camel_case_and_defaults() {
        let json = r#"{
            "babyId": "baby-1",
            "date": "2025-09-01",
            "time": "08:30",
            "feedType": "BREAST",
            "startingBreast": "LEFT",
            "didPee": true
        }"#;

        let request: CreateFeedEntryRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.baby_id, "baby-1");
        assert_eq!(request.feed_type, FeedType::Breast);
        assert_eq!(request.starting_breast, Some(StartingBreast::Left));
        assert!(request.did_pee);
        assert!(!request.did_poo);
        assert!(!request.did_throw_up);
        assert_eq!(request.comment, None);
    }

    #[test]
    fn test_enums_serialize_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&FamilyMemberRole::Caregiver).unwrap(), "\"CAREGIVER\"");
        assert_eq!(serde_json::to_string(&InvitationStatus::Expired).unwrap(), "\"EXPIRED\"");
        assert_eq!(serde_json::to_string(&FeedType::Bottle).unwrap(), "\"BOTTLE\"");
    }

    #[test]
    fn test_sleep_session_serializes_optional_fields() {
        let session = SleepSession {
            id: "sleep-1".to_string(),
            baby_id: Some("baby-1".to_string()),
            user_id: "user-a".to_string(),
            date: "2025-09-01".to_string(),
            start_time: "21:00".to_string(),
            end_time: None,
            duration_minutes: None,
            is_active: true,
            comment: None,
            created_at: "2025-09-01T21:00:00.000Z".to_string(),
            updated_at: None,
        };

        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["isActive"], true);
        assert_eq!(value["startTime"], "21:00");
        assert!(value["endTime"].is_null());
    }
}
