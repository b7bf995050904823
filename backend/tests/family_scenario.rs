use std::sync::Arc;

use baby_tracker_backend::domain::commands::babies::CreateBabyCommand;
use baby_tracker_backend::domain::commands::families::CreateFamilyCommand;
use baby_tracker_backend::domain::commands::feed_entries::CreateFeedEntryCommand;
use baby_tracker_backend::domain::commands::invitations::InviteMemberCommand;
use baby_tracker_backend::domain::commands::sleep_sessions::{CreateSleepSessionCommand, StopSleepCommand};
use baby_tracker_backend::domain::models::{FamilyMemberRole, FeedType, MembershipStatus};
use baby_tracker_backend::domain::{
    CallerIdentity, DomainError, FamilyService, FeedEntryService, InvitationService, SleepService,
};
use baby_tracker_backend::storage::DbConnection;

struct Services {
    families: FamilyService,
    invitations: InvitationService,
    feeds: FeedEntryService,
    sleeps: SleepService,
}

async fn setup() -> Services {
    let db = Arc::new(DbConnection::init_test().await.expect("Failed to create test database"));
    Services {
        families: FamilyService::new(db.clone()),
        invitations: InvitationService::new(db.clone()),
        feeds: FeedEntryService::new(db.clone()),
        sleeps: SleepService::new(db),
    }
}

fn feed(baby_id: &str, time: &str, did_pee: bool) -> CreateFeedEntryCommand {
    CreateFeedEntryCommand {
        baby_id: baby_id.to_string(),
        date: "2025-09-01".to_string(),
        time: time.to_string(),
        feed_type: FeedType::Bottle,
        starting_breast: None,
        temperature: None,
        did_pee,
        did_poo: false,
        did_throw_up: false,
        comment: None,
    }
}

fn sleep(baby_id: &str, start_time: &str) -> CreateSleepSessionCommand {
    CreateSleepSessionCommand {
        baby_id: baby_id.to_string(),
        date: "2025-09-01".to_string(),
        start_time: start_time.to_string(),
        end_time: None,
        duration_minutes: None,
        is_active: true,
        comment: None,
    }
}

#[tokio::test]
async fn test_shared_family_lifecycle() {
    let services = setup().await;
    let alice = CallerIdentity::new("user-a").with_email("a@x.com");
    let bob = CallerIdentity::new("user-b").with_email("b@x.com");

    let family = services
        .families
        .create_family(
            &alice,
            CreateFamilyCommand {
                name: "Smiths".to_string(),
                owner_display_name: Some("Alice".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(family.owner_id, "user-a");

    let members = services.families.list_family_members(&alice, &family.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, "user-a");
    assert_eq!(members[0].role, FamilyMemberRole::Owner);
    assert_eq!(members[0].status, MembershipStatus::Active);

    let baby = services
        .families
        .create_baby(
            &alice,
            CreateBabyCommand {
                family_id: family.id.clone(),
                name: "Jo".to_string(),
                birth_date: Some("2025-08-20".to_string()),
                gender: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    // Bob sees nothing before joining
    let result = services.feeds.create_feed_entry(&bob, feed(&baby.id, "07:00", false)).await;
    assert!(matches!(result, Err(DomainError::Unauthorized(_))));

    let invitation = services
        .invitations
        .invite_member(
            &alice,
            InviteMemberCommand {
                family_id: family.id.clone(),
                email: "B@x.com".to_string(),
                role: Some(FamilyMemberRole::Parent),
                message: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(invitation.email, "b@x.com");

    let pending = services.invitations.list_pending_invitations(&bob).await.unwrap();
    assert_eq!(pending.len(), 1);

    let membership = services.invitations.accept_invitation(&bob, &invitation.token).await.unwrap();
    assert_eq!(membership.role, FamilyMemberRole::Parent);
    assert_eq!(membership.status, MembershipStatus::Active);

    // The token is single use
    let again = services.invitations.accept_invitation(&bob, &invitation.token).await;
    assert!(matches!(again, Err(DomainError::NotFound(_))));

    let bobs_entry = services.feeds.create_feed_entry(&bob, feed(&baby.id, "08:00", true)).await.unwrap();
    assert!(bobs_entry.did_pee);
    let alices_entry = services.feeds.create_feed_entry(&alice, feed(&baby.id, "09:00", false)).await.unwrap();

    // Bob reads Alice's entry but cannot delete it
    let read = services.feeds.get_feed_entry(&bob, &alices_entry.id).await.unwrap();
    assert_eq!(read.id, alices_entry.id);
    let denied = services.feeds.delete_feed_entry(&bob, &alices_entry.id).await;
    assert!(matches!(denied, Err(DomainError::Unauthorized(_))));

    // Alice owns the family, so she can delete Bob's entry
    assert!(services.feeds.delete_feed_entry(&alice, &bobs_entry.id).await.unwrap());
    let remaining = services.feeds.list_for_baby(&alice, &baby.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, alices_entry.id);

    // One running sleep per baby, whoever starts it
    let session = services.sleeps.create_sleep_session(&bob, sleep(&baby.id, "13:00")).await.unwrap();
    let conflict = services.sleeps.create_sleep_session(&alice, sleep(&baby.id, "13:30")).await;
    assert!(matches!(conflict, Err(DomainError::Conflict(_))));

    let stopped = services
        .sleeps
        .stop_sleep(
            &bob,
            &session.id,
            StopSleepCommand {
                end_time: "14:30".to_string(),
                duration_minutes: 90,
            },
        )
        .await
        .unwrap();
    assert!(!stopped.is_active);
    assert_eq!(stopped.duration_minutes, Some(90));
    assert!(services.sleeps.active_session(&alice, &baby.id).await.unwrap().is_none());

    // Removing Bob cuts off his access
    let bob_member = services
        .families
        .list_family_members(&alice, &family.id)
        .await
        .unwrap()
        .into_iter()
        .find(|member| member.user_id == "user-b")
        .unwrap();
    assert!(services.families.remove_member(&alice, &family.id, &bob_member.id).await.unwrap());

    let lost = services.feeds.get_feed_entry(&bob, &alices_entry.id).await;
    assert!(matches!(lost, Err(DomainError::Unauthorized(_))));
    assert!(services.families.list_user_families(&bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_owner_membership_cannot_be_removed() {
    let services = setup().await;
    let alice = CallerIdentity::new("user-a").with_email("a@x.com");

    let family = services
        .families
        .create_family(
            &alice,
            CreateFamilyCommand {
                name: "Smiths".to_string(),
                owner_display_name: None,
            },
        )
        .await
        .unwrap();
    let owner_member = services.families.list_family_members(&alice, &family.id).await.unwrap().remove(0);

    let result = services.families.remove_member(&alice, &family.id, &owner_member.id).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));

    let members = services.families.list_family_members(&alice, &family.id).await.unwrap();
    assert_eq!(members.len(), 1);
}
