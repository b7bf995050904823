//! One-off adoption of entries recorded before families existed.
//!
//! Every creator of baby-less entries gets a family they own, a default baby,
//! and their entries attached to that baby. Running it again is a no-op.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::domain::error::DomainResult;
use crate::domain::models::{
    Baby, Family, FamilyMember, FamilyMemberRole, Gender, MembershipStatus,
};
use crate::storage::traits::{LegacyAdoption, LegacyMigrationStorage};
use crate::storage::{DbConnection, LegacyMigrationRepository};

pub const LEGACY_FAMILY_NAME: &str = "My Family";
pub const LEGACY_OWNER_DISPLAY_NAME: &str = "You (default)";
pub const LEGACY_BABY_NAME: &str = "Baby";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub families_created: usize,
    pub feed_entries_migrated: u64,
    pub sleep_sessions_migrated: u64,
}

#[derive(Clone)]
pub struct MigrationService {
    legacy_repository: LegacyMigrationRepository,
}

impl MigrationService {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self {
            legacy_repository: LegacyMigrationRepository::new((*db).clone()),
        }
    }

    pub async fn migrate_legacy_data(&self) -> DomainResult<MigrationReport> {
        info!("Checking for legacy entries without a baby");

        let creators = self.legacy_repository.list_legacy_creators().await?;
        if creators.is_empty() {
            info!("No legacy entries to migrate");
            return Ok(MigrationReport::default());
        }

        let adoptions: Vec<LegacyAdoption> = creators.iter().map(|user_id| adoption_for(user_id)).collect();
        let counts = self.legacy_repository.adopt_legacy_entries(&adoptions).await?;

        let report = MigrationReport {
            families_created: adoptions.len(),
            feed_entries_migrated: counts.feed_entries,
            sleep_sessions_migrated: counts.sleep_sessions,
        };
        info!(
            "Legacy migration complete: {} families, {} feed entries, {} sleep sessions",
            report.families_created, report.feed_entries_migrated, report.sleep_sessions_migrated
        );
        Ok(report)
    }
}

fn adoption_for(user_id: &str) -> LegacyAdoption {
    let now = Utc::now();
    let family = Family {
        id: Family::generate_id(),
        name: LEGACY_FAMILY_NAME.to_string(),
        owner_id: user_id.to_string(),
        created_at: now,
        updated_at: None,
    };
    let owner = FamilyMember {
        id: FamilyMember::generate_id(),
        family_id: family.id.clone(),
        user_id: user_id.to_string(),
        display_name: LEGACY_OWNER_DISPLAY_NAME.to_string(),
        email: None,
        role: FamilyMemberRole::Owner,
        status: MembershipStatus::Active,
        invited_by: None,
        created_at: now,
        updated_at: None,
    };
    let baby = Baby {
        id: Baby::generate_id(),
        family_id: family.id.clone(),
        name: LEGACY_BABY_NAME.to_string(),
        birth_date: None,
        gender: Gender::Unknown,
        notes: None,
        created_by: user_id.to_string(),
        created_at: now,
        updated_at: None,
    };

    LegacyAdoption { family, owner, baby }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::family_service::FamilyService;
    use crate::domain::feed_entry_service::FeedEntryService;
    use crate::domain::identity::CallerIdentity;
    use crate::domain::models::{FeedEntry, FeedType, SleepSession};
    use crate::domain::sleep_service::SleepService;
    use crate::storage::traits::{FeedEntryStorage, SleepSessionStorage};
    use crate::storage::{FeedEntryRepository, SleepSessionRepository};
    use chrono::{NaiveDate, NaiveTime};

    struct TestContext {
        db: Arc<DbConnection>,
        service: MigrationService,
    }

    async fn setup_test() -> TestContext {
        let db = Arc::new(DbConnection::init_test().await.expect("Failed to create test database"));
        TestContext {
            service: MigrationService::new(db.clone()),
            db,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 11, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    async fn legacy_feed(ctx: &TestContext, user_id: &str, d: u32) -> FeedEntry {
        let entry = FeedEntry {
            id: FeedEntry::generate_id(),
            baby_id: None,
            user_id: user_id.to_string(),
            date: day(d),
            time: time(8, 0),
            feed_type: FeedType::Bottle,
            starting_breast: None,
            temperature: None,
            did_pee: true,
            did_poo: false,
            did_throw_up: false,
            comment: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        FeedEntryRepository::new((*ctx.db).clone())
            .store_feed_entry(&entry)
            .await
            .unwrap();
        entry
    }

    async fn legacy_sleep(ctx: &TestContext, user_id: &str, d: u32, active: bool) -> SleepSession {
        let session = SleepSession {
            id: SleepSession::generate_id(),
            baby_id: None,
            user_id: user_id.to_string(),
            date: day(d),
            start_time: time(20, 0),
            end_time: None,
            duration_minutes: None,
            is_active: active,
            comment: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        SleepSessionRepository::new((*ctx.db).clone())
            .store_sleep_session(&session)
            .await
            .unwrap();
        session
    }

    #[tokio::test]
    async fn test_nothing_to_migrate() {
        let ctx = setup_test().await;

        let report = ctx.service.migrate_legacy_data().await.unwrap();

        assert_eq!(report, MigrationReport::default());
    }

    #[tokio::test]
    async fn test_each_creator_gets_a_family_and_baby() {
        let ctx = setup_test().await;
        legacy_feed(&ctx, "alice", 1).await;
        legacy_feed(&ctx, "alice", 2).await;
        legacy_sleep(&ctx, "alice", 2, false).await;
        legacy_feed(&ctx, "bob", 3).await;

        let report = ctx.service.migrate_legacy_data().await.unwrap();

        assert_eq!(
            report,
            MigrationReport {
                families_created: 2,
                feed_entries_migrated: 3,
                sleep_sessions_migrated: 1,
            }
        );

        let alice = CallerIdentity::new("alice");
        let families = FamilyService::new(ctx.db.clone());
        let alice_families = families.list_user_families(&alice).await.unwrap();
        assert_eq!(alice_families.len(), 1);
        assert_eq!(alice_families[0].name, LEGACY_FAMILY_NAME);
        assert!(alice_families[0].is_owned_by("alice"));

        let details = families.get_family_details(&alice, &alice_families[0].id).await.unwrap();
        assert_eq!(details.members.len(), 1);
        assert_eq!(details.members[0].display_name, LEGACY_OWNER_DISPLAY_NAME);
        assert_eq!(details.babies.len(), 1);

        let baby_id = &details.babies[0].id;
        let feeds = FeedEntryService::new(ctx.db.clone())
            .list_for_baby(&alice, baby_id)
            .await
            .unwrap();
        assert_eq!(feeds.len(), 2);

        // Bob's entries went to Bob's own family
        let err = FeedEntryService::new(ctx.db.clone())
            .list_for_baby(&CallerIdentity::new("bob"), baby_id)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::domain::error::DomainError::Unauthorized(_)));

        let again = ctx.service.migrate_legacy_data().await.unwrap();
        assert_eq!(again, MigrationReport::default());
    }

    #[tokio::test]
    async fn test_only_newest_legacy_sleep_stays_active() {
        let ctx = setup_test().await;
        legacy_sleep(&ctx, "alice", 1, true).await;
        let newest = legacy_sleep(&ctx, "alice", 5, true).await;

        let report = ctx.service.migrate_legacy_data().await.unwrap();
        assert_eq!(report.sleep_sessions_migrated, 2);

        let alice = CallerIdentity::new("alice");
        let family = &FamilyService::new(ctx.db.clone())
            .list_user_families(&alice)
            .await
            .unwrap()[0];
        let details = FamilyService::new(ctx.db.clone())
            .get_family_details(&alice, &family.id)
            .await
            .unwrap();

        let active = SleepService::new(ctx.db.clone())
            .active_session(&alice, &details.babies[0].id)
            .await
            .unwrap();
        assert_eq!(active.map(|s| s.id), Some(newest.id));
    }
}
