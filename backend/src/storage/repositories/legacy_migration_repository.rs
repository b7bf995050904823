use anyhow::Result;
use async_trait::async_trait;
use sqlx::Row;

use crate::storage::connection::DbConnection;
use crate::storage::repositories::{BabyRepository, FamilyRepository, MemberRepository};
use crate::storage::traits::{LegacyAdoption, LegacyAdoptionCounts, LegacyMigrationStorage};

/// Moves entries recorded before families existed into a family structure
#[derive(Clone)]
pub struct LegacyMigrationRepository {
    db: DbConnection,
}

impl LegacyMigrationRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LegacyMigrationStorage for LegacyMigrationRepository {
    async fn list_legacy_creators(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id FROM feed_entries WHERE baby_id IS NULL
            UNION
            SELECT user_id FROM sleep_sessions WHERE baby_id IS NULL
            ORDER BY user_id
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("user_id").map_err(Into::into))
            .collect()
    }

    async fn adopt_legacy_entries(&self, adoptions: &[LegacyAdoption]) -> Result<LegacyAdoptionCounts> {
        let mut counts = LegacyAdoptionCounts::default();
        let mut tx = self.db.pool().begin().await?;

        for adoption in adoptions {
            let user_id = &adoption.owner.user_id;

            FamilyRepository::insert_family(&mut tx, &adoption.family).await?;
            MemberRepository::insert_member(&mut tx, &adoption.owner).await?;
            BabyRepository::insert_baby(&mut tx, &adoption.baby).await?;

            let feeds = sqlx::query(
                r#"
                UPDATE feed_entries SET baby_id = ?
                WHERE baby_id IS NULL AND user_id = ?
                "#,
            )
            .bind(&adoption.baby.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

            // Keep only the newest legacy session running so the baby has at most one
            sqlx::query(
                r#"
                UPDATE sleep_sessions SET is_active = 0
                WHERE baby_id IS NULL AND user_id = ? AND is_active = 1
                  AND id <> (
                      SELECT id FROM sleep_sessions
                      WHERE baby_id IS NULL AND user_id = ? AND is_active = 1
                      ORDER BY date DESC, start_time DESC, created_at DESC
                      LIMIT 1
                  )
                "#,
            )
            .bind(user_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

            let sleeps = sqlx::query(
                r#"
                UPDATE sleep_sessions SET baby_id = ?
                WHERE baby_id IS NULL AND user_id = ?
                "#,
            )
            .bind(&adoption.baby.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

            counts.feed_entries += feeds.rows_affected();
            counts.sleep_sessions += sleeps.rows_affected();
        }

        tx.commit().await?;
        Ok(counts)
    }
}
