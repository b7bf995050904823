use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::SleepSession;
use crate::storage::codec::{
    decode_date, decode_optional_timestamp, decode_time, decode_timestamp, encode_date, encode_time,
    encode_timestamp,
};
use crate::storage::connection::DbConnection;
use crate::storage::traits::SleepSessionStorage;
use crate::storage::StorageError;

const SLEEP_COLUMNS: &str = "s.id, s.baby_id, s.user_id, s.date, s.start_time, s.end_time, \
     s.duration_minutes, s.is_active, s.comment, s.created_at, s.updated_at";

/// Repository for sleep sessions
#[derive(Clone)]
pub struct SleepSessionRepository {
    db: DbConnection,
}

impl SleepSessionRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    async fn fetch_list(&self, sql: &str, binds: &[&str]) -> Result<Vec<SleepSession>> {
        let mut query = sqlx::query(sql);
        for value in binds {
            query = query.bind(*value);
        }
        let rows = query.fetch_all(self.db.pool()).await?;

        rows.iter().map(sleep_session_from_row).collect()
    }
}

fn sleep_session_from_row(row: &SqliteRow) -> Result<SleepSession> {
    let end_time: Option<String> = row.try_get("end_time")?;
    Ok(SleepSession {
        id: row.try_get("id")?,
        baby_id: row.try_get("baby_id")?,
        user_id: row.try_get("user_id")?,
        date: decode_date(&row.try_get::<String, _>("date")?)?,
        start_time: decode_time(&row.try_get::<String, _>("start_time")?)?,
        end_time: end_time.as_deref().map(decode_time).transpose()?,
        duration_minutes: row.try_get("duration_minutes")?,
        is_active: row.try_get("is_active")?,
        comment: row.try_get("comment")?,
        created_at: decode_timestamp(&row.try_get::<String, _>("created_at")?)?,
        updated_at: decode_optional_timestamp(row.try_get("updated_at")?)?,
    })
}

/// Translate a hit on the one-active-session index into a typed error
fn map_active_violation(error: sqlx::Error, session: &SleepSession) -> anyhow::Error {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() && db_error.message().contains("sleep_sessions.baby_id") {
            return StorageError::ActiveSleepExists {
                baby_id: session.baby_id.clone().unwrap_or_default(),
            }
            .into();
        }
    }
    error.into()
}

#[async_trait]
impl SleepSessionStorage for SleepSessionRepository {
    async fn store_sleep_session(&self, session: &SleepSession) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sleep_sessions
                (id, baby_id, user_id, date, start_time, end_time, duration_minutes, is_active,
                 comment, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(&session.baby_id)
        .bind(&session.user_id)
        .bind(encode_date(&session.date))
        .bind(encode_time(&session.start_time))
        .bind(session.end_time.as_ref().map(encode_time))
        .bind(session.duration_minutes)
        .bind(session.is_active)
        .bind(&session.comment)
        .bind(encode_timestamp(&session.created_at))
        .bind(session.updated_at.as_ref().map(encode_timestamp))
        .execute(self.db.pool())
        .await
        .map_err(|e| map_active_violation(e, session))?;
        Ok(())
    }

    async fn get_sleep_session(&self, session_id: &str) -> Result<Option<SleepSession>> {
        let sql = format!("SELECT {} FROM sleep_sessions s WHERE s.id = ?", SLEEP_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(session_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(sleep_session_from_row).transpose()
    }

    async fn get_active_session(&self, baby_id: &str) -> Result<Option<SleepSession>> {
        let sql = format!(
            "SELECT {} FROM sleep_sessions s WHERE s.baby_id = ? AND s.is_active = 1",
            SLEEP_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(baby_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(sleep_session_from_row).transpose()
    }

    async fn list_sleep_sessions_for_baby(&self, baby_id: &str) -> Result<Vec<SleepSession>> {
        let sql = format!(
            r#"
            SELECT {} FROM sleep_sessions s
            WHERE s.baby_id = ?
            ORDER BY s.date DESC, s.start_time DESC, s.created_at DESC
            "#,
            SLEEP_COLUMNS
        );
        self.fetch_list(&sql, &[baby_id]).await
    }

    async fn list_sleep_sessions_in_range(
        &self,
        baby_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<SleepSession>> {
        let sql = format!(
            r#"
            SELECT {} FROM sleep_sessions s
            WHERE s.baby_id = ? AND s.date >= ? AND s.date <= ?
            ORDER BY s.date ASC, s.start_time ASC, s.created_at ASC
            "#,
            SLEEP_COLUMNS
        );
        let start = encode_date(&start_date);
        let end = encode_date(&end_date);
        self.fetch_list(&sql, &[baby_id, start.as_str(), end.as_str()]).await
    }

    async fn list_sleep_sessions_for_family(&self, family_id: &str) -> Result<Vec<SleepSession>> {
        let sql = format!(
            r#"
            SELECT {} FROM sleep_sessions s
            JOIN babies b ON b.id = s.baby_id
            WHERE b.family_id = ?
            ORDER BY s.date DESC, s.start_time DESC, s.created_at DESC
            "#,
            SLEEP_COLUMNS
        );
        self.fetch_list(&sql, &[family_id]).await
    }

    async fn list_sleep_sessions_for_user(&self, user_id: &str) -> Result<Vec<SleepSession>> {
        let sql = format!(
            r#"
            SELECT {} FROM sleep_sessions s
            JOIN babies b ON b.id = s.baby_id
            JOIN family_members m ON m.family_id = b.family_id
            WHERE m.user_id = ? AND m.status = 'ACTIVE'
            ORDER BY s.date DESC, s.start_time DESC, s.created_at DESC
            "#,
            SLEEP_COLUMNS
        );
        self.fetch_list(&sql, &[user_id]).await
    }

    async fn update_sleep_session(&self, session: &SleepSession) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE sleep_sessions
            SET baby_id = ?, date = ?, start_time = ?, end_time = ?, duration_minutes = ?,
                is_active = ?, comment = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&session.baby_id)
        .bind(encode_date(&session.date))
        .bind(encode_time(&session.start_time))
        .bind(session.end_time.as_ref().map(encode_time))
        .bind(session.duration_minutes)
        .bind(session.is_active)
        .bind(&session.comment)
        .bind(session.updated_at.as_ref().map(encode_timestamp))
        .bind(&session.id)
        .execute(self.db.pool())
        .await
        .map_err(|e| map_active_violation(e, session))?;
        Ok(())
    }

    async fn delete_sleep_session(&self, session_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM sleep_sessions WHERE id = ?
            "#,
        )
        .bind(session_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Baby, Family, FamilyMember, FamilyMemberRole, Gender, MembershipStatus};
    use crate::storage::traits::{BabyStorage, FamilyStorage};
    use crate::storage::{BabyRepository, FamilyRepository};
    use chrono::{NaiveTime, Utc};

    async fn setup_test() -> (SleepSessionRepository, String) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let now = Utc::now();
        let family = Family {
            id: Family::generate_id(),
            name: "Home".to_string(),
            owner_id: "owner".to_string(),
            created_at: now,
            updated_at: None,
        };
        let owner = FamilyMember {
            id: FamilyMember::generate_id(),
            family_id: family.id.clone(),
            user_id: "owner".to_string(),
            display_name: "You".to_string(),
            email: None,
            role: FamilyMemberRole::Owner,
            status: MembershipStatus::Active,
            invited_by: None,
            created_at: now,
            updated_at: None,
        };
        FamilyRepository::new(db.clone())
            .create_family_with_owner(&family, &owner)
            .await
            .unwrap();
        let baby = Baby {
            id: Baby::generate_id(),
            family_id: family.id.clone(),
            name: "Lily".to_string(),
            birth_date: None,
            gender: Gender::Unknown,
            notes: None,
            created_by: "owner".to_string(),
            created_at: now,
            updated_at: None,
        };
        BabyRepository::new(db.clone()).store_baby(&baby).await.unwrap();
        (SleepSessionRepository::new(db), baby.id)
    }

    fn session(baby_id: &str, date: &str, start: (u32, u32), is_active: bool) -> SleepSession {
        SleepSession {
            id: SleepSession::generate_id(),
            baby_id: Some(baby_id.to_string()),
            user_id: "owner".to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: None,
            duration_minutes: None,
            is_active,
            comment: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_second_active_session_violates_index() {
        let (repo, baby_id) = setup_test().await;
        repo.store_sleep_session(&session(&baby_id, "2024-03-01", (20, 0), true)).await.unwrap();

        let err = repo
            .store_sleep_session(&session(&baby_id, "2024-03-01", (21, 0), true))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<StorageError>(),
            Some(StorageError::ActiveSleepExists { .. })
        ));
        repo.store_sleep_session(&session(&baby_id, "2024-03-01", (13, 0), false))
            .await
            .expect("Inactive sessions are unconstrained");
    }

    #[tokio::test]
    async fn test_range_is_inclusive_and_chronological() {
        let (repo, baby_id) = setup_test().await;
        for (date, start) in [("2024-03-03", (9, 0)), ("2024-03-01", (13, 0)), ("2024-03-01", (9, 0)), ("2024-02-28", (9, 0))] {
            repo.store_sleep_session(&session(&baby_id, date, start, false)).await.unwrap();
        }

        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        let in_range = repo.list_sleep_sessions_in_range(&baby_id, start, end).await.unwrap();
        let keys: Vec<String> = in_range
            .iter()
            .map(|s| format!("{} {}", s.date, s.start_time.format("%H:%M")))
            .collect();

        assert_eq!(keys, vec!["2024-03-01 09:00", "2024-03-01 13:00", "2024-03-03 09:00"]);

        let all = repo.list_sleep_sessions_for_baby(&baby_id).await.unwrap();
        assert_eq!(all.first().map(|s| s.date), Some(end));
        assert_eq!(repo.list_sleep_sessions_for_user("owner").await.unwrap().len(), 4);
        assert!(repo.list_sleep_sessions_for_user("stranger").await.unwrap().is_empty());
    }
}
