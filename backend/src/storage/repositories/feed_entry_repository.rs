use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::FeedEntry;
use crate::storage::codec::{
    decode_date, decode_enum, decode_optional_timestamp, decode_time, decode_timestamp, encode_date,
    encode_time, encode_timestamp,
};
use crate::storage::connection::DbConnection;
use crate::storage::traits::FeedEntryStorage;

const FEED_COLUMNS: &str = "e.id, e.baby_id, e.user_id, e.date, e.time, e.feed_type, e.starting_breast, \
     e.temperature, e.did_pee, e.did_poo, e.did_throw_up, e.comment, e.created_at, e.updated_at";

/// Repository for feeding entries
#[derive(Clone)]
pub struct FeedEntryRepository {
    db: DbConnection,
}

impl FeedEntryRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    async fn fetch_list(&self, sql: &str, binds: &[&str]) -> Result<Vec<FeedEntry>> {
        let mut query = sqlx::query(sql);
        for value in binds {
            query = query.bind(*value);
        }
        let rows = query.fetch_all(self.db.pool()).await?;

        rows.iter().map(feed_entry_from_row).collect()
    }
}

fn feed_entry_from_row(row: &SqliteRow) -> Result<FeedEntry> {
    let starting_breast: Option<String> = row.try_get("starting_breast")?;
    Ok(FeedEntry {
        id: row.try_get("id")?,
        baby_id: row.try_get("baby_id")?,
        user_id: row.try_get("user_id")?,
        date: decode_date(&row.try_get::<String, _>("date")?)?,
        time: decode_time(&row.try_get::<String, _>("time")?)?,
        feed_type: decode_enum(&row.try_get::<String, _>("feed_type")?)?,
        starting_breast: starting_breast.as_deref().map(decode_enum).transpose()?,
        temperature: row.try_get("temperature")?,
        did_pee: row.try_get("did_pee")?,
        did_poo: row.try_get("did_poo")?,
        did_throw_up: row.try_get("did_throw_up")?,
        comment: row.try_get("comment")?,
        created_at: decode_timestamp(&row.try_get::<String, _>("created_at")?)?,
        updated_at: decode_optional_timestamp(row.try_get("updated_at")?)?,
    })
}

#[async_trait]
impl FeedEntryStorage for FeedEntryRepository {
    async fn store_feed_entry(&self, entry: &FeedEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO feed_entries
                (id, baby_id, user_id, date, time, feed_type, starting_breast, temperature,
                 did_pee, did_poo, did_throw_up, comment, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.baby_id)
        .bind(&entry.user_id)
        .bind(encode_date(&entry.date))
        .bind(encode_time(&entry.time))
        .bind(entry.feed_type.as_str())
        .bind(entry.starting_breast.map(|side| side.as_str()))
        .bind(entry.temperature)
        .bind(entry.did_pee)
        .bind(entry.did_poo)
        .bind(entry.did_throw_up)
        .bind(&entry.comment)
        .bind(encode_timestamp(&entry.created_at))
        .bind(entry.updated_at.as_ref().map(encode_timestamp))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_feed_entry(&self, entry_id: &str) -> Result<Option<FeedEntry>> {
        let sql = format!("SELECT {} FROM feed_entries e WHERE e.id = ?", FEED_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(entry_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(feed_entry_from_row).transpose()
    }

    async fn list_feed_entries_for_baby(&self, baby_id: &str) -> Result<Vec<FeedEntry>> {
        let sql = format!(
            r#"
            SELECT {} FROM feed_entries e
            WHERE e.baby_id = ?
            ORDER BY e.date DESC, e.time DESC, e.created_at DESC
            "#,
            FEED_COLUMNS
        );
        self.fetch_list(&sql, &[baby_id]).await
    }

    async fn list_feed_entries_in_range(
        &self,
        baby_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<FeedEntry>> {
        let sql = format!(
            r#"
            SELECT {} FROM feed_entries e
            WHERE e.baby_id = ? AND e.date >= ? AND e.date <= ?
            ORDER BY e.date ASC, e.time ASC, e.created_at ASC
            "#,
            FEED_COLUMNS
        );
        let start = encode_date(&start_date);
        let end = encode_date(&end_date);
        self.fetch_list(&sql, &[baby_id, start.as_str(), end.as_str()]).await
    }

    async fn list_feed_entries_for_family(&self, family_id: &str) -> Result<Vec<FeedEntry>> {
        let sql = format!(
            r#"
            SELECT {} FROM feed_entries e
            JOIN babies b ON b.id = e.baby_id
            WHERE b.family_id = ?
            ORDER BY e.date DESC, e.time DESC, e.created_at DESC
            "#,
            FEED_COLUMNS
        );
        self.fetch_list(&sql, &[family_id]).await
    }

    async fn list_feed_entries_for_user(&self, user_id: &str) -> Result<Vec<FeedEntry>> {
        let sql = format!(
            r#"
            SELECT {} FROM feed_entries e
            JOIN babies b ON b.id = e.baby_id
            JOIN family_members m ON m.family_id = b.family_id
            WHERE m.user_id = ? AND m.status = 'ACTIVE'
            ORDER BY e.date DESC, e.time DESC, e.created_at DESC
            "#,
            FEED_COLUMNS
        );
        self.fetch_list(&sql, &[user_id]).await
    }

    async fn update_feed_entry(&self, entry: &FeedEntry) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE feed_entries
            SET baby_id = ?, date = ?, time = ?, feed_type = ?, starting_breast = ?, temperature = ?,
                did_pee = ?, did_poo = ?, did_throw_up = ?, comment = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&entry.baby_id)
        .bind(encode_date(&entry.date))
        .bind(encode_time(&entry.time))
        .bind(entry.feed_type.as_str())
        .bind(entry.starting_breast.map(|side| side.as_str()))
        .bind(entry.temperature)
        .bind(entry.did_pee)
        .bind(entry.did_poo)
        .bind(entry.did_throw_up)
        .bind(&entry.comment)
        .bind(entry.updated_at.as_ref().map(encode_timestamp))
        .bind(&entry.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_feed_entry(&self, entry_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM feed_entries WHERE id = ?
            "#,
        )
        .bind(entry_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
