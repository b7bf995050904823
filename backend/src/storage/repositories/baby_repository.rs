use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use crate::domain::models::Baby;
use crate::storage::codec::{
    decode_date, decode_enum, decode_optional_timestamp, decode_timestamp, encode_date,
    encode_timestamp,
};
use crate::storage::connection::DbConnection;
use crate::storage::traits::BabyStorage;

/// Repository for baby profiles
#[derive(Clone)]
pub struct BabyRepository {
    db: DbConnection,
}

impl BabyRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub(crate) async fn insert_baby(tx: &mut Transaction<'_, Sqlite>, baby: &Baby) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO babies (id, family_id, name, birth_date, gender, notes, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&baby.id)
        .bind(&baby.family_id)
        .bind(&baby.name)
        .bind(baby.birth_date.as_ref().map(encode_date))
        .bind(baby.gender.as_str())
        .bind(&baby.notes)
        .bind(&baby.created_by)
        .bind(encode_timestamp(&baby.created_at))
        .bind(baby.updated_at.as_ref().map(encode_timestamp))
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

fn baby_from_row(row: &SqliteRow) -> Result<Baby> {
    let birth_date: Option<String> = row.try_get("birth_date")?;
    Ok(Baby {
        id: row.try_get("id")?,
        family_id: row.try_get("family_id")?,
        name: row.try_get("name")?,
        birth_date: birth_date.as_deref().map(decode_date).transpose()?,
        gender: decode_enum(&row.try_get::<String, _>("gender")?)?,
        notes: row.try_get("notes")?,
        created_by: row.try_get("created_by")?,
        created_at: decode_timestamp(&row.try_get::<String, _>("created_at")?)?,
        updated_at: decode_optional_timestamp(row.try_get("updated_at")?)?,
    })
}

#[async_trait]
impl BabyStorage for BabyRepository {
    async fn store_baby(&self, baby: &Baby) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;
        Self::insert_baby(&mut tx, baby).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_baby(&self, baby_id: &str) -> Result<Option<Baby>> {
        let row = sqlx::query(
            r#"
            SELECT id, family_id, name, birth_date, gender, notes, created_by, created_at, updated_at
            FROM babies
            WHERE id = ?
            "#,
        )
        .bind(baby_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(baby_from_row).transpose()
    }

    async fn list_babies(&self, family_id: &str) -> Result<Vec<Baby>> {
        let rows = sqlx::query(
            r#"
            SELECT id, family_id, name, birth_date, gender, notes, created_by, created_at, updated_at
            FROM babies
            WHERE family_id = ?
            ORDER BY created_at ASC, name ASC
            "#,
        )
        .bind(family_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(baby_from_row).collect()
    }

    async fn update_baby(&self, baby: &Baby) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE babies
            SET name = ?, birth_date = ?, gender = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&baby.name)
        .bind(baby.birth_date.as_ref().map(encode_date))
        .bind(baby.gender.as_str())
        .bind(&baby.notes)
        .bind(baby.updated_at.as_ref().map(encode_timestamp))
        .bind(&baby.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_baby(&self, baby_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM babies WHERE id = ?
            "#,
        )
        .bind(baby_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
