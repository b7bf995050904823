use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use crate::domain::models::{Family, FamilyMember};
use crate::storage::codec::{decode_optional_timestamp, decode_timestamp, encode_timestamp};
use crate::storage::connection::DbConnection;
use crate::storage::traits::FamilyStorage;

/// Repository for family operations
#[derive(Clone)]
pub struct FamilyRepository {
    db: DbConnection,
}

impl FamilyRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub(crate) async fn insert_family(tx: &mut Transaction<'_, Sqlite>, family: &Family) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO families (id, name, owner_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&family.id)
        .bind(&family.name)
        .bind(&family.owner_id)
        .bind(encode_timestamp(&family.created_at))
        .bind(family.updated_at.as_ref().map(encode_timestamp))
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

fn family_from_row(row: &SqliteRow) -> Result<Family> {
    Ok(Family {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        owner_id: row.try_get("owner_id")?,
        created_at: decode_timestamp(&row.try_get::<String, _>("created_at")?)?,
        updated_at: decode_optional_timestamp(row.try_get("updated_at")?)?,
    })
}

#[async_trait]
impl FamilyStorage for FamilyRepository {
    async fn create_family_with_owner(&self, family: &Family, owner: &FamilyMember) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        Self::insert_family(&mut tx, family).await?;
        super::member_repository::MemberRepository::insert_member(&mut tx, owner).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_family(&self, family_id: &str) -> Result<Option<Family>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, owner_id, created_at, updated_at
            FROM families
            WHERE id = ?
            "#,
        )
        .bind(family_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(family_from_row).transpose()
    }

    async fn list_families_for_user(&self, user_id: &str) -> Result<Vec<Family>> {
        let rows = sqlx::query(
            r#"
            SELECT f.id, f.name, f.owner_id, f.created_at, f.updated_at
            FROM families f
            WHERE f.owner_id = ?
               OR EXISTS (
                   SELECT 1 FROM family_members m
                   WHERE m.family_id = f.id AND m.user_id = ? AND m.status = 'ACTIVE'
               )
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(family_from_row).collect()
    }

    async fn update_family(&self, family: &Family) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE families
            SET name = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&family.name)
        .bind(family.updated_at.as_ref().map(encode_timestamp))
        .bind(&family.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_family(&self, family_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM families WHERE id = ?
            "#,
        )
        .bind(family_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{FamilyMemberRole, MembershipStatus};
    use crate::storage::traits::MemberStorage;
    use crate::storage::MemberRepository;
    use chrono::Utc;

    fn family_with_owner(owner_id: &str) -> (Family, FamilyMember) {
        let now = Utc::now();
        let family = Family {
            id: Family::generate_id(),
            name: "The Smiths".to_string(),
            owner_id: owner_id.to_string(),
            created_at: now,
            updated_at: None,
        };
        let owner = FamilyMember {
            id: FamilyMember::generate_id(),
            family_id: family.id.clone(),
            user_id: owner_id.to_string(),
            display_name: FamilyMember::OWNER_DISPLAY_NAME.to_string(),
            email: None,
            role: FamilyMemberRole::Owner,
            status: MembershipStatus::Active,
            invited_by: None,
            created_at: now,
            updated_at: None,
        };
        (family, owner)
    }

    #[tokio::test]
    async fn test_create_family_with_owner_stores_both_rows() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let repo = FamilyRepository::new(db.clone());
        let members = MemberRepository::new(db);
        let (family, owner) = family_with_owner("user-a");

        repo.create_family_with_owner(&family, &owner).await.expect("Failed to create family");

        assert_eq!(repo.get_family(&family.id).await.unwrap(), Some(family.clone()));
        assert!(members.is_active_member(&family.id, "user-a").await.unwrap());
        assert_eq!(repo.list_families_for_user("user-a").await.unwrap().len(), 1);
        assert!(repo.list_families_for_user("user-b").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_owner_insert_rolls_back_family() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let repo = FamilyRepository::new(db);
        let (family, mut owner) = family_with_owner("user-a");
        owner.family_id = "missing-family".to_string();

        assert!(repo.create_family_with_owner(&family, &owner).await.is_err());
        assert_eq!(repo.get_family(&family.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_family_reports_presence_and_cascades() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let repo = FamilyRepository::new(db.clone());
        let members = MemberRepository::new(db);
        let (family, owner) = family_with_owner("user-a");
        repo.create_family_with_owner(&family, &owner).await.unwrap();

        assert!(repo.delete_family(&family.id).await.unwrap());
        assert!(!repo.delete_family(&family.id).await.unwrap());
        assert_eq!(members.get_member(&owner.id).await.unwrap(), None);
    }
}
