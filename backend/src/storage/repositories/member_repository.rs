use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use crate::domain::models::FamilyMember;
use crate::storage::codec::{decode_enum, decode_optional_timestamp, decode_timestamp, encode_timestamp};
use crate::storage::connection::DbConnection;
use crate::storage::traits::MemberStorage;

const MEMBER_COLUMNS: &str =
    "id, family_id, user_id, display_name, email, role, status, invited_by, created_at, updated_at";

/// Repository for family membership rows
#[derive(Clone)]
pub struct MemberRepository {
    db: DbConnection,
}

impl MemberRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub(crate) async fn insert_member(tx: &mut Transaction<'_, Sqlite>, member: &FamilyMember) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO family_members
                (id, family_id, user_id, display_name, email, role, status, invited_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&member.id)
        .bind(&member.family_id)
        .bind(&member.user_id)
        .bind(&member.display_name)
        .bind(&member.email)
        .bind(member.role.as_str())
        .bind(member.status.as_str())
        .bind(&member.invited_by)
        .bind(encode_timestamp(&member.created_at))
        .bind(member.updated_at.as_ref().map(encode_timestamp))
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

pub(crate) fn member_from_row(row: &SqliteRow) -> Result<FamilyMember> {
    Ok(FamilyMember {
        id: row.try_get("id")?,
        family_id: row.try_get("family_id")?,
        user_id: row.try_get("user_id")?,
        display_name: row.try_get("display_name")?,
        email: row.try_get("email")?,
        role: decode_enum(&row.try_get::<String, _>("role")?)?,
        status: decode_enum(&row.try_get::<String, _>("status")?)?,
        invited_by: row.try_get("invited_by")?,
        created_at: decode_timestamp(&row.try_get::<String, _>("created_at")?)?,
        updated_at: decode_optional_timestamp(row.try_get("updated_at")?)?,
    })
}

#[async_trait]
impl MemberStorage for MemberRepository {
    async fn get_member(&self, member_id: &str) -> Result<Option<FamilyMember>> {
        let sql = format!("SELECT {} FROM family_members WHERE id = ?", MEMBER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(member_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(member_from_row).transpose()
    }

    async fn get_member_by_user(&self, family_id: &str, user_id: &str) -> Result<Option<FamilyMember>> {
        let sql = format!(
            "SELECT {} FROM family_members WHERE family_id = ? AND user_id = ?",
            MEMBER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(family_id)
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(member_from_row).transpose()
    }

    async fn is_active_member(&self, family_id: &str, user_id: &str) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT 1 FROM family_members
            WHERE family_id = ? AND user_id = ? AND status = 'ACTIVE'
            "#,
        )
        .bind(family_id)
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.is_some())
    }

    async fn list_active_members(&self, family_id: &str) -> Result<Vec<FamilyMember>> {
        let sql = format!(
            r#"
            SELECT {} FROM family_members
            WHERE family_id = ? AND status = 'ACTIVE'
            ORDER BY CASE role WHEN 'OWNER' THEN 0 WHEN 'PARENT' THEN 1 ELSE 2 END,
                     display_name ASC
            "#,
            MEMBER_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(family_id)
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(member_from_row).collect()
    }

    async fn find_active_member_by_email(&self, family_id: &str, email: &str) -> Result<Option<FamilyMember>> {
        let sql = format!(
            r#"
            SELECT {} FROM family_members
            WHERE family_id = ? AND lower(email) = lower(?) AND status = 'ACTIVE'
            "#,
            MEMBER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(family_id)
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(member_from_row).transpose()
    }

    async fn list_active_family_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT family_id FROM family_members
            WHERE user_id = ? AND status = 'ACTIVE'
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("family_id").map_err(Into::into))
            .collect()
    }

    async fn update_member(&self, member: &FamilyMember) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE family_members
            SET display_name = ?, email = ?, role = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&member.display_name)
        .bind(&member.email)
        .bind(member.role.as_str())
        .bind(member.status.as_str())
        .bind(member.updated_at.as_ref().map(encode_timestamp))
        .bind(&member.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Family, FamilyMemberRole, MembershipStatus};
    use crate::storage::traits::FamilyStorage;
    use crate::storage::FamilyRepository;
    use chrono::Utc;

    async fn setup_test() -> (MemberRepository, String) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let families = FamilyRepository::new(db.clone());
        let now = Utc::now();
        let family = Family {
            id: Family::generate_id(),
            name: "Home".to_string(),
            owner_id: "owner".to_string(),
            created_at: now,
            updated_at: None,
        };
        let owner = member(&family.id, "owner", "Zed", FamilyMemberRole::Owner);
        families.create_family_with_owner(&family, &owner).await.unwrap();
        (MemberRepository::new(db), family.id)
    }

    fn member(family_id: &str, user_id: &str, name: &str, role: FamilyMemberRole) -> FamilyMember {
        FamilyMember {
            id: FamilyMember::generate_id(),
            family_id: family_id.to_string(),
            user_id: user_id.to_string(),
            display_name: name.to_string(),
            email: Some(format!("{}@x.com", user_id)),
            role,
            status: MembershipStatus::Active,
            invited_by: Some("owner".to_string()),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    async fn add(repo: &MemberRepository, member: &FamilyMember) {
        let mut tx = repo.db.pool().begin().await.unwrap();
        MemberRepository::insert_member(&mut tx, member).await.unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_active_members_ordered_by_role_then_name() {
        let (repo, family_id) = setup_test().await;
        add(&repo, &member(&family_id, "c1", "Amy", FamilyMemberRole::Caregiver)).await;
        add(&repo, &member(&family_id, "p2", "Bob", FamilyMemberRole::Parent)).await;
        add(&repo, &member(&family_id, "p1", "Ann", FamilyMemberRole::Parent)).await;

        let names: Vec<String> = repo
            .list_active_members(&family_id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.display_name)
            .collect();

        assert_eq!(names, vec!["Zed", "Ann", "Bob", "Amy"]);
    }

    #[tokio::test]
    async fn test_inactive_member_is_not_active() {
        let (repo, family_id) = setup_test().await;
        let mut parent = member(&family_id, "p1", "Ann", FamilyMemberRole::Parent);
        add(&repo, &parent).await;

        parent.status = MembershipStatus::Inactive;
        parent.updated_at = Some(Utc::now());
        repo.update_member(&parent).await.unwrap();

        assert!(!repo.is_active_member(&family_id, "p1").await.unwrap());
        assert!(repo.find_active_member_by_email(&family_id, "P1@x.com").await.unwrap().is_none());
        assert_eq!(
            repo.get_member_by_user(&family_id, "p1").await.unwrap().map(|m| m.status),
            Some(MembershipStatus::Inactive)
        );
        assert_eq!(repo.list_active_family_ids("owner").await.unwrap(), vec![family_id]);
    }

    #[tokio::test]
    async fn test_member_unique_per_family_and_user() {
        let (repo, family_id) = setup_test().await;
        let mut tx = repo.db.pool().begin().await.unwrap();

        let duplicate = member(&family_id, "owner", "Again", FamilyMemberRole::Parent);
        assert!(MemberRepository::insert_member(&mut tx, &duplicate).await.is_err());
    }
}
