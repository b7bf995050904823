use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::{FamilyInvitation, FamilyMember};
use crate::storage::codec::{decode_enum, decode_optional_timestamp, decode_timestamp, encode_timestamp};
use crate::storage::connection::DbConnection;
use crate::storage::repositories::member_repository::member_from_row;
use crate::storage::traits::InvitationStorage;
use crate::storage::StorageError;

const INVITATION_COLUMNS: &str =
    "id, family_id, email, invited_by, role, status, message, token, expires_at, created_at, updated_at";

/// Repository for family invitations
#[derive(Clone)]
pub struct InvitationRepository {
    db: DbConnection,
}

impl InvitationRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    async fn fetch_one_where(&self, condition: &str, binds: &[&str]) -> Result<Option<FamilyInvitation>> {
        let sql = format!("SELECT {} FROM family_invitations WHERE {}", INVITATION_COLUMNS, condition);
        let mut query = sqlx::query(&sql);
        for value in binds {
            query = query.bind(*value);
        }
        let row = query.fetch_optional(self.db.pool()).await?;

        row.as_ref().map(invitation_from_row).transpose()
    }
}

fn invitation_from_row(row: &SqliteRow) -> Result<FamilyInvitation> {
    Ok(FamilyInvitation {
        id: row.try_get("id")?,
        family_id: row.try_get("family_id")?,
        email: row.try_get("email")?,
        invited_by: row.try_get("invited_by")?,
        role: decode_enum(&row.try_get::<String, _>("role")?)?,
        status: decode_enum(&row.try_get::<String, _>("status")?)?,
        message: row.try_get("message")?,
        token: row.try_get("token")?,
        expires_at: decode_timestamp(&row.try_get::<String, _>("expires_at")?)?,
        created_at: decode_timestamp(&row.try_get::<String, _>("created_at")?)?,
        updated_at: decode_optional_timestamp(row.try_get("updated_at")?)?,
    })
}

#[async_trait]
impl InvitationStorage for InvitationRepository {
    async fn store_invitation(&self, invitation: &FamilyInvitation) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO family_invitations
                (id, family_id, email, invited_by, role, status, message, token, expires_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&invitation.id)
        .bind(&invitation.family_id)
        .bind(&invitation.email)
        .bind(&invitation.invited_by)
        .bind(invitation.role.as_str())
        .bind(invitation.status.as_str())
        .bind(&invitation.message)
        .bind(&invitation.token)
        .bind(encode_timestamp(&invitation.expires_at))
        .bind(encode_timestamp(&invitation.created_at))
        .bind(invitation.updated_at.as_ref().map(encode_timestamp))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_invitation(&self, invitation_id: &str) -> Result<Option<FamilyInvitation>> {
        self.fetch_one_where("id = ?", &[invitation_id]).await
    }

    async fn get_invitation_by_token(&self, token: &str) -> Result<Option<FamilyInvitation>> {
        self.fetch_one_where("token = ?", &[token]).await
    }

    async fn find_pending_invitation(&self, family_id: &str, email: &str) -> Result<Option<FamilyInvitation>> {
        self.fetch_one_where(
            "family_id = ? AND email = ? AND status = 'PENDING' ORDER BY created_at DESC LIMIT 1",
            &[family_id, email],
        )
        .await
    }

    async fn list_pending_for_email(&self, email: &str, now: DateTime<Utc>) -> Result<Vec<FamilyInvitation>> {
        let sql = format!(
            r#"
            SELECT {} FROM family_invitations
            WHERE email = ? AND status = 'PENDING' AND expires_at > ?
            ORDER BY created_at DESC
            "#,
            INVITATION_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(email)
            .bind(encode_timestamp(&now))
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(invitation_from_row).collect()
    }

    async fn list_pending_for_family(&self, family_id: &str, now: DateTime<Utc>) -> Result<Vec<FamilyInvitation>> {
        let sql = format!(
            r#"
            SELECT {} FROM family_invitations
            WHERE family_id = ? AND status = 'PENDING' AND expires_at > ?
            ORDER BY created_at DESC
            "#,
            INVITATION_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(family_id)
            .bind(encode_timestamp(&now))
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(invitation_from_row).collect()
    }

    async fn update_invitation(&self, invitation: &FamilyInvitation) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE family_invitations
            SET invited_by = ?, role = ?, status = ?, message = ?, expires_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&invitation.invited_by)
        .bind(invitation.role.as_str())
        .bind(invitation.status.as_str())
        .bind(&invitation.message)
        .bind(encode_timestamp(&invitation.expires_at))
        .bind(invitation.updated_at.as_ref().map(encode_timestamp))
        .bind(&invitation.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn accept_invitation(
        &self,
        invitation: &FamilyInvitation,
        member: &FamilyMember,
    ) -> Result<FamilyMember> {
        let mut tx = self.db.pool().begin().await?;

        // Only one request may consume a given invitation
        let consumed = sqlx::query(
            r#"
            UPDATE family_invitations
            SET status = 'ACCEPTED', updated_at = ?
            WHERE id = ? AND status = 'PENDING'
            "#,
        )
        .bind(invitation.updated_at.as_ref().map(encode_timestamp))
        .bind(&invitation.id)
        .execute(&mut *tx)
        .await?;

        if consumed.rows_affected() == 0 {
            return Err(StorageError::InvitationNotPending {
                invitation_id: invitation.id.clone(),
            }
            .into());
        }

        // A returning member keeps their row id and display name
        sqlx::query(
            r#"
            INSERT INTO family_members
                (id, family_id, user_id, display_name, email, role, status, invited_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (family_id, user_id) DO UPDATE SET
                email = COALESCE(excluded.email, family_members.email),
                role = excluded.role,
                status = excluded.status,
                invited_by = excluded.invited_by,
                updated_at = excluded.created_at
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
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(
            r#"
            SELECT id, family_id, user_id, display_name, email, role, status, invited_by, created_at, updated_at
            FROM family_members
            WHERE family_id = ? AND user_id = ?
            "#,
        )
        .bind(&member.family_id)
        .bind(&member.user_id)
        .fetch_one(&mut *tx)
        .await?;
        let stored = member_from_row(&row)?;

        tx.commit().await?;
        Ok(stored)
    }
}
