use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;
use tracing::info;

// The database URL used when no configuration overrides it
pub const DEFAULT_DATABASE_URL: &str = "sqlite:baby_tracker.db";

/// DbConnection owns the pool shared by every repository
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if needed) the database at `url` and make sure the schema exists
    pub async fn new(url: &str, max_connections: u32) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating database: {}", url);
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(url)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Private in-memory database for tests.
    ///
    /// A single long-lived connection keeps the memory database alive for the
    /// life of the pool.
    pub async fn init_test() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS families (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_families_owner_id
            ON families(owner_id);
            "#,
        )
        .execute(pool)
        .await?;

        // One row per (family, user); removal is a status change
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS family_members (
                id TEXT PRIMARY KEY,
                family_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                display_name TEXT NOT NULL,
                email TEXT,
                role TEXT NOT NULL,
                status TEXT NOT NULL,
                invited_by TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT,
                UNIQUE (family_id, user_id),
                FOREIGN KEY (family_id) REFERENCES families (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_family_members_user_id
            ON family_members(user_id, status);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS babies (
                id TEXT PRIMARY KEY,
                family_id TEXT NOT NULL,
                name TEXT NOT NULL,
                birth_date TEXT,
                gender TEXT NOT NULL,
                notes TEXT,
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT,
                FOREIGN KEY (family_id) REFERENCES families (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_babies_family_id
            ON babies(family_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS family_invitations (
                id TEXT PRIMARY KEY,
                family_id TEXT NOT NULL,
                email TEXT NOT NULL,
                invited_by TEXT NOT NULL,
                role TEXT NOT NULL,
                status TEXT NOT NULL,
                message TEXT,
                token TEXT NOT NULL UNIQUE,
                expires_at TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT,
                FOREIGN KEY (family_id) REFERENCES families (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_family_invitations_email
            ON family_invitations(email, status);
            "#,
        )
        .execute(pool)
        .await?;

        // baby_id is NULL only for rows recorded before families existed
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS feed_entries (
                id TEXT PRIMARY KEY,
                baby_id TEXT,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                feed_type TEXT NOT NULL,
                starting_breast TEXT,
                temperature REAL,
                did_pee BOOLEAN NOT NULL DEFAULT FALSE,
                did_poo BOOLEAN NOT NULL DEFAULT FALSE,
                did_throw_up BOOLEAN NOT NULL DEFAULT FALSE,
                comment TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT,
                FOREIGN KEY (baby_id) REFERENCES babies (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_feed_entries_baby_date
            ON feed_entries(baby_id, date, time);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sleep_sessions (
                id TEXT PRIMARY KEY,
                baby_id TEXT,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT,
                duration_minutes INTEGER,
                is_active BOOLEAN NOT NULL DEFAULT FALSE,
                comment TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT,
                FOREIGN KEY (baby_id) REFERENCES babies (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_sleep_sessions_baby_date
            ON sleep_sessions(baby_id, date, start_time);
            "#,
        )
        .execute(pool)
        .await?;

        // At most one active session per baby
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_sleep_sessions_one_active
            ON sleep_sessions(baby_id) WHERE is_active = 1;
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_setup_is_idempotent() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");

        DbConnection::setup_schema(db.pool())
            .await
            .expect("Second schema setup should succeed");

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|(name,)| name.as_str()).collect();

        assert_eq!(
            names,
            vec!["babies", "families", "family_invitations", "family_members", "feed_entries", "sleep_sessions"]
        );
    }

    #[tokio::test]
    async fn test_file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("tracker.db").display());

        let db = DbConnection::new(&url, 2).await.expect("Failed to open file database");

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM families")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
