use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::error::Error;
use std::str::FromStr;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(url: &str) -> Result<Self, Box<dyn Error>> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.ensure_schema().await?;

        Ok(db)
    }

    /// Creates the relational schema and supporting indexes. Idempotent,
    /// runs on every startup.
    async fn ensure_schema(&self) -> Result<(), Box<dyn Error>> {
        log::info!("🔧 Ensuring database schema...");

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                email           TEXT PRIMARY KEY,
                name            TEXT,
                hashed_password TEXT NOT NULL,
                points          INTEGER NOT NULL DEFAULT 0,
                last_redeemed   TEXT
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS meetings (
                id         TEXT PRIMARY KEY,
                start_time TEXT NOT NULL,
                end_time   TEXT NOT NULL,
                location   TEXT NOT NULL,
                subject    TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS participants (
                user_id    TEXT NOT NULL REFERENCES users (email),
                meeting_id TEXT NOT NULL REFERENCES meetings (id),
                joined_at  TEXT NOT NULL,
                PRIMARY KEY (user_id, meeting_id)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS interests (
                user_id TEXT NOT NULL REFERENCES users (email),
                subject TEXT NOT NULL,
                PRIMARY KEY (user_id, subject)
            )",
        )
        .execute(&self.pool)
        .await?;

        // Capacity checks and known-people queries scan by meeting;
        // similarity queries scan by subject.
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_participants_meeting ON participants (meeting_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_interests_subject ON interests (subject)")
            .execute(&self.pool)
            .await?;

        log::info!("✅ Database schema ready");

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
impl Database {
    /// In-memory database for unit tests. Single connection so every
    /// query sees the same memory store.
    pub async fn in_memory() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("valid in-memory url")
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("failed to open in-memory database");

        let db = Self { pool };
        db.ensure_schema().await.expect("failed to create schema");
        db
    }
}
