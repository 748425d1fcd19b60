use crate::models::Platform;
use leptos::logging::log;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, Error};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Tables exported by the backup job, in dependency order.
pub const USER_TABLES: [&str; 5] = [
    "reviews",
    "pricing",
    "user_integrations",
    "feedback",
    "subscribers",
];

// Shared handle to the SQLite connection; cloning shares the same connection.
#[derive(Debug, Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(db_path: &str) -> Result<Self, Error> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        log!("[DB] Connection established at: {}", db_path);
        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, Error> {
        Self::new(":memory:")
    }

    pub async fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().await
    }

    pub async fn create_schema(&self) -> Result<(), Error> {
        let conn = self.conn.lock().await;

        // 1. Reviews
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reviews (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                platform TEXT NOT NULL,
                guest_name TEXT NOT NULL,
                rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                review_text TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL,
                reply_text TEXT,
                replied INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_reviews_user_date ON reviews (user_id, date DESC);",
        )
        .map_err(|e| {
            log!("[DB] Failed creating reviews table: {}", e);
            e
        })?;

        // 2. Pricing, one row per property per day
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS pricing (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                platform TEXT NOT NULL,
                property_id TEXT NOT NULL DEFAULT '',
                price REAL,
                currency TEXT NOT NULL DEFAULT 'EUR',
                date TEXT NOT NULL,
                UNIQUE (user_id, platform, property_id, date)
            );",
        )
        .map_err(|e| {
            log!("[DB] Failed creating pricing table: {}", e);
            e
        })?;

        // 3. Integrations, credentials stored obfuscated
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS user_integrations (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                platform TEXT NOT NULL,
                credentials TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                last_sync TEXT,
                updated_at TEXT NOT NULL,
                UNIQUE (user_id, platform)
            );",
        )
        .map_err(|e| {
            log!("[DB] Failed creating user_integrations table: {}", e);
            e
        })?;

        // 4. Product feedback
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS feedback (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                comment TEXT,
                created_at TEXT NOT NULL
            );",
        )
        .map_err(|e| {
            log!("[DB] Failed creating feedback table: {}", e);
            e
        })?;

        // 5. Subscription state mirrored from billing
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS subscribers (
                user_id TEXT PRIMARY KEY,
                subscribed INTEGER NOT NULL DEFAULT 0,
                subscription_tier TEXT,
                subscription_end TEXT,
                updated_at TEXT NOT NULL
            );",
        )
        .map_err(|e| {
            log!("[DB] Failed creating subscribers table: {}", e);
            e
        })?;

        // 6. Backup log
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS backup_logs (
                backup_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                tables_backed_up TEXT NOT NULL,
                total_records INTEGER NOT NULL,
                status TEXT NOT NULL,
                PRIMARY KEY (backup_id, user_id)
            );",
        )
        .map_err(|e| {
            log!("[DB] Failed creating backup_logs table: {}", e);
            e
        })?;

        Ok(())
    }
}

impl ToSql for Platform {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Platform {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
