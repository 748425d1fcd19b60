use leptos::logging::{error, log};
use rusqlite::{params, Row};

use super::{new_id, now};
use crate::db::Database;
use crate::errors::AppError;
use crate::models::{Integration, IntegrationCredentials, Platform};
use crate::realtime::{ChangeFeed, ChangeKind, Table};
use crate::security::{deobfuscate, obfuscate, sanitize_text};

const INTEGRATION_COLUMNS: &str = "id, user_id, platform, credentials, is_active, last_sync, updated_at";

fn decode_credentials(stored: &str) -> IntegrationCredentials {
    let decoded = match deobfuscate(stored) {
        Ok(json) => json,
        Err(e) => {
            error!("[DB] Could not decode stored credentials: {}", e);
            return IntegrationCredentials::new();
        }
    };
    serde_json::from_str(&decoded).unwrap_or_else(|e| {
        error!("[DB] Stored credentials are not valid JSON: {}", e);
        IntegrationCredentials::new()
    })
}

fn map_integration(row: &Row<'_>) -> rusqlite::Result<Integration> {
    let stored: String = row.get(3)?;
    Ok(Integration {
        id: row.get(0)?,
        user_id: row.get(1)?,
        platform: row.get(2)?,
        credentials: decode_credentials(&stored),
        is_active: row.get(4)?,
        last_sync: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

#[derive(Debug, Clone)]
pub struct IntegrationService {
    db: Database,
    feed: ChangeFeed,
}

impl IntegrationService {
    pub fn new(db: Database, feed: ChangeFeed) -> Self {
        Self { db, feed }
    }

    /// Creates or replaces the credentials for one platform. Saving always
    /// reactivates the integration.
    pub async fn store_credentials(
        &self,
        user_id: &str,
        platform: Platform,
        credentials: &IntegrationCredentials,
    ) -> Result<Integration, AppError> {
        let cleaned: IntegrationCredentials = credentials
            .iter()
            .map(|(k, v)| (sanitize_text(k), sanitize_text(v)))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        if cleaned.is_empty() {
            return Err(AppError::Validation("no credentials supplied".into()));
        }

        let json = serde_json::to_string(&cleaned).map_err(|e| AppError::Internal(e.to_string()))?;
        let stored = obfuscate(&json);

        {
            let conn = self.db.conn().await;
            conn.execute(
                "INSERT INTO user_integrations (id, user_id, platform, credentials, is_active, updated_at)
                 VALUES (?1, ?2, ?3, ?4, 1, ?5)
                 ON CONFLICT (user_id, platform) DO UPDATE SET
                    credentials = excluded.credentials,
                    is_active = 1,
                    updated_at = excluded.updated_at",
                params![new_id(), user_id, platform, stored, now()],
            )?;
        }
        log!("[DB] Stored {} credentials for user {}", platform, user_id);

        let integration = self.get(user_id, platform).await?;
        self.feed
            .publish(Table::UserIntegrations, ChangeKind::Update, user_id, &integration.id);
        Ok(integration)
    }

    pub async fn get(&self, user_id: &str, platform: Platform) -> Result<Integration, AppError> {
        let conn = self.db.conn().await;
        conn.query_row(
            &format!(
                "SELECT {INTEGRATION_COLUMNS} FROM user_integrations
                 WHERE user_id = ?1 AND platform = ?2"
            ),
            params![user_id, platform],
            map_integration,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                AppError::NotFound(format!("{platform} integration"))
            }
            other => other.into(),
        })
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Integration>, AppError> {
        let conn = self.db.conn().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {INTEGRATION_COLUMNS} FROM user_integrations WHERE user_id = ?1 ORDER BY platform"
        ))?;
        let rows = stmt.query_map([user_id], map_integration)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Every active integration across all users, for the sync job.
    pub async fn list_active_all(&self) -> Result<Vec<Integration>, AppError> {
        let conn = self.db.conn().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {INTEGRATION_COLUMNS} FROM user_integrations WHERE is_active = 1"
        ))?;
        let rows = stmt.query_map([], map_integration)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub async fn set_active(
        &self,
        user_id: &str,
        platform: Platform,
        active: bool,
    ) -> Result<Integration, AppError> {
        let updated = {
            let conn = self.db.conn().await;
            conn.execute(
                "UPDATE user_integrations SET is_active = ?1, updated_at = ?2
                 WHERE user_id = ?3 AND platform = ?4",
                params![active, now(), user_id, platform],
            )?
        };
        if updated == 0 {
            return Err(AppError::NotFound(format!("{platform} integration")));
        }

        let integration = self.get(user_id, platform).await?;
        self.feed
            .publish(Table::UserIntegrations, ChangeKind::Update, user_id, &integration.id);
        Ok(integration)
    }

    pub async fn mark_synced(&self, integration: &Integration) -> Result<(), AppError> {
        let stamp = now();
        {
            let conn = self.db.conn().await;
            conn.execute(
                "UPDATE user_integrations SET last_sync = ?1, updated_at = ?1 WHERE id = ?2",
                params![stamp, integration.id],
            )?;
        }
        self.feed.publish(
            Table::UserIntegrations,
            ChangeKind::Update,
            &integration.user_id,
            &integration.id,
        );
        Ok(())
    }
}
