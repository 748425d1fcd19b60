//! JSON export of everything one user owns, with a summary row written to
//! `backup_logs`. Credentials stay in their stored, obfuscated form.
use chrono::{DateTime, Utc};
use leptos::logging::{log, warn};
use rusqlite::types::ValueRef;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::db::{Database, USER_TABLES};
use crate::errors::AppError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BackupMetadata {
    pub backup_id: String,
    pub timestamp: DateTime<Utc>,
    pub tables: Vec<String>,
    pub record_counts: BTreeMap<String, usize>,
    pub backup_size_estimate: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Backup {
    pub backup_id: String,
    pub created_at: DateTime<Utc>,
    pub metadata: BackupMetadata,
    pub data: BTreeMap<String, Vec<Value>>,
}

impl Backup {
    pub fn total_records(&self) -> usize {
        self.metadata.record_counts.values().sum()
    }
}

fn column_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(t) => Value::from(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::from(b.to_vec()),
    }
}

fn row_to_json(row: &Row<'_>, columns: &[String]) -> rusqlite::Result<Value> {
    let mut object = Map::new();
    for (i, name) in columns.iter().enumerate() {
        object.insert(name.clone(), column_value(row.get_ref(i)?));
    }
    Ok(Value::Object(object))
}

#[derive(Debug, Clone)]
pub struct BackupService {
    db: Database,
}

impl BackupService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn export(&self, user_id: &str) -> Result<Backup, AppError> {
        log!("[BACKUP] Starting backup for user {}", user_id);
        let now = Utc::now();
        let backup_id = format!("backup_{}", now.timestamp_millis());

        let mut data = BTreeMap::new();
        let mut record_counts = BTreeMap::new();
        {
            let conn = self.db.conn().await;
            for table in USER_TABLES {
                let mut stmt = conn.prepare(&format!("SELECT * FROM {table} WHERE user_id = ?1"))?;
                let columns: Vec<String> =
                    stmt.column_names().into_iter().map(String::from).collect();
                let rows = stmt
                    .query_map([user_id], |row| row_to_json(row, &columns))?
                    .collect::<Result<Vec<_>, _>>()?;

                log!("[BACKUP] Backed up {}: {} records", table, rows.len());
                record_counts.insert(table.to_string(), rows.len());
                data.insert(table.to_string(), rows);
            }
        }

        let total: usize = record_counts.values().sum();
        let tables: Vec<String> = USER_TABLES.iter().map(|t| t.to_string()).collect();
        let metadata = BackupMetadata {
            backup_id: backup_id.clone(),
            timestamp: now,
            tables: tables.clone(),
            record_counts,
            backup_size_estimate: format!("{total} total records"),
        };

        // The export itself succeeded; a missing log row is not fatal.
        if let Err(e) = self.record(&backup_id, user_id, now, &tables, total).await {
            warn!("[BACKUP] Could not record backup {}: {}", backup_id, e);
        }

        log!("[BACKUP] Backup {} completed with {} records", backup_id, total);
        Ok(Backup {
            backup_id,
            created_at: now,
            metadata,
            data,
        })
    }

    /// Ids are millisecond stamps, so the log is keyed by id and owner
    /// together; users backing up at the same instant each keep their row.
    async fn record(
        &self,
        backup_id: &str,
        user_id: &str,
        at: DateTime<Utc>,
        tables: &[String],
        total: usize,
    ) -> rusqlite::Result<()> {
        let conn = self.db.conn().await;
        conn.execute(
            "INSERT INTO backup_logs (backup_id, user_id, timestamp, tables_backed_up, total_records, status)
             VALUES (?1, ?2, ?3, ?4, ?5, 'completed')",
            params![backup_id, user_id, at, tables.join(","), total as i64],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewFeedback, NewReview, Platform};
    use crate::realtime::ChangeFeed;
    use crate::services::{FeedbackService, ReviewsService};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_backup_exports_only_owner_rows() {
        let db = Database::in_memory().unwrap();
        db.create_schema().await.unwrap();
        let feed = ChangeFeed::new();
        let reviews = ReviewsService::new(db.clone(), feed.clone());
        let feedback = FeedbackService::new(db.clone(), feed);

        let review = NewReview {
            platform: Platform::Airbnb,
            guest_name: "Maria".into(),
            rating: 5,
            review_text: "Lovely terrace".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
        };
        reviews.create("owner", &review).await.unwrap();
        reviews.create("owner", &NewReview { guest_name: "Nick".into(), ..review.clone() }).await.unwrap();
        reviews.create("stranger", &review).await.unwrap();
        feedback
            .submit("owner", &NewFeedback { rating: 4, comment: None })
            .await
            .unwrap();

        let backup = BackupService::new(db.clone()).export("owner").await.unwrap();
        assert!(backup.backup_id.starts_with("backup_"));
        assert_eq!(backup.metadata.record_counts["reviews"], 2);
        assert_eq!(backup.metadata.record_counts["feedback"], 1);
        assert_eq!(backup.total_records(), 3);
        assert_eq!(backup.metadata.backup_size_estimate, "3 total records");
        assert_eq!(backup.data["reviews"][0]["user_id"], "owner");

        let conn = db.conn().await;
        let logged: i64 = conn
            .query_row(
                "SELECT total_records FROM backup_logs WHERE backup_id = ?1",
                [&backup.backup_id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(logged, 3);
    }

    #[tokio::test]
    async fn test_same_instant_backups_are_logged_per_user() {
        let db = Database::in_memory().unwrap();
        db.create_schema().await.unwrap();
        let service = BackupService::new(db.clone());

        let backup = service.export("owner").await.unwrap();
        service
            .record(&backup.backup_id, "stranger", backup.created_at, &backup.metadata.tables, 0)
            .await
            .unwrap();
        assert!(service
            .record(&backup.backup_id, "owner", backup.created_at, &backup.metadata.tables, 0)
            .await
            .is_err());

        let conn = db.conn().await;
        let users: Vec<String> = conn
            .prepare("SELECT user_id FROM backup_logs WHERE backup_id = ?1 ORDER BY user_id")
            .unwrap()
            .query_map([&backup.backup_id], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(users, vec!["owner", "stranger"]);
    }
}
