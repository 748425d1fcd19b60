use leptos::logging::log;
use rusqlite::params;

use super::{new_id, now};
use crate::db::Database;
use crate::errors::AppError;
use crate::models::{Feedback, NewFeedback};
use crate::realtime::{ChangeFeed, ChangeKind, Table};
use crate::security::{contains_suspicious_pattern, sanitize_text};

#[derive(Debug, Clone)]
pub struct FeedbackService {
    db: Database,
    feed: ChangeFeed,
}

impl FeedbackService {
    pub fn new(db: Database, feed: ChangeFeed) -> Self {
        Self { db, feed }
    }

    pub async fn submit(&self, user_id: &str, feedback: &NewFeedback) -> Result<Feedback, AppError> {
        if !(1..=5).contains(&feedback.rating) {
            return Err(AppError::Validation(format!(
                "feedback rating {} outside 1-5",
                feedback.rating
            )));
        }

        let comment = match feedback.comment.as_deref() {
            Some(text) if contains_suspicious_pattern(text) => {
                return Err(AppError::Validation("suspicious feedback comment".into()));
            }
            Some(text) => Some(sanitize_text(text)).filter(|c| !c.is_empty()),
            None => None,
        };

        let record = Feedback {
            id: new_id(),
            user_id: user_id.to_string(),
            rating: feedback.rating,
            comment,
            created_at: now(),
        };

        {
            let conn = self.db.conn().await;
            conn.execute(
                "INSERT INTO feedback (id, user_id, rating, comment, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    record.user_id,
                    record.rating,
                    record.comment,
                    record.created_at
                ],
            )?;
        }
        log!("[DB] Feedback {} stored for user {}", record.id, user_id);
        self.feed.publish(Table::Feedback, ChangeKind::Insert, user_id, &record.id);

        Ok(record)
    }

    /// Newest first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<Feedback>, AppError> {
        let conn = self.db.conn().await;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, rating, comment, created_at FROM feedback
             WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([user_id], |row| {
            Ok(Feedback {
                id: row.get(0)?,
                user_id: row.get(1)?,
                rating: row.get(2)?,
                comment: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
