use chrono::{Duration, Utc};
use leptos::logging::log;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{new_id, now};
use crate::db::Database;
use crate::errors::AppError;
use crate::models::{NewReview, Platform, Review};
use crate::realtime::{ChangeFeed, ChangeKind, Table};
use crate::security::{contains_suspicious_pattern, sanitize_text};

const REVIEW_COLUMNS: &str = "id, user_id, platform, guest_name, rating, review_text, date, \
                              reply_text, replied, created_at, updated_at";

fn map_review(row: &Row<'_>) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get(0)?,
        user_id: row.get(1)?,
        platform: row.get(2)?,
        guest_name: row.get(3)?,
        rating: row.get(4)?,
        review_text: row.get(5)?,
        date: row.get(6)?,
        reply_text: row.get(7)?,
        replied: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn insert_row(conn: &Connection, user_id: &str, id: &str, review: &NewReview) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO reviews (id, user_id, platform, guest_name, rating, review_text,
                              date, reply_text, replied, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, 0, ?8, ?8)",
        params![
            id,
            user_id,
            review.platform,
            review.guest_name,
            review.rating,
            review.review_text,
            review.date,
            now()
        ],
    )?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct ReviewsService {
    db: Database,
    feed: ChangeFeed,
}

impl ReviewsService {
    pub fn new(db: Database, feed: ChangeFeed) -> Self {
        Self { db, feed }
    }

    /// Newest first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<Review>, AppError> {
        let conn = self.db.conn().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = ?1
             ORDER BY date DESC, created_at DESC"
        ))?;
        let reviews = stmt
            .query_map([user_id], map_review)?
            .collect::<Result<Vec<_>, _>>()?;
        log!("[DB] Fetched {} reviews for user {}", reviews.len(), user_id);
        Ok(reviews)
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<Review, AppError> {
        let conn = self.db.conn().await;
        conn.query_row(
            &format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?1 AND user_id = ?2"),
            [id, user_id],
            map_review,
        )
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("review {id}")))
    }

    pub async fn count(&self, user_id: &str) -> Result<usize, AppError> {
        let conn = self.db.conn().await;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM reviews WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn clean(review: &NewReview) -> Result<NewReview, AppError> {
        if !(1..=5).contains(&review.rating) {
            return Err(AppError::Validation(format!(
                "rating {} outside 1-5",
                review.rating
            )));
        }
        if contains_suspicious_pattern(&review.guest_name)
            || contains_suspicious_pattern(&review.review_text)
        {
            return Err(AppError::Validation("suspicious review content".into()));
        }

        let guest_name = sanitize_text(&review.guest_name);
        if guest_name.is_empty() {
            return Err(AppError::Validation("guest name is required".into()));
        }

        Ok(NewReview {
            guest_name,
            review_text: sanitize_text(&review.review_text),
            ..review.clone()
        })
    }

    pub async fn create(&self, user_id: &str, review: &NewReview) -> Result<Review, AppError> {
        let review = Self::clean(review)?;
        let id = new_id();
        {
            let conn = self.db.conn().await;
            insert_row(&conn, user_id, &id, &review)?;
        }
        log!("[DB] Created {} review {} for user {}", review.platform, id, user_id);
        self.feed.publish(Table::Reviews, ChangeKind::Insert, user_id, &id);

        self.get(user_id, &id).await
    }

    /// Inserts unless the same guest already left the same text on the same
    /// platform. Returns whether a row was written.
    ///
    /// The lookup and the insert share one connection guard, so overlapping
    /// syncs cannot both write the same review.
    pub async fn insert_if_absent(&self, user_id: &str, review: &NewReview) -> Result<bool, AppError> {
        let review = Self::clean(review)?;
        let id = new_id();
        {
            let conn = self.db.conn().await;
            let exists = conn
                .query_row(
                    "SELECT id FROM reviews
                     WHERE user_id = ?1 AND platform = ?2 AND guest_name = ?3 AND review_text = ?4",
                    params![user_id, review.platform, review.guest_name, review.review_text],
                    |row| row.get::<_, String>(0),
                )
                .optional()?
                .is_some();
            if exists {
                return Ok(false);
            }
            insert_row(&conn, user_id, &id, &review)?;
        }
        log!("[DB] Created {} review {} for user {}", review.platform, id, user_id);
        self.feed.publish(Table::Reviews, ChangeKind::Insert, user_id, &id);
        Ok(true)
    }

    /// Stores the reply and marks the review as answered.
    pub async fn reply(&self, user_id: &str, id: &str, reply_text: &str) -> Result<Review, AppError> {
        let updated = {
            let conn = self.db.conn().await;
            conn.execute(
                "UPDATE reviews SET reply_text = ?1, replied = 1, updated_at = ?2
                 WHERE id = ?3 AND user_id = ?4",
                params![reply_text, now(), id, user_id],
            )?
        };

        if updated == 0 {
            return Err(AppError::NotFound(format!("review {id}")));
        }
        log!("[DB] Reply stored for review {}", id);
        self.feed.publish(Table::Reviews, ChangeKind::Update, user_id, id);

        self.get(user_id, id).await
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<(), AppError> {
        let deleted = {
            let conn = self.db.conn().await;
            conn.execute(
                "DELETE FROM reviews WHERE id = ?1 AND user_id = ?2",
                [id, user_id],
            )?
        };

        if deleted == 0 {
            return Err(AppError::NotFound(format!("review {id}")));
        }
        log!("[DB] Review deleted: {}", id);
        self.feed.publish(Table::Reviews, ChangeKind::Delete, user_id, id);
        Ok(())
    }

    /// Gives a new workspace something to look at. Does nothing once the
    /// user has any review.
    pub async fn seed_sample(&self, user_id: &str) -> Result<usize, AppError> {
        if self.count(user_id).await? > 0 {
            return Ok(0);
        }

        let today = Utc::now().date_naive();
        let samples = [
            (Platform::Booking, "Sarah Johnson", 5, "Amazing stay! The apartment was spotless and the location was perfect.", 3),
            (Platform::Airbnb, "Michael Chen", 4, "Great place overall. Clean and comfortable, only the WiFi was a little slow.", 6),
            (Platform::Google, "Emma Wilson", 5, "Exceeded all expectations. The host went above and beyond for us.", 8),
            (Platform::Tripadvisor, "David Brown", 3, "Decent stay but the bed was uncomfortable and the kitchen needs updating.", 10),
            (Platform::Booking, "Lisa Garcia", 2, "Check-in took far too long and the room was not ready on arrival.", 14),
        ];

        let mut inserted = 0;
        for (platform, guest, rating, text, days_ago) in samples {
            let review = NewReview {
                platform,
                guest_name: guest.to_string(),
                rating,
                review_text: text.to_string(),
                date: today - Duration::days(days_ago),
            };
            self.create(user_id, &review).await?;
            inserted += 1;
        }
        log!("[DB] Seeded {} sample reviews for user {}", inserted, user_id);
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    async fn service() -> ReviewsService {
        let db = Database::in_memory().unwrap();
        db.create_schema().await.unwrap();
        ReviewsService::new(db, ChangeFeed::new())
    }

    fn new_review(guest: &str, day: u32) -> NewReview {
        NewReview {
            platform: Platform::Booking,
            guest_name: guest.into(),
            rating: 4,
            review_text: "Nice and quiet apartment".into(),
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_full_review_lifecycle() {
        let svc = service().await;

        let created = svc.create("owner", &new_review("Maria", 1)).await.unwrap();
        assert!(!created.replied);
        assert_eq!(created.reply_text, None);

        let replied = svc.reply("owner", &created.id, "Thank you Maria!").await.unwrap();
        assert!(replied.replied);
        assert_eq!(replied.reply_text.as_deref(), Some("Thank you Maria!"));

        svc.delete("owner", &created.id).await.unwrap();
        assert!(svc.list("owner").await.unwrap().is_empty());
        assert!(matches!(
            svc.delete("owner", &created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rows_are_scoped_to_owner() {
        let svc = service().await;
        let mine = svc.create("alice", &new_review("Maria", 1)).await.unwrap();
        svc.create("bob", &new_review("John", 2)).await.unwrap();

        assert_eq!(svc.list("alice").await.unwrap().len(), 1);
        assert!(matches!(svc.get("bob", &mine.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            svc.reply("bob", &mine.id, "hijack").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let svc = service().await;
        svc.create("owner", &new_review("Older", 1)).await.unwrap();
        svc.create("owner", &new_review("Newer", 20)).await.unwrap();
        let names: Vec<_> = svc
            .list("owner")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.guest_name)
            .collect();
        assert_eq!(names, vec!["Newer", "Older"]);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let svc = service().await;
        let mut bad = new_review("Maria", 1);
        bad.rating = 6;
        assert!(matches!(svc.create("owner", &bad).await, Err(AppError::Validation(_))));

        let mut hostile = new_review("Maria", 1);
        hostile.review_text = "<script>alert(1)</script>".into();
        assert!(matches!(svc.create("owner", &hostile).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_insert_if_absent_is_idempotent() {
        let svc = service().await;
        let review = new_review("Maria", 1);
        assert!(svc.insert_if_absent("owner", &review).await.unwrap());
        assert!(!svc.insert_if_absent("owner", &review).await.unwrap());
        assert_eq!(svc.count("owner").await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_inserts_write_one_row() {
        let svc = service().await;
        let review = new_review("Maria", 1);
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let svc = svc.clone();
                let review = review.clone();
                tokio::spawn(async move { svc.insert_if_absent("owner", &review).await.unwrap() })
            })
            .collect();

        let mut written = 0;
        for task in tasks {
            if task.await.unwrap() {
                written += 1;
            }
        }
        assert_eq!(written, 1);
        assert_eq!(svc.count("owner").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_seed_sample_only_for_empty_workspace() {
        let svc = service().await;
        assert_eq!(svc.seed_sample("owner").await.unwrap(), 5);
        assert_eq!(svc.seed_sample("owner").await.unwrap(), 0);
        assert_eq!(svc.count("owner").await.unwrap(), 5);
    }
}
