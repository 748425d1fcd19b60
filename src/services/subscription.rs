use leptos::logging::{log, warn};
use rusqlite::{params, OptionalExtension};
use std::sync::Arc;

use super::now;
use crate::db::Database;
use crate::errors::AppError;
use crate::models::subscription::{SessionUrl, FREE_REVIEW_LIMIT};
use crate::models::SubscriptionStatus;
use crate::sync::{SourceFetcher, SyncError};

/// Subscription state mirrored from the billing provider, plus the review
/// quota derived from it.
#[derive(Clone)]
pub struct SubscriptionService {
    db: Database,
    billing_url: Option<String>,
    fetcher: Arc<dyn SourceFetcher>,
}

impl SubscriptionService {
    pub fn new(db: Database, billing_url: Option<String>, fetcher: Arc<dyn SourceFetcher>) -> Self {
        Self {
            db,
            billing_url,
            fetcher,
        }
    }

    /// Users with no row are on the free tier.
    pub async fn status(&self, user_id: &str) -> Result<SubscriptionStatus, AppError> {
        let conn = self.db.conn().await;
        let status = conn
            .query_row(
                "SELECT subscribed, subscription_tier, subscription_end
                 FROM subscribers WHERE user_id = ?1",
                [user_id],
                |row| {
                    Ok(SubscriptionStatus {
                        subscribed: row.get(0)?,
                        subscription_tier: row.get(1)?,
                        subscription_end: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(status.unwrap_or_default())
    }

    pub async fn set_status(&self, user_id: &str, status: &SubscriptionStatus) -> Result<(), AppError> {
        let conn = self.db.conn().await;
        conn.execute(
            "INSERT INTO subscribers (user_id, subscribed, subscription_tier, subscription_end, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (user_id) DO UPDATE SET
                subscribed = excluded.subscribed,
                subscription_tier = excluded.subscription_tier,
                subscription_end = excluded.subscription_end,
                updated_at = excluded.updated_at",
            params![
                user_id,
                status.subscribed,
                status.subscription_tier,
                status.subscription_end,
                now()
            ],
        )?;
        log!(
            "[DB] Subscription for user {} set to subscribed={}",
            user_id,
            status.subscribed
        );
        Ok(())
    }

    /// Asks the billing provider for the user's current plan and stores the
    /// answer, so quota checks see upgrades and cancellations.
    pub async fn refresh(&self, user_id: &str) -> Result<SubscriptionStatus, AppError> {
        let url = self.billing_endpoint("status", user_id)?;
        let body = self.fetcher.fetch_text(&url).await.map_err(|e| {
            warn!("[API] Subscription refresh for user {} failed: {}", user_id, e);
            AppError::from(e)
        })?;
        let status: SubscriptionStatus = serde_json::from_str(&body).map_err(SyncError::from)?;
        self.set_status(user_id, &status).await?;
        Ok(status)
    }

    /// How many more reviews the user may add; `None` means unlimited.
    pub async fn remaining_quota(
        &self,
        user_id: &str,
        current_reviews: usize,
    ) -> Result<Option<usize>, AppError> {
        let status = self.status(user_id).await?;
        if status.is_active_at(now()) {
            return Ok(None);
        }
        Ok(Some(FREE_REVIEW_LIMIT.saturating_sub(current_reviews)))
    }

    pub async fn can_add_review(&self, user_id: &str, current_reviews: usize) -> Result<bool, AppError> {
        Ok(self
            .remaining_quota(user_id, current_reviews)
            .await?
            .map_or(true, |left| left > 0))
    }

    pub fn checkout_url(&self, user_id: &str) -> Result<SessionUrl, AppError> {
        self.session_url("checkout", user_id)
    }

    pub fn portal_url(&self, user_id: &str) -> Result<SessionUrl, AppError> {
        self.session_url("portal", user_id)
    }

    fn session_url(&self, kind: &str, user_id: &str) -> Result<SessionUrl, AppError> {
        Ok(SessionUrl {
            url: self.billing_endpoint(kind, user_id)?,
        })
    }

    fn billing_endpoint(&self, kind: &str, user_id: &str) -> Result<String, AppError> {
        let base = self
            .billing_url
            .as_deref()
            .ok_or_else(|| AppError::Internal("billing is not configured".into()))?;
        Ok(format!(
            "{}/{}?client_reference_id={}",
            base.trim_end_matches('/'),
            kind,
            urlencoding::encode(user_id)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::sync::Mutex;

    /// Answers every request with the same body and remembers the URLs asked for.
    struct BillingStub {
        body: Result<String, u16>,
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SourceFetcher for BillingStub {
        async fn fetch_text(&self, url: &str) -> Result<String, SyncError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.body.clone().map_err(SyncError::Status)
        }
    }

    fn stub(body: Result<&str, u16>) -> Arc<BillingStub> {
        Arc::new(BillingStub {
            body: body.map(String::from),
            requested: Mutex::new(Vec::new()),
        })
    }

    async fn service_with(billing_url: Option<&str>, fetcher: Arc<BillingStub>) -> SubscriptionService {
        let db = Database::in_memory().unwrap();
        db.create_schema().await.unwrap();
        SubscriptionService::new(db, billing_url.map(String::from), fetcher)
    }

    async fn service(billing_url: Option<&str>) -> SubscriptionService {
        service_with(billing_url, stub(Err(404))).await
    }

    #[tokio::test]
    async fn test_free_tier_quota() {
        let svc = service(None).await;
        assert_eq!(svc.status("owner").await.unwrap(), SubscriptionStatus::default());
        assert!(svc.can_add_review("owner", 9).await.unwrap());
        assert!(!svc.can_add_review("owner", 10).await.unwrap());
        assert_eq!(svc.remaining_quota("owner", 7).await.unwrap(), Some(3));
        assert_eq!(svc.remaining_quota("owner", 25).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_subscribers_are_unlimited_until_expiry() {
        let svc = service(None).await;
        let mut status = SubscriptionStatus {
            subscribed: true,
            subscription_tier: Some("pro".into()),
            subscription_end: Some(Utc::now() + Duration::days(30)),
        };
        svc.set_status("owner", &status).await.unwrap();
        assert!(svc.can_add_review("owner", 500).await.unwrap());
        assert_eq!(svc.remaining_quota("owner", 500).await.unwrap(), None);

        status.subscription_end = Some(Utc::now() - Duration::days(1));
        svc.set_status("owner", &status).await.unwrap();
        assert!(!svc.can_add_review("owner", 500).await.unwrap());
    }

    #[tokio::test]
    async fn test_billing_urls() {
        let svc = service(Some("https://billing.example.com/")).await;
        let checkout = svc.checkout_url("user 1").unwrap();
        assert_eq!(
            checkout.url,
            "https://billing.example.com/checkout?client_reference_id=user%201"
        );
        assert!(svc.portal_url("u").unwrap().url.contains("/portal?"));

        let unconfigured = service(None).await;
        assert!(matches!(unconfigured.checkout_url("u"), Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_refresh_mirrors_billing_state() {
        let billing = stub(Ok(r#"{"subscribed":true,"subscription_tier":"Pro","subscription_end":null}"#));
        let svc = service_with(Some("https://billing.example.com"), billing.clone()).await;
        assert!(!svc.can_add_review("owner", 10).await.unwrap());

        let status = svc.refresh("owner").await.unwrap();
        assert!(status.subscribed);
        assert_eq!(svc.status("owner").await.unwrap(), status);
        assert!(svc.can_add_review("owner", 10).await.unwrap());
        assert_eq!(
            billing.requested.lock().unwrap().as_slice(),
            ["https://billing.example.com/status?client_reference_id=owner"]
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_stored_state() {
        let svc = service_with(Some("https://billing.example.com"), stub(Err(503))).await;
        let paid = SubscriptionStatus {
            subscribed: true,
            subscription_tier: None,
            subscription_end: None,
        };
        svc.set_status("owner", &paid).await.unwrap();

        assert!(matches!(svc.refresh("owner").await, Err(AppError::Upstream(_))));
        assert_eq!(svc.status("owner").await.unwrap(), paid);

        let garbled = service_with(Some("https://billing.example.com"), stub(Ok("<html>"))).await;
        assert!(matches!(garbled.refresh("owner").await, Err(AppError::Upstream(_))));
        assert!(matches!(service(None).await.refresh("owner").await, Err(AppError::Internal(_))));
    }
}
