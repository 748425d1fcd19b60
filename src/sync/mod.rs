//! Daily scrape-and-sync over every active integration.
//!
//! Integrations are processed one after another. A failure is logged and
//! counted, never retried, and never stops the rest of the run.
pub mod google;
pub mod scrape;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use leptos::logging::{error, log, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::errors::AppError;
use crate::models::pricing::DEFAULT_CURRENCY;
use crate::models::{Integration, NewPricingEntry, NewReview, Platform};
use crate::services::{IntegrationService, PricingService, ReviewsService};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{0} is not configured")]
    MissingApiKey(&'static str),

    #[error("missing {0}")]
    MissingCredential(&'static str),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("Google API Error: {status} - {message}")]
    Google { status: String, message: String },

    #[error("invalid response body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::MissingApiKey(_) | SyncError::MissingCredential(_) => {
                AppError::Validation(err.to_string())
            }
            SyncError::Store(inner) => inner,
            other => AppError::Upstream(other.to_string()),
        }
    }
}

/// Fetches a remote document as text.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, SyncError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("[SYNC] Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, SyncError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub processed: usize,
    pub failed: usize,
    pub prices_updated: usize,
    pub reviews_added: usize,
}

/// What one integration yielded in a run.
#[derive(Debug, Default)]
struct SourceData {
    price: Option<NewPricingEntry>,
    reviews: Vec<NewReview>,
}

#[derive(Clone)]
pub struct DailySync {
    integrations: IntegrationService,
    reviews: ReviewsService,
    pricing: PricingService,
    fetcher: Arc<dyn SourceFetcher>,
    scraper_api_key: Option<String>,
    google_api_key: Option<String>,
}

impl DailySync {
    pub fn new(
        integrations: IntegrationService,
        reviews: ReviewsService,
        pricing: PricingService,
        fetcher: Arc<dyn SourceFetcher>,
        scraper_api_key: Option<String>,
        google_api_key: Option<String>,
    ) -> Self {
        Self {
            integrations,
            reviews,
            pricing,
            fetcher,
            scraper_api_key,
            google_api_key,
        }
    }

    pub fn fetcher(&self) -> &dyn SourceFetcher {
        self.fetcher.as_ref()
    }

    pub async fn run(&self) -> Result<SyncReport, AppError> {
        log!("[SYNC] Starting daily data sync...");
        let integrations = self.integrations.list_active_all().await?;
        let mut report = SyncReport::default();

        for integration in &integrations {
            match self.sync_one(integration).await {
                Ok((price_updated, added)) => {
                    report.processed += 1;
                    report.prices_updated += usize::from(price_updated);
                    report.reviews_added += added;
                }
                Err(e) => {
                    error!(
                        "[SYNC] Error syncing data for integration {}: {}",
                        integration.id, e
                    );
                    report.failed += 1;
                }
            }
        }

        log!(
            "[SYNC] Daily data sync completed: {} processed, {} failed, {} prices updated, {} reviews added",
            report.processed,
            report.failed,
            report.prices_updated,
            report.reviews_added
        );
        Ok(report)
    }

    async fn sync_one(&self, integration: &Integration) -> Result<(bool, usize), SyncError> {
        let today = Utc::now().date_naive();
        let data = self.fetch_source(integration, today).await?;
        let user_id = integration.user_id.as_str();

        let price_updated = match &data.price {
            Some(entry) => self.pricing.record_if_changed(user_id, entry).await?,
            None => false,
        };

        let mut added = 0;
        for review in &data.reviews {
            match self.reviews.insert_if_absent(user_id, review).await {
                Ok(true) => {
                    log!("[SYNC] Added new {} review for user {}", review.platform, user_id);
                    added += 1;
                }
                Ok(false) => {}
                Err(AppError::Validation(reason)) => {
                    warn!("[SYNC] Skipping {} review: {}", review.platform, reason);
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.integrations.mark_synced(integration).await?;
        Ok((price_updated, added))
    }

    async fn fetch_source(
        &self,
        integration: &Integration,
        today: NaiveDate,
    ) -> Result<SourceData, SyncError> {
        match integration.platform {
            Platform::Google => {
                let Some(place_id) = integration.credential("place_id") else {
                    return Ok(SourceData::default());
                };
                let api_key = self
                    .google_api_key
                    .as_deref()
                    .ok_or(SyncError::MissingApiKey("GOOGLE_PLACES_API_KEY"))?;
                let reviews =
                    google::fetch_place_reviews(self.fetcher(), api_key, place_id, today).await?;
                Ok(SourceData { price: None, reviews })
            }
            Platform::Booking | Platform::Airbnb => {
                let Some(property_id) = integration.credential("property_id") else {
                    return Ok(SourceData::default());
                };
                let api_key = self
                    .scraper_api_key
                    .as_deref()
                    .ok_or(SyncError::MissingApiKey("SCRAPERAPI_KEY"))?;

                let (page, extract): (String, fn(&str) -> Option<f64>) = match integration.platform {
                    Platform::Booking => (scrape::booking_url(property_id), scrape::extract_booking_price),
                    _ => (scrape::airbnb_url(property_id), scrape::extract_airbnb_price),
                };
                let html = self
                    .fetcher
                    .fetch_text(&scrape::proxied_url(api_key, &page))
                    .await?;

                let price = extract(&html).filter(|p| *p > 0.0).map(|price| NewPricingEntry {
                    platform: integration.platform,
                    property_id: property_id.to_string(),
                    price,
                    currency: DEFAULT_CURRENCY.to_string(),
                    date: today,
                });
                if price.is_none() {
                    warn!("[SYNC] No price found on {} page for {}", integration.platform, property_id);
                }
                Ok(SourceData { price, reviews: Vec::new() })
            }
            // No automated source yet; the integration is only stamped.
            Platform::Tripadvisor => Ok(SourceData::default()),
        }
    }
}
