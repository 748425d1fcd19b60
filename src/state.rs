use std::sync::Arc;

use crate::backup::BackupService;
use crate::config::Config;
use crate::db::Database;
use crate::rate_limit::{RateLimit, RateLimiter};
use crate::realtime::ChangeFeed;
use crate::services::{
    FeedbackService, IntegrationService, PricingService, ReviewsService, SubscriptionService,
};
use crate::sync::{DailySync, HttpFetcher, SourceFetcher};

/// Everything a request handler needs, shared by all actix workers.
pub struct AppState {
    pub config: Config,
    pub feed: ChangeFeed,
    pub reviews: ReviewsService,
    pub pricing: PricingService,
    pub feedback: FeedbackService,
    pub integrations: IntegrationService,
    pub subscription: SubscriptionService,
    pub backup: BackupService,
    pub sync: DailySync,
    pub form_limiter: RateLimiter,
    pub api_limiter: RateLimiter,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>, rusqlite::Error> {
        Self::with_fetcher(config, Arc::new(HttpFetcher::new())).await
    }

    pub async fn with_fetcher(
        config: Config,
        fetcher: Arc<dyn SourceFetcher>,
    ) -> Result<Arc<Self>, rusqlite::Error> {
        let db = Database::new(&config.database_path)?;
        db.create_schema().await?;

        let feed = ChangeFeed::new();
        let reviews = ReviewsService::new(db.clone(), feed.clone());
        let pricing = PricingService::new(db.clone(), feed.clone());
        let integrations = IntegrationService::new(db.clone(), feed.clone());
        let subscription =
            SubscriptionService::new(db.clone(), config.billing_url.clone(), fetcher.clone());
        let sync = DailySync::new(
            integrations.clone(),
            reviews.clone(),
            pricing.clone(),
            fetcher,
            config.scraper_api_key.clone(),
            config.google_places_api_key.clone(),
        );

        Ok(Arc::new(Self {
            feedback: FeedbackService::new(db.clone(), feed.clone()),
            subscription,
            backup: BackupService::new(db),
            reviews,
            pricing,
            integrations,
            sync,
            feed,
            form_limiter: RateLimiter::new(RateLimit::FORM_SUBMISSIONS),
            api_limiter: RateLimiter::new(RateLimit::API_CALLS),
            config,
        }))
    }
}
