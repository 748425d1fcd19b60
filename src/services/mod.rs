//! One service per resource. Every call takes the owning user id and every
//! query is scoped by it.
pub mod feedback;
pub mod integrations;
pub mod pricing;
pub mod reviews;
pub mod subscription;

pub use feedback::FeedbackService;
pub use integrations::IntegrationService;
pub use pricing::PricingService;
pub use reviews::ReviewsService;
pub use subscription::SubscriptionService;

use chrono::{DateTime, Utc};

pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
