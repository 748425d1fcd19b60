use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of reviews a workspace may hold without a paid plan.
pub const FREE_REVIEW_LIMIT: usize = 10;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SubscriptionStatus {
    pub subscribed: bool,
    pub subscription_tier: Option<String>,
    pub subscription_end: Option<DateTime<Utc>>,
}

impl SubscriptionStatus {
    /// A subscription past its end date counts as lapsed.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.subscribed && self.subscription_end.map_or(true, |end| end > now)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionUrl {
    pub url: String,
}
