pub mod feedback;
pub mod integration;
pub mod platform;
pub mod pricing;
pub mod review;
pub mod session;
pub mod subscription;

pub use feedback::{Feedback, NewFeedback};
pub use integration::{Integration, IntegrationCredentials, IntegrationSummary};
pub use platform::Platform;
pub use pricing::{NewPricingEntry, PricingEntry};
pub use review::{NewReview, ReplyRequest, Review};
pub use session::{LoginRequest, Session};
pub use subscription::{SessionUrl, SubscriptionStatus, FREE_REVIEW_LIMIT};
