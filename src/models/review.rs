// src/models/review.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Platform;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub platform: Platform,
    pub guest_name: String,
    pub rating: u8,
    pub review_text: String,
    pub date: NaiveDate,
    pub reply_text: Option<String>,
    pub replied: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Applies a reply locally, mirroring what the server stores.
    pub fn with_reply(mut self, reply_text: &str) -> Self {
        self.reply_text = Some(reply_text.to_string());
        self.replied = true;
        self
    }
}

/// Payload for creating a review. The owner comes from the request, never the body.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewReview {
    pub platform: Platform,
    pub guest_name: String,
    pub rating: u8,
    pub review_text: String,
    pub date: NaiveDate,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReplyRequest {
    pub reply_text: String,
}
