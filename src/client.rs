//! Browser-side calls to the `/api` routes. The auth gateway attaches the
//! caller's identity, so requests carry no credentials of their own.
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::analytics::{PlatformRating, PricingAnalytics, ReviewAnalytics};
use crate::csv_import::{FieldMapping, ImportSummary};
use crate::errors::{sanitize_error_message, ErrorBody, ErrorKind, NETWORK_ERROR};
use crate::models::{
    Feedback, IntegrationCredentials, IntegrationSummary, LoginRequest, NewFeedback, NewReview,
    Platform, PricingEntry, ReplyRequest, Review, Session, SessionUrl, SubscriptionStatus,
};

pub const CHANGES_URL: &str = "/api/changes";
pub const LOGIN_URL: &str = "/auth/login";

#[derive(Error, Debug, Clone)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("{}", .0.message)]
    Api(ErrorBody),
}

impl ClientError {
    /// Short text safe to show in the page.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => NETWORK_ERROR.to_string(),
            ClientError::Api(body) => body.message.clone(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Api(body) => body.kind,
        }
    }
}

impl From<gloo_net::Error> for ClientError {
    fn from(err: gloo_net::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ClientError>;

async fn failure(response: &Response) -> ClientError {
    match response.json::<ErrorBody>().await {
        Ok(body) => ClientError::Api(body),
        Err(_) => ClientError::Api(ErrorBody {
            error: true,
            message: sanitize_error_message(&response.status_text()).to_string(),
            kind: ErrorKind::Server,
        }),
    }
}

async fn read<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    if !response.ok() {
        return Err(failure(&response).await);
    }
    Ok(response.json::<T>().await?)
}

async fn expect_ok(response: Response) -> ApiResult<()> {
    if response.ok() {
        Ok(())
    } else {
        Err(failure(&response).await)
    }
}

async fn get<T: DeserializeOwned>(url: &str) -> ApiResult<T> {
    read(Request::get(url).send().await?).await
}

async fn send_json<B: Serialize, T: DeserializeOwned>(method: &str, url: &str, body: &B) -> ApiResult<T> {
    let builder = match method {
        "PUT" => Request::put(url),
        _ => Request::post(url),
    };
    read(builder.json(body)?.send().await?).await
}

async fn post_empty<T: DeserializeOwned>(url: &str) -> ApiResult<T> {
    read(Request::post(url).send().await?).await
}

pub async fn fetch_session() -> ApiResult<Session> {
    get("/api/session").await
}

pub async fn login(request: &LoginRequest) -> ApiResult<()> {
    let response = Request::post(LOGIN_URL).json(request)?.send().await?;
    expect_ok(response).await
}

// ---- reviews ----

pub async fn list_reviews() -> ApiResult<Vec<Review>> {
    get("/api/reviews").await
}

pub async fn get_review(id: &str) -> ApiResult<Review> {
    get(&format!("/api/reviews/{}", urlencoding::encode(id))).await
}

pub async fn create_review(review: &NewReview) -> ApiResult<Review> {
    send_json("POST", "/api/reviews", review).await
}

pub async fn reply_to_review(id: &str, reply_text: &str) -> ApiResult<Review> {
    let body = ReplyRequest {
        reply_text: reply_text.to_string(),
    };
    send_json("PUT", &format!("/api/reviews/{}/reply", urlencoding::encode(id)), &body).await
}

pub async fn delete_review(id: &str) -> ApiResult<()> {
    let response = Request::delete(&format!("/api/reviews/{}", urlencoding::encode(id)))
        .send()
        .await?;
    expect_ok(response).await
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct SeedResult {
    pub inserted: usize,
}

pub async fn seed_sample_reviews() -> ApiResult<SeedResult> {
    post_empty("/api/reviews/sample").await
}

pub async fn import_csv(platform: Platform, mapping: &FieldMapping, csv: String) -> ApiResult<ImportSummary> {
    let url = format!(
        "/api/reviews/import?platform={}&guest_name={}&date={}&rating={}&review_text={}",
        platform,
        urlencoding::encode(&mapping.guest_name),
        urlencoding::encode(&mapping.date),
        urlencoding::encode(&mapping.rating),
        urlencoding::encode(&mapping.review_text),
    );
    let response = Request::post(&url)
        .header("Content-Type", "text/csv")
        .body(csv)?
        .send()
        .await?;
    read(response).await
}

// ---- analytics & pricing ----

pub async fn fetch_analytics() -> ApiResult<ReviewAnalytics> {
    get("/api/analytics").await
}

pub async fn fetch_platform_ratings() -> ApiResult<Vec<PlatformRating>> {
    get("/api/analytics/platforms").await
}

pub async fn list_pricing(platform: Option<Platform>) -> ApiResult<Vec<PricingEntry>> {
    match platform {
        Some(p) => get(&format!("/api/pricing?platform={p}")).await,
        None => get("/api/pricing").await,
    }
}

pub async fn latest_pricing() -> ApiResult<BTreeMap<Platform, PricingEntry>> {
    get("/api/pricing/latest").await
}

pub async fn pricing_analytics() -> ApiResult<PricingAnalytics> {
    get("/api/pricing/analytics").await
}

// ---- feedback ----

pub async fn submit_feedback(feedback: &NewFeedback) -> ApiResult<Feedback> {
    send_json("POST", "/api/feedback", feedback).await
}

pub async fn list_feedback() -> ApiResult<Vec<Feedback>> {
    get("/api/feedback").await
}

// ---- integrations ----

pub async fn list_integrations() -> ApiResult<Vec<IntegrationSummary>> {
    get("/api/integrations").await
}

#[derive(Serialize, Debug, Clone)]
struct IntegrationUpdate<'a> {
    credentials: &'a IntegrationCredentials,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
}

pub async fn save_integration(
    platform: Platform,
    credentials: &IntegrationCredentials,
    is_active: Option<bool>,
) -> ApiResult<IntegrationSummary> {
    let body = IntegrationUpdate {
        credentials,
        is_active,
    };
    send_json("PUT", &format!("/api/integrations/{platform}"), &body).await
}

// ---- subscription ----

pub async fn subscription_status() -> ApiResult<SubscriptionStatus> {
    get("/api/subscription").await
}

pub async fn refresh_subscription() -> ApiResult<SubscriptionStatus> {
    post_empty("/api/subscription/refresh").await
}

pub async fn checkout_session() -> ApiResult<SessionUrl> {
    post_empty("/api/subscription/checkout").await
}

pub async fn portal_session() -> ApiResult<SessionUrl> {
    post_empty("/api/subscription/portal").await
}

// ---- functions ----

#[derive(serde::Deserialize, Debug, Clone)]
pub struct FunctionResult {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub message: Option<String>,
}

pub async fn trigger_sync() -> ApiResult<FunctionResult> {
    post_empty("/api/functions/daily-sync").await
}

pub async fn import_google_reviews(api_key: &str, place_id: &str) -> ApiResult<FunctionResult> {
    let body = serde_json::json!({ "apiKey": api_key, "placeId": place_id });
    send_json("POST", "/api/functions/google-reviews", &body).await
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct BackupSummary {
    pub backup_id: String,
}

pub async fn request_backup() -> ApiResult<BackupSummary> {
    post_empty("/api/functions/backup").await
}
