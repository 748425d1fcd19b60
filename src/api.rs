use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::middleware::DefaultHeaders;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use futures::StreamExt;
use leptos::logging::{log, warn};
use serde::Deserialize;
use std::future::{ready, Ready};

use crate::analytics::{platform_ratings, review_analytics};
use crate::csv_import::{parse_reviews_csv, FieldMapping, ImportSummary};
use crate::errors::AppError;
use crate::models::integration::IntegrationSummary;
use crate::models::{IntegrationCredentials, NewFeedback, NewReview, Platform, ReplyRequest, Session};
use crate::realtime::sse_frame;
use crate::security::{validate_reply_text, MAX_UPLOAD_BYTES, SECURITY_HEADERS};
use crate::state::AppState;
use crate::sync::google;

/// Header set by the auth gateway in front of the server.
pub const USER_HEADER: &str = "X-User-Id";

/// The authenticated caller. Extraction also counts the request against the
/// caller's API rate limit.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>();
        let user_id = req
            .headers()
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .or_else(|| state.and_then(|s| s.config.dev_user_id.clone()));

        let Some(user_id) = user_id else {
            return ready(Err(AppError::Unauthenticated));
        };
        if let Some(state) = state {
            if !state.api_limiter.check(&user_id) {
                return ready(Err(AppError::RateLimited(format!("api calls by {user_id}"))));
            }
        }
        ready(Ok(CurrentUser(user_id)))
    }
}

fn throttle_form(state: &AppState, user: &CurrentUser, action: &str) -> Result<(), AppError> {
    if state.form_limiter.check(&format!("{action}:{}", user.0)) {
        Ok(())
    } else {
        Err(AppError::RateLimited(format!("{action} by {}", user.0)))
    }
}

async fn get_session(user: CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(Session { user_id: user.0 })
}

// ---- reviews ----

async fn list_reviews(state: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    let reviews = state.reviews.list(&user.0).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

async fn get_review(
    state: web::Data<AppState>,
    user: CurrentUser,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let review = state.reviews.get(&user.0, &id).await?;
    Ok(HttpResponse::Ok().json(review))
}

async fn create_review(
    state: web::Data<AppState>,
    user: CurrentUser,
    review: web::Json<NewReview>,
) -> Result<HttpResponse, AppError> {
    throttle_form(&state, &user, "create_review")?;

    let current = state.reviews.count(&user.0).await?;
    if !state.subscription.can_add_review(&user.0, current).await? {
        return Err(AppError::PlanLimit(format!("user {} at free review limit", user.0)));
    }

    let created = state.reviews.create(&user.0, &review).await?;
    log!("[API] Review {} created for user {}", created.id, user.0);
    Ok(HttpResponse::Created().json(created))
}

async fn reply_to_review(
    state: web::Data<AppState>,
    user: CurrentUser,
    id: web::Path<String>,
    body: web::Json<ReplyRequest>,
) -> Result<HttpResponse, AppError> {
    throttle_form(&state, &user, "reply")?;
    let reply_text = validate_reply_text(&body.reply_text)
        .into_result()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let review = state.reviews.reply(&user.0, &id, &reply_text).await?;
    Ok(HttpResponse::Ok().json(review))
}

async fn delete_review(
    state: web::Data<AppState>,
    user: CurrentUser,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.reviews.delete(&user.0, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn seed_sample_reviews(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let inserted = state.reviews.seed_sample(&user.0).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "inserted": inserted })))
}

#[derive(Deserialize, Debug)]
pub struct ImportQuery {
    pub platform: Platform,
    pub guest_name: Option<String>,
    pub date: Option<String>,
    pub rating: Option<String>,
    pub review_text: Option<String>,
}

impl ImportQuery {
    fn mapping(&self) -> FieldMapping {
        let defaults = FieldMapping::default();
        let pick = |given: &Option<String>, default: String| {
            given.clone().filter(|c| !c.trim().is_empty()).unwrap_or(default)
        };
        FieldMapping {
            guest_name: pick(&self.guest_name, defaults.guest_name),
            date: pick(&self.date, defaults.date),
            rating: pick(&self.rating, defaults.rating),
            review_text: pick(&self.review_text, defaults.review_text),
        }
    }
}

async fn import_reviews(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<ImportQuery>,
    body: String,
) -> Result<HttpResponse, AppError> {
    throttle_form(&state, &user, "import")?;
    let parsed = parse_reviews_csv(&body, query.platform, &query.mapping())?;

    let current = state.reviews.count(&user.0).await?;
    let quota = state.subscription.remaining_quota(&user.0, current).await?;

    let mut summary = ImportSummary {
        skipped: parsed.skipped,
        ..ImportSummary::default()
    };
    for (i, review) in parsed.reviews.iter().enumerate() {
        if quota.is_some_and(|left| i >= left) {
            summary.skipped += parsed.reviews.len() - i;
            break;
        }
        match state.reviews.create(&user.0, review).await {
            Ok(_) => summary.imported += 1,
            Err(e) => {
                warn!("[API] CSV row rejected for user {}: {}", user.0, e);
                summary.failed += 1;
            }
        }
    }

    log!(
        "[API] CSV import for user {}: {} imported, {} skipped, {} failed",
        user.0,
        summary.imported,
        summary.skipped,
        summary.failed
    );
    Ok(HttpResponse::Ok().json(summary))
}

// ---- analytics & pricing ----

async fn get_analytics(state: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    let reviews = state.reviews.list(&user.0).await?;
    Ok(HttpResponse::Ok().json(review_analytics(&reviews)))
}

async fn get_platform_ratings(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let reviews = state.reviews.list(&user.0).await?;
    Ok(HttpResponse::Ok().json(platform_ratings(&reviews)))
}

#[derive(Deserialize, Debug)]
pub struct PricingQuery {
    pub platform: Option<Platform>,
}

async fn list_pricing(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<PricingQuery>,
) -> Result<HttpResponse, AppError> {
    let entries = state.pricing.list(&user.0, query.platform).await?;
    Ok(HttpResponse::Ok().json(entries))
}

async fn latest_pricing(state: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.pricing.latest(&user.0).await?))
}

async fn get_pricing_analytics(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.pricing.analytics(&user.0).await?))
}

// ---- feedback ----

async fn submit_feedback(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<NewFeedback>,
) -> Result<HttpResponse, AppError> {
    throttle_form(&state, &user, "feedback")?;
    let feedback = state.feedback.submit(&user.0, &body).await?;
    Ok(HttpResponse::Created().json(feedback))
}

async fn list_feedback(state: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.feedback.list(&user.0).await?))
}

// ---- integrations ----

async fn list_integrations(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let summaries: Vec<IntegrationSummary> = state
        .integrations
        .list(&user.0)
        .await?
        .iter()
        .map(IntegrationSummary::from)
        .collect();
    Ok(HttpResponse::Ok().json(summaries))
}

#[derive(Deserialize, Debug)]
pub struct IntegrationUpdate {
    #[serde(default)]
    pub credentials: IntegrationCredentials,
    #[serde(default)]
    pub is_active: Option<bool>,
}

async fn update_integration(
    state: web::Data<AppState>,
    user: CurrentUser,
    platform: web::Path<String>,
    body: web::Json<IntegrationUpdate>,
) -> Result<HttpResponse, AppError> {
    let platform: Platform = platform
        .parse()
        .map_err(|e: crate::models::platform::UnknownPlatform| AppError::Validation(e.to_string()))?;

    let mut integration = None;
    if !body.credentials.is_empty() {
        integration = Some(
            state
                .integrations
                .store_credentials(&user.0, platform, &body.credentials)
                .await?,
        );
    }
    if let Some(active) = body.is_active {
        integration = Some(state.integrations.set_active(&user.0, platform, active).await?);
    }

    let integration = integration
        .ok_or_else(|| AppError::Validation("nothing to update".into()))?;
    Ok(HttpResponse::Ok().json(IntegrationSummary::from(&integration)))
}

// ---- subscription ----

async fn get_subscription(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.subscription.status(&user.0).await?))
}

async fn create_checkout(state: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.subscription.checkout_url(&user.0)?))
}

async fn refresh_subscription(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.subscription.refresh(&user.0).await?))
}

async fn customer_portal(state: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.subscription.portal_url(&user.0)?))
}

// ---- realtime ----

async fn change_stream(state: web::Data<AppState>, user: CurrentUser) -> HttpResponse {
    log!("[API] Change feed opened for user {}", user.0);
    let events = state
        .feed
        .subscribe(user.0)
        .map(|event| Ok::<_, actix_web::Error>(web::Bytes::from(sse_frame(&event))));

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(events)
}

// ---- functions ----

async fn run_daily_sync(state: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    log!("[API] Daily sync triggered by user {}", user.0);
    let report = state.sync.run().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Data sync completed successfully",
        "report": report,
    })))
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoogleImportRequest {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub place_id: Option<String>,
}

async fn import_google_reviews(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<GoogleImportRequest>,
) -> Result<HttpResponse, AppError> {
    let api_key = body
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| state.config.google_places_api_key.clone())
        .unwrap_or_default();
    let place_id = body.place_id.clone().unwrap_or_default();
    if api_key.trim().is_empty() || place_id.trim().is_empty() {
        return Err(AppError::Validation("Missing apiKey or placeId".into()));
    }

    let today = chrono::Utc::now().date_naive();
    let reviews = google::fetch_place_reviews(state.sync.fetcher(), &api_key, &place_id, today).await?;

    let current = state.reviews.count(&user.0).await?;
    let quota = state.subscription.remaining_quota(&user.0, current).await?;
    let mut saved = 0;
    for review in &reviews {
        if quota.is_some_and(|left| saved >= left) {
            break;
        }
        if state.reviews.insert_if_absent(&user.0, review).await? {
            saved += 1;
        }
    }

    log!("[API] Imported {} Google reviews for user {}", saved, user.0);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": saved,
        "fetched": reviews.len(),
    })))
}

async fn run_backup(state: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    let backup = state.backup.export(&user.0).await?;
    Ok(HttpResponse::Ok().json(backup))
}

async fn preflight() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

/// Extractor failures carry serde detail; only the generic validation body
/// reaches the client.
fn rejected_input(err: impl std::fmt::Display) -> actix_web::Error {
    AppError::Validation(err.to_string()).into()
}

/// Headers attached to every response.
pub fn security_headers() -> DefaultHeaders {
    SECURITY_HEADERS
        .iter()
        .fold(DefaultHeaders::new(), |headers, &(name, value)| headers.add((name, value)))
}

fn function_cors() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .add((
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            "authorization, x-client-info, x-user-id, apikey, content-type",
        ))
}

/// Registers every `/api` route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
            .app_data(web::JsonConfig::default().error_handler(|err, _| rejected_input(err)))
            .app_data(web::QueryConfig::default().error_handler(|err, _| rejected_input(err)))
            .app_data(web::PathConfig::default().error_handler(|err, _| rejected_input(err)))
            .service(
                web::scope("/functions")
                    .wrap(function_cors())
                    .route("/daily-sync", web::post().to(run_daily_sync))
                    .route("/google-reviews", web::post().to(import_google_reviews))
                    .route("/backup", web::post().to(run_backup))
                    .route("/{tail:.*}", web::method(actix_web::http::Method::OPTIONS).to(preflight)),
            )
            .route("/session", web::get().to(get_session))
            .route("/reviews", web::get().to(list_reviews))
            .route("/reviews", web::post().to(create_review))
            .route("/reviews/import", web::post().to(import_reviews))
            .route("/reviews/sample", web::post().to(seed_sample_reviews))
            .route("/reviews/{id}", web::get().to(get_review))
            .route("/reviews/{id}", web::delete().to(delete_review))
            .route("/reviews/{id}/reply", web::put().to(reply_to_review))
            .route("/analytics", web::get().to(get_analytics))
            .route("/analytics/platforms", web::get().to(get_platform_ratings))
            .route("/pricing", web::get().to(list_pricing))
            .route("/pricing/latest", web::get().to(latest_pricing))
            .route("/pricing/analytics", web::get().to(get_pricing_analytics))
            .route("/feedback", web::post().to(submit_feedback))
            .route("/feedback", web::get().to(list_feedback))
            .route("/integrations", web::get().to(list_integrations))
            .route("/integrations/{platform}", web::put().to(update_integration))
            .route("/subscription", web::get().to(get_subscription))
            .route("/subscription/refresh", web::post().to(refresh_subscription))
            .route("/subscription/checkout", web::post().to(create_checkout))
            .route("/subscription/portal", web::post().to(customer_portal))
            .route("/changes", web::get().to(change_stream)),
    );
}
