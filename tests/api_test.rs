#![cfg(feature = "ssr")]

use actix_web::body::MessageBody;
use actix_web::http::{header, Method, StatusCode};
use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reviewdesk::api::{self, USER_HEADER};
use reviewdesk::config::Config;
use reviewdesk::csv_import::ImportSummary;
use reviewdesk::models::{IntegrationSummary, Review};
use reviewdesk::realtime::{ChangeKind, Table};
use reviewdesk::state::AppState;
use reviewdesk::sync::{SourceFetcher, SyncError};

const PLACE_BODY: &str = r#"{"status": "OK", "result": {"reviews": [
    {"author_name": "Ana", "rating": 5, "text": "Wonderful views and a kind host", "time": 1700000000},
    {"author_name": "Tom", "rating": 3, "text": "Fine for a night", "time": 1700100000}
]}}"#;

const BILLING_BODY: &str = r#"{"subscribed": true, "subscription_tier": "Pro", "subscription_end": null}"#;

/// Stands in for Google Places and the billing provider, recording every URL.
#[derive(Default)]
struct RemoteStub {
    requested: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl SourceFetcher for RemoteStub {
    async fn fetch_text(&self, url: &str) -> Result<String, SyncError> {
        self.requested.lock().unwrap().push(url.to_string());
        if url.contains("/place/details/") {
            Ok(PLACE_BODY.to_string())
        } else if url.contains("/status?") {
            Ok(BILLING_BODY.to_string())
        } else {
            Err(SyncError::Status(404))
        }
    }
}

async fn state() -> Arc<AppState> {
    AppState::new(Config::for_tests()).await.unwrap()
}

async fn state_with_remotes(remotes: Arc<RemoteStub>) -> Arc<AppState> {
    let config = Config {
        google_places_api_key: Some("server-key".into()),
        billing_url: Some("https://billing.example.com".into()),
        ..Config::for_tests()
    };
    AppState::with_fetcher(config, remotes).await.unwrap()
}

fn review_body(guest: &str) -> Value {
    json!({
        "platform": "booking",
        "guest_name": guest,
        "rating": 4,
        "review_text": "Great location and a very friendly host.",
        "date": "2024-05-01",
    })
}

fn csv_with_rows(rows: usize) -> String {
    let mut csv = String::from("guest_name,date,rating,review_text\n");
    for i in 0..rows {
        csv.push_str(&format!("Guest {i},2024-04-{:02},5,\"Lovely, quiet room number {i}\"\n", i % 28 + 1));
    }
    csv
}

#[actix_web::test]
async fn test_requests_without_user_are_rejected() {
    let app = test::init_service(App::new().app_data(web::Data::from(state().await)).configure(api::configure)).await;

    let req = test::TestRequest::get().uri("/api/reviews").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], true);
    assert_eq!(body["message"], "Authentication failed. Please try again.");
}

#[actix_web::test]
async fn test_review_lifecycle() {
    let app = test::init_service(App::new().app_data(web::Data::from(state().await)).configure(api::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/reviews")
        .insert_header((USER_HEADER, "host-1"))
        .set_json(review_body("Jane Doe"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Review = test::read_body_json(resp).await;
    assert!(!created.replied);
    assert_eq!(created.user_id, "host-1");

    let req = test::TestRequest::put()
        .uri(&format!("/api/reviews/{}/reply", created.id))
        .insert_header((USER_HEADER, "host-1"))
        .set_json(json!({ "reply_text": "Thank you, <b>Jane</b>!" }))
        .to_request();
    let replied: Review = test::call_and_read_body_json(&app, req).await;
    assert!(replied.replied);
    assert_eq!(replied.reply_text.as_deref(), Some("Thank you, Jane!"));

    let req = test::TestRequest::get()
        .uri("/api/reviews")
        .insert_header((USER_HEADER, "host-1"))
        .to_request();
    let listed: Vec<Review> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.len(), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/reviews/{}", created.id))
        .insert_header((USER_HEADER, "host-1"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/reviews/{}", created.id))
        .insert_header((USER_HEADER, "host-1"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_reviews_are_scoped_to_owner() {
    let app = test::init_service(App::new().app_data(web::Data::from(state().await)).configure(api::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/reviews")
        .insert_header((USER_HEADER, "owner"))
        .set_json(review_body("Jane Doe"))
        .to_request();
    let created: Review = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/reviews/{}", created.id))
        .insert_header((USER_HEADER, "intruder"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri(&format!("/api/reviews/{}/reply", created.id))
        .insert_header((USER_HEADER, "intruder"))
        .set_json(json!({ "reply_text": "Not mine to answer" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/reviews")
        .insert_header((USER_HEADER, "intruder"))
        .to_request();
    let listed: Vec<Review> = test::call_and_read_body_json(&app, req).await;
    assert!(listed.is_empty());
}

#[actix_web::test]
async fn test_invalid_review_is_a_bad_request() {
    let app = test::init_service(App::new().app_data(web::Data::from(state().await)).configure(api::configure)).await;

    let mut body = review_body("Jane Doe");
    body["rating"] = json!(7);
    let req = test::TestRequest::post()
        .uri("/api/reviews")
        .insert_header((USER_HEADER, "host-1"))
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Please check your input and try again.");
}

#[actix_web::test]
async fn test_csv_import_respects_free_tier() {
    let app = test::init_service(App::new().app_data(web::Data::from(state().await)).configure(api::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/reviews/import?platform=airbnb")
        .insert_header((USER_HEADER, "host-1"))
        .insert_header(("Content-Type", "text/csv"))
        .set_payload(csv_with_rows(12))
        .to_request();
    let summary: ImportSummary = test::call_and_read_body_json(&app, req).await;
    assert_eq!(summary, ImportSummary { imported: 10, skipped: 2, failed: 0 });

    let req = test::TestRequest::post()
        .uri("/api/reviews")
        .insert_header((USER_HEADER, "host-1"))
        .set_json(review_body("Late Guest"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_csv_import_with_custom_mapping() {
    let app = test::init_service(App::new().app_data(web::Data::from(state().await)).configure(api::configure)).await;

    let csv = "Reviewer,Stay,Score,Comment\n\
               Ana,2024-02-10,4,\"Nice, clean and quiet\"\n\
               Ben,not-a-date,5,Great\n";
    let req = test::TestRequest::post()
        .uri("/api/reviews/import?platform=booking&guest_name=Reviewer&date=Stay&rating=Score&review_text=Comment")
        .insert_header((USER_HEADER, "host-1"))
        .set_payload(csv)
        .to_request();
    let summary: ImportSummary = test::call_and_read_body_json(&app, req).await;
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.skipped, 1);

    let req = test::TestRequest::post()
        .uri("/api/reviews/import?platform=booking")
        .insert_header((USER_HEADER, "host-1"))
        .set_payload(csv)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_integration_credentials_are_not_echoed() {
    let app = test::init_service(App::new().app_data(web::Data::from(state().await)).configure(api::configure)).await;

    let req = test::TestRequest::put()
        .uri("/api/integrations/google")
        .insert_header((USER_HEADER, "host-1"))
        .set_json(json!({ "credentials": { "place_id": "ChIJ-secret-place" } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let raw = test::read_body(resp).await;
    assert!(!String::from_utf8_lossy(&raw).contains("ChIJ-secret-place"));

    let req = test::TestRequest::get()
        .uri("/api/integrations")
        .insert_header((USER_HEADER, "host-1"))
        .to_request();
    let listed: Vec<IntegrationSummary> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].credential_keys, vec!["place_id".to_string()]);
    assert!(listed[0].is_active);

    let req = test::TestRequest::put()
        .uri("/api/integrations/myspace")
        .insert_header((USER_HEADER, "host-1"))
        .set_json(json!({ "is_active": false }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_billing_without_configuration_is_a_server_error() {
    let app = test::init_service(App::new().app_data(web::Data::from(state().await)).configure(api::configure)).await;

    let req = test::TestRequest::get()
        .uri("/api/subscription")
        .insert_header((USER_HEADER, "host-1"))
        .to_request();
    let status: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(status["subscribed"], false);

    let req = test::TestRequest::post()
        .uri("/api/subscription/checkout")
        .insert_header((USER_HEADER, "host-1"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn test_security_and_cors_headers() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(state().await))
            .wrap(api::security_headers())
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/session")
        .insert_header((USER_HEADER, "host-1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("X-Frame-Options").unwrap(), "DENY");
    assert_eq!(resp.headers().get("X-Content-Type-Options").unwrap(), "nosniff");

    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/api/functions/daily-sync")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("Access-Control-Allow-Origin").unwrap(), "*");
}

#[actix_web::test]
async fn test_backup_contains_only_callers_rows() {
    let app = test::init_service(App::new().app_data(web::Data::from(state().await)).configure(api::configure)).await;

    for user in ["host-1", "host-2"] {
        let req = test::TestRequest::post()
            .uri("/api/reviews/sample")
            .insert_header((USER_HEADER, user))
            .to_request();
        let seeded: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(seeded["inserted"], 5);
    }

    let req = test::TestRequest::post()
        .uri("/api/functions/backup")
        .insert_header((USER_HEADER, "host-1"))
        .to_request();
    let backup: Value = test::call_and_read_body_json(&app, req).await;
    assert!(backup["backup_id"].as_str().unwrap().starts_with("backup_"));
    assert_eq!(backup["data"]["reviews"].as_array().unwrap().len(), 5);
    assert!(backup["data"]["reviews"]
        .as_array()
        .unwrap()
        .iter()
        .all(|row| row["user_id"] == "host-1"));
}

#[actix_web::test]
async fn test_form_submissions_are_throttled() {
    let app = test::init_service(App::new().app_data(web::Data::from(state().await)).configure(api::configure)).await;

    for _ in 0..10 {
        let req = test::TestRequest::post()
            .uri("/api/feedback")
            .insert_header((USER_HEADER, "host-1"))
            .set_json(json!({ "rating": 5 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .insert_header((USER_HEADER, "host-1"))
        .set_json(json!({ "rating": 5 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["type"], "rate_limit");
    assert_eq!(body["message"], "Too many requests. Please wait before trying again.");

    // The window is per user.
    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .insert_header((USER_HEADER, "host-2"))
        .set_json(json!({ "rating": 4 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn test_change_stream_delivers_own_events() {
    let state = state().await;
    let app = test::init_service(App::new().app_data(web::Data::from(state.clone())).configure(api::configure)).await;

    let req = test::TestRequest::get()
        .uri("/api/changes")
        .insert_header((USER_HEADER, "host-1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "text/event-stream");
    assert_eq!(resp.headers().get(header::CACHE_CONTROL).unwrap(), "no-cache");

    state.feed.publish(Table::Reviews, ChangeKind::Insert, "host-2", "not-mine");
    state.feed.publish(Table::Reviews, ChangeKind::Update, "host-1", "review-7");

    let mut body = Box::pin(resp.into_body());
    let chunk = tokio::time::timeout(
        Duration::from_secs(5),
        futures::future::poll_fn(|cx| body.as_mut().poll_next(cx)),
    )
    .await
    .expect("no frame within five seconds")
    .and_then(Result::ok)
    .unwrap();

    let frame = String::from_utf8(chunk.to_vec()).unwrap();
    assert!(frame.starts_with("event: change\ndata: "));
    assert!(frame.ends_with("\n\n"));
    assert!(frame.contains("review-7"));
    assert!(!frame.contains("not-mine"));
}

#[actix_web::test]
async fn test_google_import_falls_back_to_server_key() {
    let remotes = Arc::new(RemoteStub::default());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(state_with_remotes(remotes.clone()).await))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/functions/google-reviews")
        .insert_header((USER_HEADER, "host-1"))
        .set_json(json!({ "apiKey": "", "placeId": "ChIJ1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["fetched"], 2);
    assert!(remotes.requested.lock().unwrap()[0].ends_with("&key=server-key"));

    let req = test::TestRequest::post()
        .uri("/api/functions/google-reviews")
        .insert_header((USER_HEADER, "host-1"))
        .set_json(json!({ "apiKey": "", "placeId": "ChIJ1" }))
        .to_request();
    let again: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(again["count"], 0);
}

#[actix_web::test]
async fn test_google_import_quota_counts_only_new_reviews() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(state_with_remotes(Arc::new(RemoteStub::default())).await))
            .configure(api::configure),
    )
    .await;

    // Nine stored reviews, one of them the first review Google returns.
    let mut csv = csv_with_rows(8);
    csv.push_str("Ana,2023-11-14,5,Wonderful views and a kind host\n");
    let req = test::TestRequest::post()
        .uri("/api/reviews/import?platform=google")
        .insert_header((USER_HEADER, "host-1"))
        .set_payload(csv)
        .to_request();
    let summary: ImportSummary = test::call_and_read_body_json(&app, req).await;
    assert_eq!(summary.imported, 9);

    let req = test::TestRequest::post()
        .uri("/api/functions/google-reviews")
        .insert_header((USER_HEADER, "host-1"))
        .set_json(json!({ "placeId": "ChIJ1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 1);

    let req = test::TestRequest::get()
        .uri("/api/reviews")
        .insert_header((USER_HEADER, "host-1"))
        .to_request();
    let listed: Vec<Review> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.len(), 10);
    assert!(listed.iter().any(|r| r.guest_name == "Tom"));
}

#[actix_web::test]
async fn test_malformed_input_gets_generic_body() {
    let app = test::init_service(App::new().app_data(web::Data::from(state().await)).configure(api::configure)).await;

    let mut body = review_body("Jane Doe");
    body["platform"] = json!("expedia");
    let req = test::TestRequest::post()
        .uri("/api/reviews")
        .insert_header((USER_HEADER, "host-1"))
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let raw = test::read_body(resp).await;
    let text = String::from_utf8_lossy(&raw);
    assert!(!text.contains("expedia"));
    let body: Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(body["message"], "Please check your input and try again.");
    assert_eq!(body["type"], "validation");

    let req = test::TestRequest::post()
        .uri("/api/reviews/import?platform=expedia")
        .insert_header((USER_HEADER, "host-1"))
        .set_payload(csv_with_rows(1))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Please check your input and try again.");
}

#[actix_web::test]
async fn test_subscription_refresh_lifts_free_tier() {
    let remotes = Arc::new(RemoteStub::default());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(state_with_remotes(remotes.clone()).await))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/reviews/import?platform=airbnb")
        .insert_header((USER_HEADER, "host-1"))
        .set_payload(csv_with_rows(10))
        .to_request();
    let summary: ImportSummary = test::call_and_read_body_json(&app, req).await;
    assert_eq!(summary.imported, 10);

    let req = test::TestRequest::post()
        .uri("/api/reviews")
        .insert_header((USER_HEADER, "host-1"))
        .set_json(review_body("Eleventh Guest"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/subscription/refresh")
        .insert_header((USER_HEADER, "host-1"))
        .to_request();
    let refreshed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(refreshed["subscribed"], true);
    assert_eq!(refreshed["subscription_tier"], "Pro");
    assert!(remotes
        .requested
        .lock()
        .unwrap()
        .contains(&"https://billing.example.com/status?client_reference_id=host-1".to_string()));

    let req = test::TestRequest::get()
        .uri("/api/subscription")
        .insert_header((USER_HEADER, "host-1"))
        .to_request();
    let stored: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stored["subscribed"], true);

    let req = test::TestRequest::post()
        .uri("/api/reviews")
        .insert_header((USER_HEADER, "host-1"))
        .set_json(review_body("Eleventh Guest"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
}
