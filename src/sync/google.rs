//! Google Places Details client, used both by the daily sync and by the
//! on-demand import endpoint.
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use super::{SourceFetcher, SyncError};
use crate::csv_import::ANONYMOUS_GUEST;
use crate::models::{NewReview, Platform};

const PLACES_DETAILS_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const DEFAULT_RATING: u8 = 5;

#[derive(Deserialize, Debug)]
struct PlacesResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<PlaceResult>,
}

#[derive(Deserialize, Debug, Default)]
struct PlaceResult {
    #[serde(default)]
    reviews: Vec<PlaceReview>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PlaceReview {
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub time: Option<i64>,
}

impl PlaceReview {
    pub fn to_new_review(&self, today: NaiveDate) -> NewReview {
        let guest_name = self
            .author_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(ANONYMOUS_GUEST)
            .to_string();

        let rating = match self.rating {
            Some(r) if r >= 1.0 => r.round().min(5.0) as u8,
            _ => DEFAULT_RATING,
        };

        let date = self
            .time
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.date_naive())
            .unwrap_or(today);

        NewReview {
            platform: Platform::Google,
            guest_name,
            rating,
            review_text: self.text.clone().unwrap_or_default(),
            date,
        }
    }
}

pub fn details_url(place_id: &str, api_key: &str) -> String {
    format!(
        "{PLACES_DETAILS_ENDPOINT}?place_id={}&fields=reviews&key={}",
        urlencoding::encode(place_id),
        urlencoding::encode(api_key)
    )
}

/// Anything but `"OK"` in the status field is an error, even on HTTP 200.
pub fn parse_details(body: &str) -> Result<Vec<PlaceReview>, SyncError> {
    let response: PlacesResponse = serde_json::from_str(body)?;
    if response.status != "OK" {
        return Err(SyncError::Google {
            status: response.status,
            message: response
                .error_message
                .unwrap_or_else(|| "Unknown error".to_string()),
        });
    }
    Ok(response.result.unwrap_or_default().reviews)
}

pub async fn fetch_place_reviews(
    fetcher: &dyn SourceFetcher,
    api_key: &str,
    place_id: &str,
    today: NaiveDate,
) -> Result<Vec<NewReview>, SyncError> {
    if api_key.trim().is_empty() {
        return Err(SyncError::MissingApiKey("Google Places API key"));
    }
    if place_id.trim().is_empty() {
        return Err(SyncError::MissingCredential("place_id"));
    }

    let body = fetcher.fetch_text(&details_url(place_id.trim(), api_key.trim())).await?;
    let reviews = parse_details(&body)?;
    Ok(reviews.iter().map(|r| r.to_new_review(today)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn maps_places_reviews_with_defaults() {
        let body = r#"{
            "status": "OK",
            "result": {"reviews": [
                {"author_name": "Ana", "rating": 4, "text": "Wonderful views", "time": 1700000000},
                {"rating": 0, "text": "Quiet place"}
            ]}
        }"#;
        let reviews: Vec<NewReview> = parse_details(body)
            .unwrap()
            .iter()
            .map(|r| r.to_new_review(today()))
            .collect();

        assert_eq!(reviews[0].guest_name, "Ana");
        assert_eq!(reviews[0].rating, 4);
        assert_eq!(reviews[0].date, NaiveDate::from_ymd_opt(2023, 11, 14).unwrap());
        assert_eq!(reviews[1].guest_name, ANONYMOUS_GUEST);
        assert_eq!(reviews[1].rating, 5);
        assert_eq!(reviews[1].date, today());
    }

    #[test]
    fn non_ok_status_is_an_error() {
        let body = r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#;
        let err = parse_details(body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Google API Error: REQUEST_DENIED - The provided API key is invalid."
        );

        let empty = parse_details(r#"{"status": "OK", "result": {}}"#).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn details_url_requests_reviews_only() {
        assert_eq!(
            details_url("ChIJ123", "k"),
            "https://maps.googleapis.com/maps/api/place/details/json?place_id=ChIJ123&fields=reviews&key=k"
        );
    }
}
