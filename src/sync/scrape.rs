//! Price extraction from listing pages fetched through the scraping proxy.
//! The patterns are deliberately loose; they pick the first amount that looks
//! like a nightly price.
use regex::Regex;
use std::sync::LazyLock;

const SCRAPER_ENDPOINT: &str = "https://api.scraperapi.com";

static BOOKING_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)EUR\s*([0-9,]+(?:\.[0-9]{2})?)").unwrap());
static AIRBNB_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"€([0-9,]+(?:\.[0-9]{2})?)").unwrap());

pub fn booking_url(property_id: &str) -> String {
    format!("https://www.booking.com/hotel/gr/property-{property_id}.html")
}

pub fn airbnb_url(property_id: &str) -> String {
    format!("https://www.airbnb.com/rooms/{property_id}")
}

/// Wraps a target page in a scraping proxy request.
pub fn proxied_url(api_key: &str, target: &str) -> String {
    format!(
        "{SCRAPER_ENDPOINT}?api_key={}&url={}",
        urlencoding::encode(api_key),
        urlencoding::encode(target)
    )
}

fn first_amount(pattern: &Regex, html: &str) -> Option<f64> {
    let raw = pattern.captures(html)?.get(1)?.as_str().replace(',', "");
    raw.parse().ok()
}

pub fn extract_booking_price(html: &str) -> Option<f64> {
    first_amount(&BOOKING_PRICE, html)
}

pub fn extract_airbnb_price(html: &str) -> Option<f64> {
    first_amount(&AIRBNB_PRICE, html)
}
