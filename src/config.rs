use leptos::logging::{log, warn};
use std::{env, fmt::Display, str::FromStr};

/// Runtime settings for the server half, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub scraper_api_key: Option<String>,
    pub google_places_api_key: Option<String>,
    pub daily_sync_enabled: bool,
    pub daily_sync_interval_hours: u64,
    pub billing_url: Option<String>,
    /// Identity assumed when no gateway header is present. Local development only.
    pub dev_user_id: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        if dotenvy::dotenv().is_ok() {
            log!("[CONFIG] Loaded variables from .env");
        }

        Self {
            database_path: try_load("DATABASE_PATH", "reviewdesk.db"),
            scraper_api_key: optional("SCRAPERAPI_KEY"),
            google_places_api_key: optional("GOOGLE_PLACES_API_KEY"),
            daily_sync_enabled: try_load("DAILY_SYNC_ENABLED", "false"),
            daily_sync_interval_hours: try_load("DAILY_SYNC_INTERVAL_HOURS", "24"),
            billing_url: optional("BILLING_URL"),
            dev_user_id: env::var("DEV_USER_ID").ok().filter(|v| !v.trim().is_empty()),
        }
    }

    /// Settings for tests: in-memory database, no external services.
    pub fn for_tests() -> Self {
        Self {
            database_path: ":memory:".into(),
            scraper_api_key: None,
            google_places_api_key: None,
            daily_sync_enabled: false,
            daily_sync_interval_hours: 24,
            billing_url: None,
            dev_user_id: None,
        }
    }
}

fn optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => {
            warn!("[CONFIG] {key} not set, related features are disabled");
            None
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        log!("[CONFIG] {key} not set, using default: {default}");
        default.to_string()
    });

    match raw.parse() {
        Ok(value) => value,
        Err(e) => {
            warn!("[CONFIG] Invalid {key} value {raw:?}: {e}, using default: {default}");
            match default.parse() {
                Ok(value) => value,
                Err(_) => unreachable!("default for {key} must parse"),
            }
        }
    }
}
