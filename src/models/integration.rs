use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Platform;

/// Per-platform key/value settings such as `place_id` or `property_id`.
pub type IntegrationCredentials = BTreeMap<String, String>;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Integration {
    pub id: String,
    pub user_id: String,
    pub platform: Platform,
    /// Plain credentials; only the obfuscated form is ever written to storage.
    pub credentials: IntegrationCredentials,
    pub is_active: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Integration {
    pub fn credential(&self, key: &str) -> Option<&str> {
        self.credentials
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Summary returned to the browser; credential values are not echoed back.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct IntegrationSummary {
    pub platform: Platform,
    pub credential_keys: Vec<String>,
    pub is_active: bool,
    pub last_sync: Option<DateTime<Utc>>,
}

impl From<&Integration> for IntegrationSummary {
    fn from(integration: &Integration) -> Self {
        Self {
            platform: integration.platform,
            credential_keys: integration.credentials.keys().cloned().collect(),
            is_active: integration.is_active,
            last_sync: integration.last_sync,
        }
    }
}
