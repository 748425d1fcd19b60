use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Platform;

pub const DEFAULT_CURRENCY: &str = "EUR";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PricingEntry {
    pub id: String,
    pub user_id: String,
    pub platform: Platform,
    pub property_id: String,
    pub price: Option<f64>,
    pub currency: String,
    pub date: NaiveDate,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewPricingEntry {
    pub platform: Platform,
    pub property_id: String,
    pub price: f64,
    pub currency: String,
    pub date: NaiveDate,
}
