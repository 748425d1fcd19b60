//! Dashboard aggregates over reviews and pricing entries.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Platform, PricingEntry, Review};

pub const RECENT_REVIEWS: usize = 5;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ReviewAnalytics {
    pub total_reviews: usize,
    pub average_rating: f64,
    pub pending_replies: usize,
    pub platform_distribution: BTreeMap<Platform, usize>,
    pub recent_reviews: Vec<Review>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlatformRating {
    pub platform: Platform,
    pub count: usize,
    pub average: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
    pub platform: Platform,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PricingAnalytics {
    pub average_price: f64,
    pub prices_by_platform: BTreeMap<Platform, f64>,
    pub price_history: Vec<PricePoint>,
    pub total_entries: usize,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Expects `reviews` newest first, the order the reviews service returns.
pub fn review_analytics(reviews: &[Review]) -> ReviewAnalytics {
    let average = mean(reviews.iter().map(|r| r.rating as f64)).unwrap_or(0.0);

    let mut platform_distribution = BTreeMap::new();
    for review in reviews {
        *platform_distribution.entry(review.platform).or_insert(0) += 1;
    }

    ReviewAnalytics {
        total_reviews: reviews.len(),
        average_rating: round_to(average, 1),
        pending_replies: reviews.iter().filter(|r| !r.replied).count(),
        platform_distribution,
        recent_reviews: reviews.iter().take(RECENT_REVIEWS).cloned().collect(),
    }
}

/// One entry per known platform, including those without reviews.
pub fn platform_ratings(reviews: &[Review]) -> Vec<PlatformRating> {
    Platform::ALL
        .iter()
        .map(|&platform| {
            let ratings: Vec<f64> = reviews
                .iter()
                .filter(|r| r.platform == platform)
                .map(|r| r.rating as f64)
                .collect();
            PlatformRating {
                platform,
                count: ratings.len(),
                average: round_to(mean(ratings.into_iter()).unwrap_or(0.0), 2),
            }
        })
        .collect()
}

pub fn pricing_analytics(entries: &[PricingEntry]) -> PricingAnalytics {
    let priced: Vec<(&PricingEntry, f64)> = entries
        .iter()
        .filter_map(|e| e.price.map(|p| (e, p)))
        .collect();

    let average = mean(priced.iter().map(|(_, p)| *p)).unwrap_or(0.0);

    let mut groups: BTreeMap<Platform, Vec<f64>> = BTreeMap::new();
    for (entry, price) in &priced {
        groups.entry(entry.platform).or_default().push(*price);
    }
    let prices_by_platform = groups
        .into_iter()
        .filter_map(|(platform, prices)| mean(prices.into_iter()).map(|avg| (platform, avg)))
        .collect();

    let mut price_history: Vec<PricePoint> = priced
        .iter()
        .map(|(e, price)| PricePoint {
            date: e.date,
            price: *price,
            platform: e.platform,
        })
        .collect();
    price_history.sort_by_key(|p| p.date);

    PricingAnalytics {
        average_price: round_to(average, 2),
        prices_by_platform,
        price_history,
        total_entries: entries.len(),
    }
}

/// Latest entry for each platform; on equal dates the first one seen wins.
pub fn latest_pricing(entries: &[PricingEntry]) -> BTreeMap<Platform, PricingEntry> {
    let mut latest: BTreeMap<Platform, PricingEntry> = BTreeMap::new();
    for entry in entries {
        match latest.get(&entry.platform) {
            Some(current) if current.date >= entry.date => {}
            _ => {
                latest.insert(entry.platform, entry.clone());
            }
        }
    }
    latest
}
