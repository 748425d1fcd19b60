use leptos::logging::log;
use rusqlite::{params, OptionalExtension, Row};
use std::collections::BTreeMap;

use super::new_id;
use crate::analytics::{self, PricingAnalytics};
use crate::db::Database;
use crate::errors::AppError;
use crate::models::{NewPricingEntry, Platform, PricingEntry};
use crate::realtime::{ChangeFeed, ChangeKind, Table};

const PRICING_COLUMNS: &str = "id, user_id, platform, property_id, price, currency, date";

fn map_entry(row: &Row<'_>) -> rusqlite::Result<PricingEntry> {
    Ok(PricingEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        platform: row.get(2)?,
        property_id: row.get(3)?,
        price: row.get(4)?,
        currency: row.get(5)?,
        date: row.get(6)?,
    })
}

#[derive(Debug, Clone)]
pub struct PricingService {
    db: Database,
    feed: ChangeFeed,
}

impl PricingService {
    pub fn new(db: Database, feed: ChangeFeed) -> Self {
        Self { db, feed }
    }

    /// Newest first, optionally narrowed to one platform.
    pub async fn list(
        &self,
        user_id: &str,
        platform: Option<Platform>,
    ) -> Result<Vec<PricingEntry>, AppError> {
        let conn = self.db.conn().await;
        let entries = match platform {
            Some(platform) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {PRICING_COLUMNS} FROM pricing
                     WHERE user_id = ?1 AND platform = ?2 ORDER BY date DESC"
                ))?;
                let rows = stmt.query_map(params![user_id, platform], map_entry)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {PRICING_COLUMNS} FROM pricing WHERE user_id = ?1 ORDER BY date DESC"
                ))?;
                let rows = stmt.query_map([user_id], map_entry)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(entries)
    }

    pub async fn latest(&self, user_id: &str) -> Result<BTreeMap<Platform, PricingEntry>, AppError> {
        Ok(analytics::latest_pricing(&self.list(user_id, None).await?))
    }

    pub async fn analytics(&self, user_id: &str) -> Result<PricingAnalytics, AppError> {
        Ok(analytics::pricing_analytics(&self.list(user_id, None).await?))
    }

    /// Writes today's price for a property unless the stored one is identical.
    /// Returns whether anything was written.
    pub async fn record_if_changed(
        &self,
        user_id: &str,
        entry: &NewPricingEntry,
    ) -> Result<bool, AppError> {
        if !entry.price.is_finite() || entry.price < 0.0 {
            return Err(AppError::Validation(format!("invalid price {}", entry.price)));
        }

        let id = {
            let conn = self.db.conn().await;
            let existing: Option<(String, Option<f64>)> = conn
                .query_row(
                    "SELECT id, price FROM pricing
                     WHERE user_id = ?1 AND platform = ?2 AND property_id = ?3 AND date = ?4",
                    params![user_id, entry.platform, entry.property_id, entry.date],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            match existing {
                Some((_, Some(price))) if price == entry.price => return Ok(false),
                Some((id, _)) => {
                    conn.execute(
                        "UPDATE pricing SET price = ?1, currency = ?2 WHERE id = ?3",
                        params![entry.price, entry.currency, id],
                    )?;
                    id
                }
                None => {
                    let id = new_id();
                    conn.execute(
                        "INSERT INTO pricing (id, user_id, platform, property_id, price, currency, date)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                        params![
                            id,
                            user_id,
                            entry.platform,
                            entry.property_id,
                            entry.price,
                            entry.currency,
                            entry.date
                        ],
                    )?;
                    id
                }
            }
        };

        log!(
            "[DB] Updated {} price for user {}: {} {}",
            entry.platform,
            user_id,
            entry.price,
            entry.currency
        );
        self.feed.publish(Table::Pricing, ChangeKind::Update, user_id, &id);
        Ok(true)
    }
}
