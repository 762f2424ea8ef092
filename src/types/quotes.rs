//! Price observation types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single closing price for one symbol at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub symbol: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

impl PriceObservation {
    pub fn new(symbol: impl Into<String>, price: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            timestamp,
        }
    }

    /// UTC calendar day, the store's upsert key.
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Returns a copy of `series` ordered most recent first.
pub fn sorted_descending(series: &[PriceObservation]) -> Vec<PriceObservation> {
    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}

/// Returns a copy of `series` ordered oldest first.
pub fn sorted_ascending(series: &[PriceObservation]) -> Vec<PriceObservation> {
    let mut sorted = series.to_vec();
    sorted.sort_by_key(|obs| obs.timestamp);
    sorted
}
