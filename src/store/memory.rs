//! In-memory quote store with JSON persistence

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use crate::{
    errors::{AnalyzerError, AnalyzerResult},
    store::QuoteSource,
    types::PriceObservation,
    utils::{Clock, SystemClock},
};

/// Daily quotes keyed by (symbol, UTC day). A second write for the same day
/// replaces the first.
pub struct QuoteStore {
    quotes: BTreeMap<String, BTreeMap<NaiveDate, PriceObservation>>,
    clock: Arc<dyn Clock>,
}

impl QuoteStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            quotes: BTreeMap::new(),
            clock,
        }
    }

    /// Loads a store saved with [`QuoteStore::save`]. A missing file gives an
    /// empty store.
    pub fn load(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> AnalyzerResult<Self> {
        let path = path.as_ref();
        let mut store = Self::new(clock);

        if !path.exists() {
            debug!(path = %path.display(), "No quote store on disk yet");
            return Ok(store);
        }

        let bytes = fs::read(path)
            .map_err(|e| AnalyzerError::storage(format!("reading {}", path.display()), e))?;
        let observations: Vec<PriceObservation> = serde_json::from_slice(&bytes)
            .map_err(|e| AnalyzerError::parsing(format!("decoding {}", path.display()), e))?;

        store.upsert_batch(observations);
        info!(path = %path.display(), quotes = store.len(), "Loaded quote store");
        Ok(store)
    }

    /// Writes every quote as pretty JSON. The file is replaced atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> AnalyzerResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| AnalyzerError::storage(format!("creating {}", parent.display()), e))?;
        }

        let all: Vec<&PriceObservation> = self.quotes.values().flat_map(|days| days.values()).collect();
        let json = serde_json::to_vec_pretty(&all)
            .map_err(|e| AnalyzerError::parsing("encoding quote store", e))?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .map_err(|e| AnalyzerError::storage(format!("writing {}", tmp_path.display()), e))?;
        fs::rename(&tmp_path, path)
            .map_err(|e| AnalyzerError::storage(format!("replacing {}", path.display()), e))?;

        Ok(())
    }

    /// Stores `observation`, returning `true` when it replaced a quote for
    /// the same symbol and day.
    pub fn upsert(&mut self, observation: PriceObservation) -> bool {
        self.quotes
            .entry(observation.symbol.clone())
            .or_default()
            .insert(observation.day(), observation)
            .is_some()
    }

    /// Stores every observation and returns how many landed on a day that
    /// had no quote yet.
    pub fn upsert_batch(&mut self, observations: impl IntoIterator<Item = PriceObservation>) -> usize {
        observations
            .into_iter()
            .map(|observation| self.upsert(observation))
            .filter(|replaced| !replaced)
            .count()
    }

    pub fn symbols(&self) -> Vec<String> {
        self.quotes.keys().cloned().collect()
    }

    pub fn latest_timestamp(&self, symbol: &str) -> Option<DateTime<Utc>> {
        self.quotes
            .get(symbol)
            .and_then(|days| days.values().map(|obs| obs.timestamp).max())
    }

    /// Days of klines to request so the newest stored day is fetched again
    /// and every day after it is filled in. Symbols without history get
    /// `max_days`.
    pub fn incremental_fetch_days(&self, symbol: &str, max_days: u32) -> u32 {
        let Some(latest) = self.latest_timestamp(symbol) else {
            return max_days;
        };

        let gap = (self.clock.now().date_naive() - latest.date_naive()).num_days().max(0);
        u32::try_from(gap + 1).unwrap_or(max_days).clamp(1, max_days.max(1))
    }

    pub fn oldest_timestamp(&self, symbol: &str) -> Option<DateTime<Utc>> {
        self.quotes
            .get(symbol)
            .and_then(|days| days.values().map(|obs| obs.timestamp).min())
    }

    pub fn len(&self) -> usize {
        self.quotes.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for QuoteStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl QuoteSource for QuoteStore {
    /// Newest first, like the source database's `ORDER BY timestamp DESC`.
    fn get_quotes(&self, symbol: &str, days: Option<u32>) -> AnalyzerResult<Vec<PriceObservation>> {
        let Some(by_day) = self.quotes.get(symbol) else {
            return Ok(Vec::new());
        };

        // A span reaching past the representable range means no cutoff.
        let cutoff = days.and_then(|d| self.clock.now().checked_sub_signed(Duration::days(d as i64)));
        Ok(by_day
            .values()
            .rev()
            .filter(|obs| cutoff.is_none_or(|c| obs.timestamp >= c))
            .cloned()
            .collect())
    }
}
