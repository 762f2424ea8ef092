//! Threshold-crossing counts over lagged percentage returns

use std::collections::BTreeMap;
use tracing::{debug, info};
use crate::{
    errors::AnalyzerResult,
    store::QuoteSource,
    types::{sorted_ascending, OscillationCounts, VolatilityWindow},
};

/// Below this many observations every counter is reported as zero.
pub const MIN_OBSERVATIONS: usize = 7;

/// Default history length for oscillation analysis.
pub const DEFAULT_ANALYSIS_DAYS: u32 = 365;

pub type OscillationMap = BTreeMap<VolatilityWindow, OscillationCounts>;

/// `(p[i] - p[i-lag]) / p[i-lag] * 100` for every `i >= lag`. `prices` must
/// be ordered oldest first.
pub fn trailing_returns(prices: &[f64], lag: usize) -> Vec<f64> {
    if lag == 0 || prices.len() <= lag {
        return Vec::new();
    }

    prices
        .windows(lag + 1)
        .map(|w| (w[lag] - w[0]) / w[0] * 100.0)
        .collect()
}

pub fn count_oscillations(prices: &[f64], lag: usize) -> OscillationCounts {
    let mut counts = OscillationCounts::default();
    for return_pct in trailing_returns(prices, lag) {
        counts.record(return_pct);
    }
    counts
}

/// Zero counters for every window.
pub fn empty_oscillations() -> OscillationMap {
    VolatilityWindow::ALL
        .iter()
        .map(|&window| (window, OscillationCounts::default()))
        .collect()
}

/// Counts for every window over an oldest-first price list.
pub fn oscillations_for_prices(prices: &[f64]) -> OscillationMap {
    if prices.len() < MIN_OBSERVATIONS {
        return empty_oscillations();
    }

    VolatilityWindow::ALL
        .iter()
        .map(|&window| (window, count_oscillations(prices, window.lag())))
        .collect()
}

/// Oscillation analysis over a quote source.
pub struct VolatilityEngine<S> {
    store: S,
}

impl<S: QuoteSource> VolatilityEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Per-window threshold counts over the trailing `days` of history.
    pub fn calculate_oscillations(&self, symbol: &str, days: u32) -> AnalyzerResult<OscillationMap> {
        let quotes = self.store.get_quotes(symbol, Some(days))?;

        if quotes.len() < MIN_OBSERVATIONS {
            debug!(symbol, observations = quotes.len(), "Insufficient history for oscillations");
            return Ok(empty_oscillations());
        }

        let prices: Vec<f64> = sorted_ascending(&quotes).iter().map(|obs| obs.price).collect();
        Ok(oscillations_for_prices(&prices))
    }

    /// Runs [`Self::calculate_oscillations`] for each symbol in turn. The
    /// first store failure aborts the batch.
    pub fn analyze_all_symbols(
        &self,
        symbols: &[String],
        days: u32,
    ) -> AnalyzerResult<BTreeMap<String, OscillationMap>> {
        let mut results = BTreeMap::new();

        for symbol in symbols {
            info!(symbol = %symbol, days, "Analyzing volatility");
            results.insert(symbol.clone(), self.calculate_oscillations(symbol, days)?);
        }

        Ok(results)
    }
}
