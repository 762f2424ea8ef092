//! Aggregation of per-window oscillation counts

use crate::{
    errors::AnalyzerResult,
    store::QuoteSource,
    types::{VolatilitySummary, VolatilityWindow, THRESHOLDS},
    volatility::{OscillationMap, VolatilityEngine},
};

/// Score weight for each threshold, in `THRESHOLDS` order.
pub const THRESHOLD_WEIGHTS: [u64; 4] = [1, 2, 3, 4];

/// Windows aggregated for a reporting period: longer periods use coarser
/// windows.
pub fn windows_for_period(period_days: u32) -> [VolatilityWindow; 3] {
    if period_days >= 180 {
        [VolatilityWindow::Days7, VolatilityWindow::Month1, VolatilityWindow::Months3]
    } else if period_days >= 90 {
        [VolatilityWindow::Hours72, VolatilityWindow::Days7, VolatilityWindow::Month1]
    } else {
        [VolatilityWindow::Hours24, VolatilityWindow::Hours72, VolatilityWindow::Days7]
    }
}

/// Thresholds 5 and 10 summed over every window; the score is the plain sum
/// of those four totals.
pub fn summarize_all_windows(oscillations: &OscillationMap) -> VolatilitySummary {
    let mut summary = VolatilitySummary::default();

    for counts in oscillations.values() {
        summary.positive_5 += counts.positive_5;
        summary.positive_10 += counts.positive_10;
        summary.negative_5 += counts.negative_5;
        summary.negative_10 += counts.negative_10;
    }

    summary.volatility_score =
        summary.positive_5 + summary.positive_10 + summary.negative_5 + summary.negative_10;
    summary
}

/// All four thresholds summed over `windows`, with the score weighted
/// 1/2/3/4 by threshold.
pub fn summarize_weighted(oscillations: &OscillationMap, windows: &[VolatilityWindow]) -> VolatilitySummary {
    let mut positive = [0u64; 4];
    let mut negative = [0u64; 4];

    for counts in windows.iter().filter_map(|w| oscillations.get(w)) {
        for (i, threshold) in THRESHOLDS.iter().enumerate() {
            positive[i] += counts.positive(*threshold);
            negative[i] += counts.negative(*threshold);
        }
    }

    let volatility_score = THRESHOLD_WEIGHTS
        .iter()
        .enumerate()
        .map(|(i, weight)| (positive[i] + negative[i]) * weight)
        .sum();

    VolatilitySummary {
        positive_5: positive[0],
        positive_10: positive[1],
        positive_15: Some(positive[2]),
        positive_20: Some(positive[3]),
        negative_5: negative[0],
        negative_10: negative[1],
        negative_15: Some(negative[2]),
        negative_20: Some(negative[3]),
        volatility_score,
    }
}

impl<S: QuoteSource> VolatilityEngine<S> {
    /// Unweighted 5/10 aggregate across all six windows.
    pub fn get_summary_stats(&self, symbol: &str, days: u32) -> AnalyzerResult<VolatilitySummary> {
        let oscillations = self.calculate_oscillations(symbol, days)?;
        Ok(summarize_all_windows(&oscillations))
    }

    /// Weighted aggregate over the windows suited to a `period_days` report.
    pub fn get_period_stats(&self, symbol: &str, period_days: u32) -> AnalyzerResult<VolatilitySummary> {
        let oscillations = self.calculate_oscillations(symbol, period_days)?;
        Ok(summarize_weighted(&oscillations, &windows_for_period(period_days)))
    }
}
