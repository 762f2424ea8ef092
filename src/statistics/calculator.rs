//! Descriptive statistics over a slice of prices

use crate::types::Statistics;

pub fn compute_statistics(prices: &[f64]) -> Statistics {
    if prices.is_empty() {
        return Statistics::default();
    }

    let n = prices.len() as f64;
    let mean: f64 = prices.iter().sum::<f64>() / n;
    let variance: f64 = prices.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let median = median_of(prices);
    let deviations: Vec<f64> = prices.iter().map(|p| (p - median).abs()).collect();
    let mad = median_of(&deviations);

    Statistics {
        min: Some(min),
        max: Some(max),
        mean: Some(mean),
        median: Some(median),
        std: Some(std),
        mad: Some(mad),
        mean_minus_std: Some(mean - std),
        median_minus_mad: Some(median - mad),
        count: prices.len(),
    }
}

/// Middle value, or the average of the two middle values for even lengths.
/// Callers guarantee a non-empty slice.
fn median_of(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
