//! Rolling-period analysis anchored at the clock's "now"

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use crate::{
    statistics::compute_statistics,
    types::{sorted_descending, PeriodReport, PriceObservation, RollingPeriod},
    utils::{Clock, SystemClock},
};

const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Produces per-period statistics and deviation signals for one symbol's
/// price series.
pub struct StatisticalAnalyzer {
    clock: Arc<dyn Clock>,
}

impl StatisticalAnalyzer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Analyzer reading wall-clock time.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Statistics for every [`RollingPeriod`]. `now` is captured once for
    /// all four windows.
    pub fn analyze_rolling_periods(
        &self,
        series: &[PriceObservation],
    ) -> BTreeMap<RollingPeriod, PeriodReport> {
        analyze_rolling_periods_at(series, self.clock.now())
    }
}

pub fn analyze_rolling_periods_at(
    series: &[PriceObservation],
    now: DateTime<Utc>,
) -> BTreeMap<RollingPeriod, PeriodReport> {
    let newest_first = sorted_descending(series);

    RollingPeriod::ALL
        .iter()
        .map(|&period| {
            let cutoff = now - Duration::days(period.days() as i64);
            let window: Vec<PriceObservation> = newest_first
                .iter()
                .filter(|obs| obs.timestamp >= cutoff)
                .cloned()
                .collect();
            (period, analyze_period(&window))
        })
        .collect()
}

/// `window` must be ordered most recent first.
fn analyze_period(window: &[PriceObservation]) -> PeriodReport {
    let Some(latest) = window.first() else {
        return PeriodReport::default();
    };
    let second = window.get(1);

    let prices: Vec<f64> = window.iter().map(|obs| obs.price).collect();
    let stats = compute_statistics(&prices);

    let (latest_dev_mean, latest_dev_mean_pct) = deviation(Some(latest.price), stats.mean);
    let (latest_dev_mean_std, latest_dev_mean_std_pct) =
        deviation(Some(latest.price), stats.mean_minus_std);
    let (latest_dev_median, latest_dev_median_pct) = deviation(Some(latest.price), stats.median);
    let (latest_dev_median_mad, latest_dev_median_mad_pct) =
        deviation(Some(latest.price), stats.median_minus_mad);

    let second_price = second.map(|obs| obs.price);
    let (second_dev_mean, second_dev_mean_pct) = deviation(second_price, stats.mean);
    let (second_dev_mean_std, second_dev_mean_std_pct) = deviation(second_price, stats.mean_minus_std);
    let (second_dev_median, second_dev_median_pct) = deviation(second_price, stats.median);
    let (second_dev_median_mad, second_dev_median_mad_pct) =
        deviation(second_price, stats.median_minus_mad);

    PeriodReport {
        stats,
        latest_quote: Some(latest.price),
        latest_date: Some(latest.timestamp.format(DISPLAY_DATE_FORMAT).to_string()),
        second_latest_quote: second_price,
        second_latest_date: second.map(|obs| obs.timestamp.format(DISPLAY_DATE_FORMAT).to_string()),

        latest_deviation_from_mean: latest_dev_mean,
        latest_deviation_from_mean_pct: latest_dev_mean_pct,
        latest_deviation_from_mean_minus_std: latest_dev_mean_std,
        latest_deviation_from_mean_minus_std_pct: latest_dev_mean_std_pct,
        second_deviation_from_mean: second_dev_mean,
        second_deviation_from_mean_pct: second_dev_mean_pct,
        second_deviation_from_mean_minus_std: second_dev_mean_std,
        second_deviation_from_mean_minus_std_pct: second_dev_mean_std_pct,

        latest_deviation_from_median: latest_dev_median,
        latest_deviation_from_median_pct: latest_dev_median_pct,
        latest_deviation_from_median_minus_mad: latest_dev_median_mad,
        latest_deviation_from_median_minus_mad_pct: latest_dev_median_mad_pct,
        second_deviation_from_median: second_dev_median,
        second_deviation_from_median_pct: second_dev_median_pct,
        second_deviation_from_median_minus_mad: second_dev_median_mad,
        second_deviation_from_median_minus_mad_pct: second_dev_median_mad_pct,

        volatility: None,
    }
}

/// Absolute and fractional deviation of `price` from `baseline`. Both are
/// `None` when either input is missing or the baseline is zero.
fn deviation(price: Option<f64>, baseline: Option<f64>) -> (Option<f64>, Option<f64>) {
    match (price, baseline) {
        (Some(price), Some(baseline)) if baseline != 0.0 => {
            let diff = price - baseline;
            (Some(diff), Some(diff / baseline))
        }
        _ => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::FixedClock;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap()
    }

    fn obs(days_ago: i64, price: f64) -> PriceObservation {
        PriceObservation::new("BTC", price, now() - Duration::days(days_ago))
    }

    fn analyzer() -> StatisticalAnalyzer {
        StatisticalAnalyzer::new(Arc::new(FixedClock(now())))
    }

    #[test]
    fn window_without_observations_is_empty_not_an_error() {
        // Only data older than 30 days: the 1-month window is empty.
        let series = vec![obs(100, 10.0), obs(60, 12.0)];
        let periods = analyzer().analyze_rolling_periods(&series);

        let month = &periods[&RollingPeriod::OneMonth];
        assert_eq!(month.stats.count, 0);
        assert!(month.latest_quote.is_none());
        assert!(month.latest_deviation_from_mean.is_none());
        assert!(month.latest_deviation_from_mean_pct.is_none());
        assert!(month.second_deviation_from_mean_minus_std_pct.is_none());

        assert_eq!(periods[&RollingPeriod::ThreeMonths].stats.count, 1);
        assert_eq!(periods[&RollingPeriod::SixMonths].stats.count, 2);
    }

    #[test]
    fn latest_is_most_recent_regardless_of_input_order() {
        let series = vec![obs(3, 90.0), obs(1, 110.0), obs(2, 100.0)];
        let periods = analyzer().analyze_rolling_periods(&series);
        let month = &periods[&RollingPeriod::OneMonth];

        assert_eq!(month.latest_quote, Some(110.0));
        assert_eq!(month.second_latest_quote, Some(100.0));
        assert_eq!(month.latest_date.as_deref(), Some("29/06/2025"));
        assert_eq!(month.second_latest_date.as_deref(), Some("28/06/2025"));

        // mean = 100
        assert_eq!(month.latest_deviation_from_mean, Some(10.0));
        assert!((month.latest_deviation_from_mean_pct.unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(month.second_deviation_from_mean, Some(0.0));
    }

    #[test]
    fn deviation_from_mean_minus_std() {
        let series = vec![obs(2, 90.0), obs(1, 110.0)];
        let periods = analyzer().analyze_rolling_periods(&series);
        let month = &periods[&RollingPeriod::OneMonth];

        // mean 100, population std 10 -> baseline 90
        assert_eq!(month.stats.mean_minus_std, Some(90.0));
        assert_eq!(month.latest_deviation_from_mean_minus_std, Some(20.0));
        let pct = month.latest_deviation_from_mean_minus_std_pct.unwrap();
        assert!((pct - 20.0 / 90.0).abs() < 1e-12);
        assert_eq!(month.second_deviation_from_mean_minus_std, Some(0.0));
    }

    #[test]
    fn zero_baseline_nulls_the_metric() {
        // mean 1, std 1 -> mean_minus_std == 0
        let series = vec![obs(2, 0.0), obs(1, 2.0)];
        let periods = analyzer().analyze_rolling_periods(&series);
        let month = &periods[&RollingPeriod::OneMonth];

        assert_eq!(month.stats.mean_minus_std, Some(0.0));
        assert!(month.latest_deviation_from_mean_minus_std.is_none());
        assert!(month.latest_deviation_from_mean_minus_std_pct.is_none());
        assert_eq!(month.latest_deviation_from_mean, Some(1.0));
    }

    #[test]
    fn single_observation_has_no_second_metrics() {
        let periods = analyzer().analyze_rolling_periods(&[obs(5, 50.0)]);
        let month = &periods[&RollingPeriod::OneMonth];

        assert_eq!(month.stats.count, 1);
        assert_eq!(month.latest_quote, Some(50.0));
        assert!(month.second_latest_quote.is_none());
        assert!(month.second_latest_date.is_none());
        assert!(month.second_deviation_from_mean.is_none());
        assert!(month.second_deviation_from_median_pct.is_none());
    }

    #[test]
    fn cutoff_is_inclusive() {
        let periods = analyzer().analyze_rolling_periods(&[obs(30, 1.0), obs(31, 2.0)]);
        assert_eq!(periods[&RollingPeriod::OneMonth].stats.count, 1);
        assert_eq!(periods[&RollingPeriod::ThreeMonths].stats.count, 2);
    }

    #[test]
    fn every_period_is_present() {
        let periods = analyzer().analyze_rolling_periods(&[]);
        assert_eq!(periods.len(), 4);
        assert!(periods.values().all(|p| p.stats.count == 0));
    }
}
