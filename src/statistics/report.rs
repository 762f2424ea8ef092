//! Per-symbol report assembly

use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::{error, warn};
use crate::{
    statistics::StatisticalAnalyzer,
    store::QuoteSource,
    types::{DateRange, ErrorReport, PriceObservation, Report, ReportEntry},
    volatility::VolatilityEngine,
};

impl StatisticalAnalyzer {
    /// Wraps the rolling-period analysis with series metadata. An empty
    /// series yields an empty `periods` map, unlike a series whose windows
    /// happen to contain no observations.
    pub fn generate_report(&self, symbol: &str, observations: &[PriceObservation]) -> Report {
        if observations.is_empty() {
            return Report {
                symbol: symbol.to_string(),
                data_points: 0,
                date_range: None,
                periods: BTreeMap::new(),
            };
        }

        let start = observations.iter().map(|obs| obs.timestamp).min();
        let end = observations.iter().map(|obs| obs.timestamp).max();
        let date_range = start.zip(end).map(|(start, end)| DateRange {
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
        });

        Report {
            symbol: symbol.to_string(),
            data_points: observations.len(),
            date_range,
            periods: self.analyze_rolling_periods(observations),
        }
    }

    /// Builds a report per symbol using `fetch` to obtain quotes. A failing
    /// fetch becomes an [`ErrorReport`] for that symbol and the batch
    /// continues.
    pub fn batch_generate_reports<F, E>(
        &self,
        symbols: &[String],
        mut fetch: F,
    ) -> BTreeMap<String, ReportEntry>
    where
        F: FnMut(&str) -> Result<Vec<PriceObservation>, E>,
        E: Display,
    {
        let mut reports = BTreeMap::new();

        for symbol in symbols {
            let entry = match fetch(symbol) {
                Ok(quotes) => ReportEntry::Report(self.generate_report(symbol, &quotes)),
                Err(e) => {
                    error!(symbol = %symbol, error = %e, "Error generating report");
                    ReportEntry::Error(ErrorReport {
                        symbol: symbol.clone(),
                        error: e.to_string(),
                    })
                }
            };
            reports.insert(symbol.clone(), entry);
        }

        reports
    }
}

/// Fills `volatility` on every period of every successful report with
/// [`VolatilityEngine::get_period_stats`] for that period's length. Returns
/// the number of periods filled; store failures are logged and skipped.
pub fn attach_period_volatility<S: QuoteSource>(
    reports: &mut BTreeMap<String, ReportEntry>,
    engine: &VolatilityEngine<S>,
) -> usize {
    let mut attached = 0;

    for entry in reports.values_mut() {
        let ReportEntry::Report(report) = entry else {
            continue;
        };

        for (period, period_report) in report.periods.iter_mut() {
            match engine.get_period_stats(&report.symbol, period.days()) {
                Ok(summary) => {
                    period_report.volatility = Some(summary);
                    attached += 1;
                }
                Err(e) => {
                    warn!(
                        symbol = %report.symbol,
                        period = period.name(),
                        error = %e,
                        "Skipping period volatility"
                    );
                }
            }
        }
    }

    attached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::AnalyzerError,
        types::RollingPeriod,
        utils::FixedClock,
    };
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap()
    }

    fn analyzer() -> StatisticalAnalyzer {
        StatisticalAnalyzer::new(Arc::new(FixedClock(now())))
    }

    fn series(symbol: &str, prices: &[f64]) -> Vec<PriceObservation> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PriceObservation::new(symbol, p, now() - Duration::days(i as i64)))
            .collect()
    }

    #[test]
    fn empty_series_has_no_periods() {
        let report = analyzer().generate_report("ADA", &[]);
        assert_eq!(report.data_points, 0);
        assert!(report.date_range.is_none());
        assert!(report.periods.is_empty());
    }

    #[test]
    fn stale_series_still_lists_every_period() {
        let old = vec![PriceObservation::new("ADA", 1.0, now() - Duration::days(800))];
        let report = analyzer().generate_report("ADA", &old);
        assert_eq!(report.data_points, 1);
        assert_eq!(report.periods.len(), 4);
        assert!(report.periods.values().all(|p| p.stats.count == 0));
    }

    #[test]
    fn date_range_spans_series() {
        let report = analyzer().generate_report("BTC", &series("BTC", &[3.0, 2.0, 1.0]));
        let range = report.date_range.unwrap();
        assert_eq!(range.start, (now() - Duration::days(2)).to_rfc3339());
        assert_eq!(range.end, now().to_rfc3339());
        assert_eq!(report.data_points, 3);
        assert_eq!(report.periods[&RollingPeriod::OneMonth].latest_quote, Some(3.0));
    }

    #[test]
    fn failing_symbol_does_not_abort_batch() {
        let symbols: Vec<String> = ["BTC", "BAD", "ETH"].iter().map(|s| s.to_string()).collect();
        let reports = analyzer().batch_generate_reports(&symbols, |symbol| {
            if symbol == "BAD" {
                Err(AnalyzerError::price_source(symbol, "boom"))
            } else {
                Ok(series(symbol, &[10.0, 11.0]))
            }
        });

        assert_eq!(reports.len(), 3);
        assert!(reports["BTC"].as_report().is_some());
        assert!(reports["ETH"].as_report().is_some());

        let bad = serde_json::to_value(&reports["BAD"]).unwrap();
        let keys: Vec<&String> = bad.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["error", "symbol"]);
        assert_eq!(bad["error"], "Price source failed for BAD: boom");
    }
}
