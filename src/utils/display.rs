//! Display and printing utilities

use std::collections::BTreeMap;
use tracing::{info, warn};
use crate::{
    types::{ReportEntry, RollingPeriod, VolatilityWindow},
    volatility::{summarize_all_windows, OscillationMap},
};

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_else(|| "-".to_string())
}

fn fmt_pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:+.2}%", v * 100.0))
        .unwrap_or_else(|| "-".to_string())
}

pub fn print_report_summary(reports: &BTreeMap<String, ReportEntry>) {
    info!("\n📊 Statistical Summary ({} symbols)", reports.len());

    for entry in reports.values() {
        let report = match entry {
            ReportEntry::Report(report) => report,
            ReportEntry::Error(err) => {
                warn!("   ❌ {}: {}", err.symbol, err.error);
                continue;
            }
        };

        match &report.date_range {
            Some(range) => info!(
                "   {} ({} quotes, {} → {})",
                report.symbol, report.data_points, range.start, range.end
            ),
            None => {
                info!("   {}: no quotes stored", report.symbol);
                continue;
            }
        }

        for period in RollingPeriod::ALL {
            let Some(data) = report.periods.get(&period) else {
                continue;
            };
            if data.stats.count == 0 {
                info!("     {:<9} no data in window", period.name());
                continue;
            }

            info!(
                "     {:<9} last {} ({})  mean {}  σ {}  vs mean {}  vs mean-σ {}  score {}",
                period.name(),
                fmt_opt(data.latest_quote, 4),
                data.latest_date.as_deref().unwrap_or("-"),
                fmt_opt(data.stats.mean, 4),
                fmt_opt(data.stats.std, 4),
                fmt_pct(data.latest_deviation_from_mean_pct),
                fmt_pct(data.latest_deviation_from_mean_minus_std_pct),
                data.volatility
                    .as_ref()
                    .map(|v| v.volatility_score.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            );
        }
    }

    info!("");
}

pub fn print_volatility_summary(results: &BTreeMap<String, OscillationMap>) {
    info!("\n🌊 Oscillation Events (±5% / ±10%)");

    for (symbol, windows) in results {
        let summary = summarize_all_windows(windows);
        let per_window: Vec<String> = VolatilityWindow::ALL
            .iter()
            .filter_map(|w| {
                windows
                    .get(w)
                    .map(|c| format!("{} +{}/-{}", w.label(), c.positive_5, c.negative_5))
            })
            .collect();

        info!(
            "   {:<6} score {:>4}  +5%:{} +10%:{} -5%:{} -10%:{}  [{}]",
            symbol,
            summary.volatility_score,
            summary.positive_5,
            summary.positive_10,
            summary.negative_5,
            summary.negative_10,
            per_window.join(", ")
        );
    }

    info!("");
}
