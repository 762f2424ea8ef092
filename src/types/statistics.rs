//! Rolling-period statistics types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use super::VolatilitySummary;

/// Descriptive statistics over a set of prices. Every numeric field is
/// `None` when `count == 0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Population standard deviation (divisor N).
    pub std: Option<f64>,
    /// Median absolute deviation.
    pub mad: Option<f64>,
    pub mean_minus_std: Option<f64>,
    pub median_minus_mad: Option<f64>,
    pub count: usize,
}

/// Trailing reporting windows anchored at "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RollingPeriod {
    #[serde(rename = "12_months")]
    TwelveMonths,
    #[serde(rename = "6_months")]
    SixMonths,
    #[serde(rename = "3_months")]
    ThreeMonths,
    #[serde(rename = "1_month")]
    OneMonth,
}

impl RollingPeriod {
    pub const ALL: [RollingPeriod; 4] = [
        RollingPeriod::TwelveMonths,
        RollingPeriod::SixMonths,
        RollingPeriod::ThreeMonths,
        RollingPeriod::OneMonth,
    ];

    pub fn days(self) -> u32 {
        match self {
            RollingPeriod::TwelveMonths => 365,
            RollingPeriod::SixMonths => 182,
            RollingPeriod::ThreeMonths => 91,
            RollingPeriod::OneMonth => 30,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RollingPeriod::TwelveMonths => "12_months",
            RollingPeriod::SixMonths => "6_months",
            RollingPeriod::ThreeMonths => "3_months",
            RollingPeriod::OneMonth => "1_month",
        }
    }
}

/// Metrics for one rolling period. An empty period has `stats.count == 0`
/// and every other field `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodReport {
    pub stats: Statistics,
    pub latest_quote: Option<f64>,
    /// Formatted `DD/MM/YYYY`.
    pub latest_date: Option<String>,
    pub second_latest_quote: Option<f64>,
    pub second_latest_date: Option<String>,

    pub latest_deviation_from_mean: Option<f64>,
    pub latest_deviation_from_mean_pct: Option<f64>,
    pub latest_deviation_from_mean_minus_std: Option<f64>,
    pub latest_deviation_from_mean_minus_std_pct: Option<f64>,
    pub second_deviation_from_mean: Option<f64>,
    pub second_deviation_from_mean_pct: Option<f64>,
    pub second_deviation_from_mean_minus_std: Option<f64>,
    pub second_deviation_from_mean_minus_std_pct: Option<f64>,

    pub latest_deviation_from_median: Option<f64>,
    pub latest_deviation_from_median_pct: Option<f64>,
    pub latest_deviation_from_median_minus_mad: Option<f64>,
    pub latest_deviation_from_median_minus_mad_pct: Option<f64>,
    pub second_deviation_from_median: Option<f64>,
    pub second_deviation_from_median_pct: Option<f64>,
    pub second_deviation_from_median_minus_mad: Option<f64>,
    pub second_deviation_from_median_minus_mad_pct: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility: Option<VolatilitySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Full statistical report for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub symbol: String,
    pub data_points: usize,
    pub date_range: Option<DateRange>,
    pub periods: BTreeMap<RollingPeriod, PeriodReport>,
}

/// Stand-in for a symbol whose quotes could not be fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub symbol: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportEntry {
    Report(Report),
    Error(ErrorReport),
}

impl ReportEntry {
    pub fn symbol(&self) -> &str {
        match self {
            ReportEntry::Report(report) => &report.symbol,
            ReportEntry::Error(err) => &err.symbol,
        }
    }

    pub fn as_report(&self) -> Option<&Report> {
        match self {
            ReportEntry::Report(report) => Some(report),
            ReportEntry::Error(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ReportEntry::Error(_))
    }
}
