//! Volatility oscillation types

use serde::{Deserialize, Serialize};

/// Percentage thresholds counted for every window.
pub const THRESHOLDS: [u32; 4] = [5, 10, 15, 20];

/// Rolling-return lag windows. The lag is measured in observations, not
/// calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VolatilityWindow {
    #[serde(rename = "24h")]
    Hours24,
    #[serde(rename = "72h")]
    Hours72,
    #[serde(rename = "7d")]
    Days7,
    #[serde(rename = "1M")]
    Month1,
    #[serde(rename = "3M")]
    Months3,
    #[serde(rename = "6M")]
    Months6,
}

impl VolatilityWindow {
    pub const ALL: [VolatilityWindow; 6] = [
        VolatilityWindow::Hours24,
        VolatilityWindow::Hours72,
        VolatilityWindow::Days7,
        VolatilityWindow::Month1,
        VolatilityWindow::Months3,
        VolatilityWindow::Months6,
    ];

    pub fn lag(self) -> usize {
        match self {
            VolatilityWindow::Hours24 => 1,
            VolatilityWindow::Hours72 => 3,
            VolatilityWindow::Days7 => 7,
            VolatilityWindow::Month1 => 30,
            VolatilityWindow::Months3 => 90,
            VolatilityWindow::Months6 => 180,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VolatilityWindow::Hours24 => "24h",
            VolatilityWindow::Hours72 => "72h",
            VolatilityWindow::Days7 => "7d",
            VolatilityWindow::Month1 => "1M",
            VolatilityWindow::Months3 => "3M",
            VolatilityWindow::Months6 => "6M",
        }
    }
}

/// Threshold-crossing counters for one window. Thresholds overlap: a +17%
/// return increments `positive_5`, `positive_10` and `positive_15`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OscillationCounts {
    pub positive_5: u64,
    pub positive_10: u64,
    pub positive_15: u64,
    pub positive_20: u64,
    pub negative_5: u64,
    pub negative_10: u64,
    pub negative_15: u64,
    pub negative_20: u64,
}

impl OscillationCounts {
    /// Counts a single trailing return (in percent) against every threshold.
    pub fn record(&mut self, return_pct: f64) {
        for threshold in THRESHOLDS {
            let t = threshold as f64;
            if return_pct >= t {
                *self.positive_mut(threshold) += 1;
            }
            if return_pct <= -t {
                *self.negative_mut(threshold) += 1;
            }
        }
    }

    pub fn positive(&self, threshold: u32) -> u64 {
        match threshold {
            5 => self.positive_5,
            10 => self.positive_10,
            15 => self.positive_15,
            20 => self.positive_20,
            _ => 0,
        }
    }

    pub fn negative(&self, threshold: u32) -> u64 {
        match threshold {
            5 => self.negative_5,
            10 => self.negative_10,
            15 => self.negative_15,
            20 => self.negative_20,
            _ => 0,
        }
    }

    fn positive_mut(&mut self, threshold: u32) -> &mut u64 {
        match threshold {
            5 => &mut self.positive_5,
            10 => &mut self.positive_10,
            15 => &mut self.positive_15,
            _ => &mut self.positive_20,
        }
    }

    fn negative_mut(&mut self, threshold: u32) -> &mut u64 {
        match threshold {
            5 => &mut self.negative_5,
            10 => &mut self.negative_10,
            15 => &mut self.negative_15,
            _ => &mut self.negative_20,
        }
    }
}

/// Counters aggregated over a subset of windows. The 15/20 totals are absent
/// when the aggregate only covers thresholds 5 and 10.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolatilitySummary {
    #[serde(rename = "volatility_positive_5")]
    pub positive_5: u64,
    #[serde(rename = "volatility_positive_10")]
    pub positive_10: u64,
    #[serde(rename = "volatility_positive_15", default, skip_serializing_if = "Option::is_none")]
    pub positive_15: Option<u64>,
    #[serde(rename = "volatility_positive_20", default, skip_serializing_if = "Option::is_none")]
    pub positive_20: Option<u64>,
    #[serde(rename = "volatility_negative_5")]
    pub negative_5: u64,
    #[serde(rename = "volatility_negative_10")]
    pub negative_10: u64,
    #[serde(rename = "volatility_negative_15", default, skip_serializing_if = "Option::is_none")]
    pub negative_15: Option<u64>,
    #[serde(rename = "volatility_negative_20", default, skip_serializing_if = "Option::is_none")]
    pub negative_20: Option<u64>,
    pub volatility_score: u64,
}
