//! Tabular projection of oscillation results

use serde::Serialize;
use std::collections::BTreeMap;
use crate::volatility::OscillationMap;

pub const CSV_HEADER: [&str; 10] = [
    "Symbol", "Window", "+5%", "+10%", "+15%", "+20%", "-5%", "-10%", "-15%", "-20%",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OscillationRow {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Window")]
    pub window: String,
    #[serde(rename = "+5%")]
    pub positive_5: u64,
    #[serde(rename = "+10%")]
    pub positive_10: u64,
    #[serde(rename = "+15%")]
    pub positive_15: u64,
    #[serde(rename = "+20%")]
    pub positive_20: u64,
    #[serde(rename = "-5%")]
    pub negative_5: u64,
    #[serde(rename = "-10%")]
    pub negative_10: u64,
    #[serde(rename = "-15%")]
    pub negative_15: u64,
    #[serde(rename = "-20%")]
    pub negative_20: u64,
}

impl OscillationRow {
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{}",
            csv_field(&self.symbol),
            csv_field(&self.window),
            self.positive_5,
            self.positive_10,
            self.positive_15,
            self.positive_20,
            self.negative_5,
            self.negative_10,
            self.negative_15,
            self.negative_20,
        )
    }
}

/// One row per (symbol, window), symbols in key order and windows in
/// declaration order.
pub fn oscillation_rows(results: &BTreeMap<String, OscillationMap>) -> Vec<OscillationRow> {
    results
        .iter()
        .flat_map(|(symbol, windows)| {
            windows.iter().map(move |(window, counts)| OscillationRow {
                symbol: symbol.clone(),
                window: window.label().to_string(),
                positive_5: counts.positive_5,
                positive_10: counts.positive_10,
                positive_15: counts.positive_15,
                positive_20: counts.positive_20,
                negative_5: counts.negative_5,
                negative_10: counts.negative_10,
                negative_15: counts.negative_15,
                negative_20: counts.negative_20,
            })
        })
        .collect()
}

/// Header plus one line per row, newline terminated.
pub fn rows_to_csv(rows: &[OscillationRow]) -> String {
    let mut out = CSV_HEADER.join(",");
    out.push('\n');
    for row in rows {
        out.push_str(&row.to_csv_line());
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
