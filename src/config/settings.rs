//! Analyzer configuration settings and environment variable handling

use std::env;
use std::fmt;
use crate::store::{CsvColumn, CsvConfig};

// Configuration constants
pub const DEFAULT_SYMBOLS: &str = "BTC,ETH,ADA,XRP,SOL";
pub const DEFAULT_QUOTE_ASSET: &str = "EUR";
pub const DEFAULT_HISTORY_DAYS: u32 = 365;
pub const MIN_HISTORY_DAYS: u32 = 1;
pub const MAX_HISTORY_DAYS: u32 = 1000; // Binance klines limit

// Network Constants
pub const DEFAULT_BINANCE_BASE_URL: &str = "https://api.binance.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 120;

/// How much history to request per symbol on refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// From the newest stored day onwards.
    #[default]
    Incremental,
    /// The full `HISTORY_DAYS` every time.
    Full,
}

impl FetchMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "incremental" => Some(FetchMode::Incremental),
            "full" => Some(FetchMode::Full),
            _ => None,
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchMode::Incremental => write!(f, "incremental"),
            FetchMode::Full => write!(f, "full"),
        }
    }
}

/// A CSV history file to load into the store before fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvImport {
    pub path: String,
    pub symbol: String,
    pub format: CsvConfig,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub symbols: Vec<String>,
    pub quote_asset: String,
    pub history_days: u32,
    // Output locations
    pub store_path: String,
    pub report_dir: String,
    pub log_dir: String,
    // Fetch configuration
    pub binance_base_url: String,
    pub request_timeout_secs: u64,
    pub fetch_mode: FetchMode,
    pub csv_import: Option<CsvImport>,
    // Pipeline switches
    pub fetch_only: bool,
    pub report_only: bool,
}

impl Config {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to the
    /// defaults above for missing or unparseable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            symbols: parse_symbols(&lookup("SYMBOLS").unwrap_or_else(|| DEFAULT_SYMBOLS.to_string())),
            quote_asset: lookup("QUOTE_ASSET")
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_QUOTE_ASSET.to_string()),
            history_days: lookup("HISTORY_DAYS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_HISTORY_DAYS)
                .clamp(MIN_HISTORY_DAYS, MAX_HISTORY_DAYS),
            store_path: lookup("STORE_PATH")
                .unwrap_or_else(|| "output/data/quotes.json".to_string()),
            report_dir: lookup("REPORT_DIR")
                .unwrap_or_else(|| "output/reports".to_string()),
            log_dir: lookup("LOG_DIR")
                .unwrap_or_else(|| "output/logs".to_string()),
            binance_base_url: lookup("BINANCE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BINANCE_BASE_URL.to_string()),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
                .clamp(1, MAX_REQUEST_TIMEOUT_SECS),
            fetch_mode: lookup("FETCH_MODE")
                .and_then(|s| FetchMode::parse(&s))
                .unwrap_or_default(),
            csv_import: csv_import_from(&lookup),
            fetch_only: lookup("FETCH_ONLY")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(false),
            report_only: lookup("REPORT_ONLY")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(false),
        }
    }
}

/// `IMPORT_CSV` and `IMPORT_SYMBOL` must both be set; the `CSV_*` keys
/// override the default layout.
fn csv_import_from<F>(lookup: &F) -> Option<CsvImport>
where
    F: Fn(&str) -> Option<String>,
{
    let path = lookup("IMPORT_CSV").filter(|s| !s.trim().is_empty())?;
    let symbol = lookup("IMPORT_SYMBOL")
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())?;

    let defaults = CsvConfig::default();
    let format = CsvConfig {
        date_column: lookup("CSV_DATE_COLUMN")
            .map(|s| CsvColumn::parse(&s))
            .unwrap_or(defaults.date_column),
        price_column: lookup("CSV_PRICE_COLUMN")
            .map(|s| CsvColumn::parse(&s))
            .unwrap_or(defaults.price_column),
        has_header: lookup("CSV_HAS_HEADER")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.has_header),
        delimiter: lookup("CSV_DELIMITER")
            .and_then(|s| s.chars().next())
            .unwrap_or(defaults.delimiter),
        date_format: lookup("CSV_DATE_FORMAT").filter(|s| !s.trim().is_empty()),
        skip_rows: lookup("CSV_SKIP_ROWS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.skip_rows),
    };

    Some(CsvImport { path, symbol, format })
}

/// Comma-separated symbols, trimmed and upper-cased. Empty entries are
/// dropped.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
