//! Price history import from CSV exports

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use crate::{
    errors::{AnalyzerError, AnalyzerResult},
    store::QuoteStore,
    types::PriceObservation,
};

/// Tried in order when no explicit format is configured. Day-first wins
/// over month-first for ambiguous dates.
const DATE_FORMATS: [&str; 6] = ["%Y-%m-%d", "%d-%m-%Y", "%m-%d-%Y", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%d-%m-%Y %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

const CURRENCY_SYMBOLS: [char; 4] = ['€', '$', '£', '¥'];

/// A column picked by header name or by zero-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvColumn {
    Name(String),
    Index(usize),
}

impl CsvColumn {
    /// Digits select a position, anything else a header name.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse() {
            Ok(index) => CsvColumn::Index(index),
            Err(_) => CsvColumn::Name(raw.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvConfig {
    pub date_column: CsvColumn,
    pub price_column: CsvColumn,
    pub has_header: bool,
    pub delimiter: char,
    /// A chrono format string, or `None` to try the common formats.
    pub date_format: Option<String>,
    /// Lines dropped before the header.
    pub skip_rows: usize,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            date_column: CsvColumn::Index(0),
            price_column: CsvColumn::Index(1),
            has_header: true,
            delimiter: ',',
            date_format: None,
            skip_rows: 0,
        }
    }
}

/// Parses CSV text into observations for `symbol`. Rows with too few
/// columns or an unreadable date or price are logged and skipped; a named
/// column missing from the header fails the whole import.
pub fn parse_csv_quotes(content: &str, symbol: &str, config: &CsvConfig) -> AnalyzerResult<Vec<PriceObservation>> {
    let symbol = symbol.trim().to_uppercase();
    let mut lines = content
        .lines()
        .enumerate()
        .skip(config.skip_rows)
        .filter(|(_, line)| !line.trim().is_empty());

    let header = if config.has_header {
        let (_, line) = lines.next().ok_or_else(|| {
            AnalyzerError::parsing("CSV header", anyhow!("file has no header row"))
        })?;
        Some(split_line(line, config.delimiter))
    } else {
        None
    };

    let date_idx = column_index(&config.date_column, header.as_deref())?;
    let price_idx = column_index(&config.price_column, header.as_deref())?;

    let mut observations = Vec::new();
    for (line_no, line) in lines {
        let row = split_line(line, config.delimiter);
        let (Some(date_raw), Some(price_raw)) = (row.get(date_idx), row.get(price_idx)) else {
            warn!(row = line_no + 1, "CSV row has too few columns, skipping");
            continue;
        };

        let parsed = parse_date(date_raw, config.date_format.as_deref())
            .zip(parse_price(price_raw));
        match parsed {
            Some((timestamp, price)) => {
                observations.push(PriceObservation::new(symbol.clone(), price, timestamp))
            }
            None => warn!(
                row = line_no + 1,
                date = %date_raw,
                price = %price_raw,
                "Unreadable CSV row, skipping"
            ),
        }
    }

    Ok(observations)
}

/// Reads `path` and parses it with [`parse_csv_quotes`].
pub fn read_csv_quotes(path: impl AsRef<Path>, symbol: &str, config: &CsvConfig) -> AnalyzerResult<Vec<PriceObservation>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| AnalyzerError::storage(format!("reading {}", path.display()), e))?;
    parse_csv_quotes(&content, symbol, config)
}

impl QuoteStore {
    /// Upserts every readable row of the CSV at `path` and returns the number
    /// of rows imported.
    pub fn import_csv(&mut self, path: impl AsRef<Path>, symbol: &str, config: &CsvConfig) -> AnalyzerResult<usize> {
        let path = path.as_ref();
        let observations = read_csv_quotes(path, symbol, config)?;
        let imported = observations.len();
        let new_days = self.upsert_batch(observations);

        info!(path = %path.display(), symbol, imported, new_days, "Imported CSV history");
        Ok(imported)
    }
}

fn column_index(column: &CsvColumn, header: Option<&[String]>) -> AnalyzerResult<usize> {
    match (column, header) {
        (CsvColumn::Index(index), _) => Ok(*index),
        (CsvColumn::Name(name), Some(header)) => header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AnalyzerError::parsing("CSV header", anyhow!("column '{}' not found", name))),
        (CsvColumn::Name(name), None) => Err(AnalyzerError::parsing(
            "CSV columns",
            anyhow!("column '{}' named but the file has no header", name),
        )),
    }
}

/// Splits one line on `delimiter`, honouring double-quoted fields.
fn split_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => fields.push(std::mem::take(&mut field).trim().to_string()),
            c => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

fn parse_date(raw: &str, format: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Some(format) = format {
        return NaiveDateTime::parse_from_str(raw, format)
            .map(|dt| dt.and_utc())
            .or_else(|_| NaiveDate::parse_from_str(raw, format).map(midnight))
            .ok();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .map(|dt| dt.and_utc())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
                .map(midnight)
        })
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Strips currency symbols and accepts a decimal comma.
fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::QuoteSource;
    use crate::utils::FixedClock;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn common_date_formats_are_recognized() {
        assert_eq!(parse_date("2024-03-05", None), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("05-03-2024", None), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("2024/03/05", None), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("05/03/2024", None), Some(day(2024, 3, 5)));
        // Only valid month-first
        assert_eq!(parse_date("12/31/2024", None), Some(day(2024, 12, 31)));
        assert_eq!(
            parse_date("2024-03-05 14:30:00", None),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap())
        );
        assert_eq!(
            parse_date("2024-03-05T10:00:00+02:00", None),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap())
        );
        assert_eq!(parse_date("yesterday", None), None);
    }

    #[test]
    fn explicit_format_is_used_alone() {
        assert_eq!(parse_date("05.03.2024", Some("%d.%m.%Y")), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("2024-03-05", Some("%d.%m.%Y")), None);
    }

    #[test]
    fn prices_drop_currency_symbols() {
        assert_eq!(parse_price(" €42.5 "), Some(42.5));
        assert_eq!(parse_price("$1000"), Some(1000.0));
        assert_eq!(parse_price("0,25"), Some(0.25));
        assert_eq!(parse_price("n/a"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn named_columns_and_bad_rows() {
        let csv = "\
exported by some tool
Date;Open;Close
2024-01-01;1,0;\"1,5\"
2024-01-02;2,0
not a date;3,0;3,5
2024-01-04;4,0;oops

2024-01-05;5,0;€5,5
";
        let config = CsvConfig {
            date_column: CsvColumn::parse("Date"),
            price_column: CsvColumn::parse("Close"),
            delimiter: ';',
            skip_rows: 1,
            ..CsvConfig::default()
        };

        let quotes = parse_csv_quotes(csv, "btc", &config).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].symbol, "BTC");
        assert_eq!(quotes[0].price, 1.5);
        assert_eq!(quotes[1].timestamp, day(2024, 1, 5));
        assert_eq!(quotes[1].price, 5.5);
    }

    #[test]
    fn missing_named_column_fails() {
        let config = CsvConfig {
            price_column: CsvColumn::parse("Close"),
            ..CsvConfig::default()
        };
        let err = parse_csv_quotes("Date,Price\n2024-01-01,1\n", "ETH", &config).unwrap_err();
        assert!(matches!(err, AnalyzerError::DataParsing { .. }));

        let headerless = CsvConfig {
            has_header: false,
            date_column: CsvColumn::parse("Date"),
            ..CsvConfig::default()
        };
        assert!(parse_csv_quotes("2024-01-01,1\n", "ETH", &headerless).is_err());
    }

    #[test]
    fn positional_columns_without_header() {
        let config = CsvConfig {
            has_header: false,
            date_column: CsvColumn::Index(1),
            price_column: CsvColumn::Index(0),
            ..CsvConfig::default()
        };
        let quotes = parse_csv_quotes("10.5,2024-02-01\n11.5,2024-02-02\n", "SOL", &config).unwrap();
        let prices: Vec<f64> = quotes.iter().map(|q| q.price).collect();
        assert_eq!(prices, vec![10.5, 11.5]);
    }

    #[test]
    fn import_upserts_into_store() {
        let path = std::env::temp_dir().join(format!("history-{}.csv", uuid::Uuid::new_v4()));
        fs::write(&path, "date,price\n2024-01-01,100\n2024-01-02,101\n2024-01-02,102\n").unwrap();

        let mut store = QuoteStore::new(Arc::new(FixedClock(day(2024, 1, 3))));
        let imported = store.import_csv(&path, "ada", &CsvConfig::default()).unwrap();

        assert_eq!(imported, 3);
        let quotes = store.get_quotes("ADA", None).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].price, 102.0);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_storage_error() {
        let mut store = QuoteStore::default();
        let path = std::env::temp_dir().join(format!("absent-{}.csv", uuid::Uuid::new_v4()));
        assert!(matches!(
            store.import_csv(&path, "BTC", &CsvConfig::default()),
            Err(AnalyzerError::Storage { .. })
        ));
    }
}
