//! Report persistence

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;
use crate::{
    errors::{AnalyzerError, AnalyzerResult},
    types::ReportEntry,
    volatility::{rows_to_csv, OscillationRow},
};

pub const VOLATILITY_CSV_NAME: &str = "volatility_analysis.csv";

#[derive(Debug, Serialize)]
pub struct ReportRun<'a> {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub reports: &'a BTreeMap<String, ReportEntry>,
}

/// Writes `reports_<date>.json` under `dir` and returns its path.
pub fn save_reports(dir: impl AsRef<Path>, reports: &BTreeMap<String, ReportEntry>) -> AnalyzerResult<PathBuf> {
    let dir = dir.as_ref();
    ensure_dir(dir)?;

    let run = ReportRun {
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        reports,
    };
    let path = dir.join(format!("reports_{}.json", run.generated_at.format("%Y-%m-%d")));

    let json = serde_json::to_vec_pretty(&run)
        .map_err(|e| AnalyzerError::parsing("encoding report run", e))?;
    fs::write(&path, json)
        .map_err(|e| AnalyzerError::storage(format!("writing {}", path.display()), e))?;

    info!(
        run_id = %run.run_id,
        symbols = reports.len(),
        failed = reports.values().filter(|r| r.is_error()).count(),
        path = %path.display(),
        "Saved statistical reports"
    );

    Ok(path)
}

/// Writes the oscillation table as CSV under `dir` and returns its path.
pub fn save_volatility_csv(dir: impl AsRef<Path>, rows: &[OscillationRow]) -> AnalyzerResult<PathBuf> {
    let dir = dir.as_ref();
    ensure_dir(dir)?;

    let path = dir.join(VOLATILITY_CSV_NAME);
    fs::write(&path, rows_to_csv(rows))
        .map_err(|e| AnalyzerError::storage(format!("writing {}", path.display()), e))?;

    info!(rows = rows.len(), path = %path.display(), "Volatility analysis exported");
    Ok(path)
}

fn ensure_dir(dir: &Path) -> AnalyzerResult<()> {
    fs::create_dir_all(dir)
        .map_err(|e| AnalyzerError::storage(format!("creating {}", dir.display()), e))
}
