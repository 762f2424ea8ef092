//! Crypto Price Analyzer - daily price history statistics and volatility
//! oscillation reports
//!
//! Daily closes are fetched from Binance into a local quote store. Each
//! symbol then gets descriptive statistics over trailing 12/6/3/1 month
//! periods and counts of large price swings over several look-back windows.

pub mod config;
pub mod types;
pub mod errors;
pub mod network;
pub mod store;
pub mod statistics;
pub mod volatility;
pub mod utils;
pub mod storage;

// Re-export commonly used items
pub use config::{Config, CONFIG};
pub use errors::{AnalyzerError, AnalyzerResult};
pub use types::*;
