//! Core data types and structures

pub mod quotes;
pub mod statistics;
pub mod volatility;

pub use quotes::*;
pub use statistics::*;
pub use volatility::*;
