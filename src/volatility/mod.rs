//! Volatility oscillation counting and multi-window aggregation

pub mod calculator;
pub mod multi_timeframe;
pub mod export;

pub use calculator::*;
pub use multi_timeframe::*;
pub use export::*;
