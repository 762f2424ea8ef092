//! Descriptive statistics over trailing reporting periods

pub mod calculator;
pub mod periods;
pub mod report;

pub use calculator::*;
pub use periods::*;
pub use report::*;
