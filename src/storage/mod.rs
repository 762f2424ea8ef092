//! Report output files

pub mod reports;

pub use reports::*;
