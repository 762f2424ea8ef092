//! Error types

pub mod analyzer_error;

pub use analyzer_error::*;
