//! Utility functions and helpers

pub mod clock;
pub mod logging;
pub mod display;

pub use clock::*;
pub use logging::*;
pub use display::*;
