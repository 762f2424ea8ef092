//! Price fetching over HTTP

pub mod providers;
pub mod retry;

pub use providers::*;
pub use retry::*;
