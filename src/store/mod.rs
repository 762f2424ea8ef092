//! Price history storage

pub mod source;
pub mod memory;
pub mod csv_import;

pub use source::*;
pub use memory::*;
pub use csv_import::*;
