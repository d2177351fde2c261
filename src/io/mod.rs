//! Input/output helpers.
//!
//! - dashboard JSON read/write (`export`)

pub mod export;

pub use export::*;
