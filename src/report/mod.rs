//! Reporting utilities: run summaries and chart tables for the terminal.

pub mod format;

pub use format::*;
