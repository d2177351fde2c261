//! `wdi-charts` library crate.
//!
//! The binary (`wdi`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes or hitting the network
//! - the chart builders are reusable by other front-ends (e.g. a web server)

pub mod app;
pub mod charts;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
