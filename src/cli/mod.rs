//! Command-line parsing for the World Bank indicator dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetching/reshaping code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{
    MissingPolicy, DEFAULT_DATE_END, DEFAULT_DATE_START, DEFAULT_PER_PAGE, DEFAULT_TIMEOUT_SECS,
};
use crate::error::AppError;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "wdi", version, about = "World Bank indicator dashboard builder")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch indicators, build the six charts, print a summary and optionally plot/export.
    Build(BuildArgs),
    /// Plot charts from a previously exported dashboard JSON.
    Plot(PlotArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct BuildArgs {
    /// Country as `Display Name=ISO3` (repeatable). Defaults to eight G7/G20 economies.
    #[arg(short = 'c', long = "country", value_name = "NAME=ISO3")]
    pub countries: Vec<String>,

    /// API base URL (falls back to `WDI_BASE_URL`, then the public endpoint).
    #[arg(long)]
    pub base_url: Option<String>,

    /// First year requested.
    #[arg(long, default_value_t = DEFAULT_DATE_START)]
    pub date_start: i32,

    /// Last year requested.
    #[arg(long, default_value_t = DEFAULT_DATE_END)]
    pub date_end: i32,

    /// Page-size ceiling per request.
    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: usize,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// What to do when an indicator cannot be fetched.
    #[arg(long, value_enum, default_value_t = MissingPolicy::SkipChart)]
    pub missing: MissingPolicy,

    /// Render each chart as an ASCII plot.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Print the dashboard JSON to stdout instead of the summary.
    #[arg(long)]
    pub json: bool,

    /// Export the dashboard JSON to a file.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Write a markdown debug bundle under `debug/`.
    #[arg(long)]
    pub debug: bool,
}

/// Options for plotting a saved dashboard.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Dashboard JSON file produced by `wdi build --export`.
    #[arg(long, value_name = "JSON")]
    pub dashboard: PathBuf,

    /// Plot only this chart (1-based position).
    #[arg(long)]
    pub chart: Option<usize>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Parse a `Display Name=ISO3` pair. A bare code uses itself as the name.
pub fn parse_country(raw: &str) -> Result<(String, String), AppError> {
    let (name, code) = match raw.rsplit_once('=') {
        Some((name, code)) => (name.trim(), code.trim()),
        None => (raw.trim(), raw.trim()),
    };
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::config(format!(
            "Invalid country '{raw}': expected NAME=ISO3 with a three-letter code."
        )));
    }
    let name = if name.is_empty() { code } else { name };
    Ok((name.to_string(), code.to_uppercase()))
}
