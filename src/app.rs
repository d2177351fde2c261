//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - installs logging
//! - parses CLI arguments (plus `.env`)
//! - fetches World Bank indicators and builds the charts
//! - prints summaries/plots
//! - writes optional exports

use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{parse_country, BuildArgs, Command, PlotArgs};
use crate::domain::{CountrySelection, FetchConfig, RunConfig, DEFAULT_BASE_URL};
use crate::error::AppError;

pub mod pipeline;

const BASE_URL_ENV: &str = "WDI_BASE_URL";

/// Entry point for the `wdi` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();
    dotenvy::dotenv().ok();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Build(args) => handle_build(args),
        Command::Plot(args) => handle_plot(args),
    }
}

/// Logs go to stderr so `--json` output stays clean. `RUST_LOG` overrides.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_build(args: BuildArgs) -> Result<(), AppError> {
    let base_url = args
        .base_url
        .clone()
        .or_else(|| std::env::var(BASE_URL_ENV).ok())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let config = run_config_from_args(&args, base_url)?;
    info!(
        countries = config.countries.len(),
        base_url = %config.fetch.base_url,
        "building dashboard"
    );

    let run = pipeline::run_dashboard(&config)?;
    let dashboard = run.dashboard();

    if config.json {
        println!("{}", crate::io::dashboard_to_string(&dashboard)?);
    } else {
        println!("{}", crate::report::format_run_summary(&run));
    }

    if config.plot {
        for chart in &run.charts {
            println!(
                "{}",
                crate::plot::render_chart(chart, config.plot_width, config.plot_height)
            );
        }
    }

    if let Some(path) = &config.export {
        crate::io::write_dashboard_json(path, &dashboard)?;
        info!(path = %path.display(), "dashboard exported");
    }

    if config.debug {
        let path = crate::debug::write_debug_bundle(&run, &config.fetch)?;
        info!(path = %path.display(), "debug bundle written");
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let dashboard = crate::io::read_dashboard_json(&args.dashboard)?;

    let selected: Vec<_> = match args.chart {
        Some(n) => {
            let chart = n
                .checked_sub(1)
                .and_then(|i| dashboard.charts.get(i))
                .ok_or_else(|| {
                    AppError::config(format!(
                        "Chart {n} not found; the dashboard has {} chart(s).",
                        dashboard.charts.len()
                    ))
                })?;
            vec![chart]
        }
        None => dashboard.charts.iter().collect(),
    };

    for chart in selected {
        println!("{}", crate::plot::render_chart(chart, args.width, args.height));
    }
    Ok(())
}

pub fn run_config_from_args(args: &BuildArgs, base_url: String) -> Result<RunConfig, AppError> {
    if args.date_start > args.date_end {
        return Err(AppError::config(format!(
            "Invalid date range {}:{}.",
            args.date_start, args.date_end
        )));
    }
    if args.per_page == 0 {
        return Err(AppError::config("--per-page must be positive."));
    }

    let pairs = args
        .countries
        .iter()
        .map(|raw| parse_country(raw))
        .collect::<Result<Vec<_>, _>>()?;
    let countries = CountrySelection::from_pairs(pairs)?;

    Ok(RunConfig {
        countries,
        fetch: FetchConfig {
            base_url,
            date_start: args.date_start,
            date_end: args.date_end,
            per_page: args.per_page,
            timeout: Duration::from_secs(args.timeout_secs),
        },
        missing: args.missing,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        json: args.json,
        export: args.export.clone(),
        debug: args.debug,
    })
}

/// Rewrite argv so `wdi` defaults to `wdi build`.
///
/// Rules:
/// - `wdi`                       -> `wdi build`
/// - `wdi -c Canada=CAN ...`     -> `wdi build -c Canada=CAN ...`
/// - `wdi --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("build".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "build" | "plot");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "build flags".
    if arg1.starts_with('-') {
        argv.insert(1, "build".to_string());
        return argv;
    }

    argv
}
