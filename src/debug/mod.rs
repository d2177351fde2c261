//! Debug bundle writer for inspecting fetched indicators and built charts.

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::pipeline::RunOutput;
use crate::data::indicator_url;
use crate::domain::FetchConfig;
use crate::error::AppError;

pub fn write_debug_bundle(run: &RunOutput, fetch: &FetchConfig) -> Result<PathBuf, AppError> {
    write_debug_bundle_in(Path::new("debug"), run, fetch)
}

pub fn write_debug_bundle_in(dir: &Path, run: &RunOutput, fetch: &FetchConfig) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::config(format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("wdi_debug_{ts}.md"));

    let file = File::create(&path).map_err(|e| AppError::config(format!("Failed to create debug file: {e}")))?;
    let mut w = BufWriter::new(file);
    write_bundle(&mut w, run, fetch).map_err(|e| AppError::config(format!("Failed to write debug bundle: {e}")))?;

    Ok(path)
}

fn write_bundle(w: &mut impl Write, run: &RunOutput, fetch: &FetchConfig) -> std::io::Result<()> {
    writeln!(w, "# wdi debug bundle")?;
    writeln!(w, "- generated: {}", Local::now().to_rfc3339())?;
    writeln!(w, "- base_url: {}", fetch.base_url)?;
    writeln!(w, "- dates: {}..{}", fetch.date_start, fetch.date_end)?;
    writeln!(w, "- per_page: {}", fetch.per_page)?;
    writeln!(w, "- timeout: {}s", fetch.timeout.as_secs())?;
    writeln!(w, "- legend_order: {}", run.country_order.join(", "))?;

    writeln!(w, "\n## Requests")?;
    writeln!(w, "| indicator | rows | countries | years | url |")?;
    writeln!(w, "| - | - | - | - | - |")?;
    for &indicator in &run.fetched.requested {
        let url = indicator_url(fetch, &run.countries, indicator);
        match run.fetched.get(indicator) {
            Some(set) => {
                let years = set
                    .year_span()
                    .map(|(a, b)| format!("{a}..{b}"))
                    .unwrap_or_else(|| "-".to_string());
                let missing = set.observations.iter().filter(|o| o.value.is_none()).count();
                writeln!(
                    w,
                    "| {} | {} ({} missing) | {} | {} | {} |",
                    indicator,
                    set.len(),
                    missing,
                    set.countries().len(),
                    years,
                    url
                )?;
            }
            None => writeln!(w, "| {indicator} | - | - | - | {url} |")?,
        }
    }

    if !run.fetched.failures.is_empty() {
        writeln!(w, "\n## Failures")?;
        for f in &run.fetched.failures {
            writeln!(w, "- {}: {}", f.indicator, f.reason)?;
        }
    }

    writeln!(w, "\n## Charts")?;
    writeln!(w, "| # | title | series | points |")?;
    writeln!(w, "| - | - | - | - |")?;
    for (i, chart) in run.charts.iter().enumerate() {
        writeln!(
            w,
            "| {} | {} | {} | {} |",
            i + 1,
            chart.layout.title,
            chart.data.len(),
            chart.point_count()
        )?;
    }
    for s in &run.skipped {
        writeln!(w, "- skipped {}: missing {:?}", s.chart.title(), s.missing)?;
    }

    w.flush()
}
