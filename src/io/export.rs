//! Read/write dashboard JSON files.
//!
//! The dashboard file is the hand-off to the rendering layer: each entry of
//! `charts` is a plotly figure (`data` + `layout`), plus run metadata
//! (countries, fetch failures, skipped charts).
//!
//! The schema is defined by `domain::Dashboard`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::Dashboard;
use crate::error::AppError;

/// Write a dashboard JSON file.
pub fn write_dashboard_json(path: &Path, dashboard: &Dashboard) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create dashboard JSON '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, dashboard)
        .map_err(|e| AppError::config(format!("Failed to write dashboard JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::config(format!("Failed to write dashboard JSON: {e}")))?;

    Ok(())
}

/// Serialize a dashboard for stdout.
pub fn dashboard_to_string(dashboard: &Dashboard) -> Result<String, AppError> {
    serde_json::to_string_pretty(dashboard)
        .map_err(|e| AppError::config(format!("Failed to serialize dashboard: {e}")))
}

/// Read a dashboard JSON file.
pub fn read_dashboard_json(path: &Path) -> Result<Dashboard, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open dashboard JSON '{}': {e}", path.display())))?;
    let dashboard: Dashboard = serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|e| AppError::config(format!("Invalid dashboard JSON: {e}")))?;
    Ok(dashboard)
}
