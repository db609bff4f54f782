// src/export.rs

use color_eyre::eyre::{Result, WrapErr};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::models::ScanReport;
use crate::logging::get_data_dir;

/// Directory reports are written to when the user presses `E`.
pub fn default_export_dir() -> PathBuf {
    get_data_dir().join("reports")
}

/// Writes `report` as pretty-printed JSON into `dir`, creating it if needed.
///
/// The file is named after the target and the scan time, e.g.
/// `example.com-20250102T030405.json`. Returns the full path written.
pub fn export_report(report: &ScanReport, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .wrap_err_with(|| format!("failed to create {}", dir.display()))?;

    let file_name = format!(
        "{}-{}.json",
        file_stem(&report.target),
        report.scanned_at.format("%Y%m%dT%H%M%S")
    );
    let path = dir.join(file_name);

    let json = serde_json::to_string_pretty(report).wrap_err("failed to serialize report")?;
    std::fs::write(&path, json).wrap_err_with(|| format!("failed to write {}", path.display()))?;

    info!(path = %path.display(), "Report exported.");
    Ok(path)
}

// Targets are normalized hostnames, but the report type does not enforce it.
fn file_stem(target: &str) -> String {
    let stem: String = target
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    if stem.is_empty() { "report".to_string() } else { stem }
}
