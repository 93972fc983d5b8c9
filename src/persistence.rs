//! Persistence layer for saving/loading evaluation reports.
//!
//! Supports both JSON and YAML formats, chosen by file extension.

use crate::aggregate::EvaluationReport;
use crate::error::{EvalError, Result};
use std::fs;
use std::path::Path;

/// Default filename for an evaluation report.
pub const DEFAULT_REPORT_FILENAME: &str = "evaluation_report.json";

/// Save format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// JSON format (for downstream plotting tools).
    Json,
    /// YAML format (easier to read by hand).
    Yaml,
}

impl SaveFormat {
    /// Determine format from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => SaveFormat::Yaml,
            _ => SaveFormat::Json, // Default to JSON
        }
    }
}

/// Save a report to a file.
pub fn save_report(report: &EvaluationReport, path: &Path) -> Result<()> {
    let format = SaveFormat::from_path(path);
    save_report_with_format(report, path, format)
}

/// Save a report with a specific format.
pub fn save_report_with_format(
    report: &EvaluationReport,
    path: &Path,
    format: SaveFormat,
) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| EvalError::io(parent, e))?;
        }
    }

    let data = match format {
        SaveFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| EvalError::Serialization(e.to_string()))?,
        SaveFormat::Yaml => serde_yaml::to_string(report)
            .map_err(|e| EvalError::Serialization(e.to_string()))?,
    };

    fs::write(path, data).map_err(|e| EvalError::io(path, e))?;

    Ok(())
}

/// Load a report from a file.
pub fn load_report(path: &Path) -> Result<EvaluationReport> {
    if !path.exists() {
        return Err(EvalError::ReportNotFound(path.to_path_buf()));
    }

    let format = SaveFormat::from_path(path);
    let content = fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;

    let report = match format {
        SaveFormat::Json => serde_json::from_str(&content)
            .map_err(|e| EvalError::Serialization(e.to_string()))?,
        SaveFormat::Yaml => serde_yaml::from_str(&content)
            .map_err(|e| EvalError::Serialization(e.to_string()))?,
    };

    Ok(report)
}

/// Check if a report file exists at the given path.
pub fn report_exists(path: &Path) -> bool {
    path.exists() && path.is_file()
}
