//! Export a run report to JSON.
//!
//! The export is meant for spreadsheets or downstream scripts that want the
//! computed figures without reading the database.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::pipeline::JobReport;
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ReportFile<'a> {
    tool: &'static str,
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    report: &'a JobReport,
}

/// Write `report` as pretty-printed JSON.
pub fn write_report_json(path: &Path, report: &JobReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create export JSON '{}': {e}", path.display())))?;

    let doc = ReportFile {
        tool: "food-factors",
        generated_at: Utc::now(),
        report,
    };

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::usage(format!("Failed to write export JSON: {e}")))?;

    Ok(())
}
