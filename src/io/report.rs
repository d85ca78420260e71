//! Read/write analysis report JSON files.
//!
//! The report is the "portable" representation of a run:
//! - the cumulative volume-fraction curve that was fitted
//! - fitted model parameters with their moments
//! - the fractal regression line
//! - enough run metadata to reproduce the binning
//!
//! The schema is defined by `domain::ReportFile`.

use std::fs::File;
use std::path::Path;

use chrono::Local;

use crate::domain::{AnalysisConfig, CumulativeCurve, DistributionFit, FractalFit, ReportFile};
use crate::error::AppError;

/// Assemble a report from the pieces a run produced.
pub fn build_report(
    config: &AnalysisConfig,
    merge_ratio: Option<f64>,
    curve: &CumulativeCurve,
    fits: &[DistributionFit],
    fractal: &FractalFit,
) -> ReportFile {
    ReportFile {
        tool: "fractsed".to_string(),
        generated: Local::now().date_naive(),
        source: config.csv_path.display().to_string(),
        secondary_source: config.secondary_csv.as_ref().map(|p| p.display().to_string()),
        bins: config.bins,
        min_support: config.min_support,
        merge_ratio,
        curve: curve.clone(),
        fits: fits.to_vec(),
        fractal: fractal.clone(),
    }
}

/// Write a report JSON file.
pub fn write_report_json(path: &Path, report: &ReportFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create report JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::io(format!("Failed to write report JSON: {e}")))?;

    Ok(())
}

/// Read a report JSON file.
pub fn read_report_json(path: &Path) -> Result<ReportFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open report JSON '{}': {e}", path.display())))?;
    let report: ReportFile = serde_json::from_reader(file)
        .map_err(|e| AppError::invalid_input(format!("Invalid report JSON: {e}")))?;
    Ok(report)
}
