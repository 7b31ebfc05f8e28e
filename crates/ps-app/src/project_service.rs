//! Scan file loading, validation and introspection.

use std::path::Path;

use ps_project::ScanFile;

use crate::error::{AppError, AppResult};

/// Summary of a scan file for listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSummary {
    pub name: String,
    pub model: String,
    pub quantity_count: usize,
    pub transfer_count: usize,
    pub sweep_target: String,
    pub candidate_count: usize,
}

/// Load and validate a scan file (`.yaml`, `.yml` or `.json`).
pub fn load_scan(path: &Path) -> AppResult<ScanFile> {
    if !path.exists() {
        return Err(AppError::ScanFileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }
    Ok(ps_project::load(path)?)
}

pub fn validate_scan_file(scan: &ScanFile) -> AppResult<()> {
    ps_project::validate_scan(scan).map_err(|e| AppError::Project(e.to_string()))
}

/// Series names a run of this scan produces, in trajectory order.
pub fn list_series(scan: &ScanFile) -> Vec<String> {
    scan.model.quantities.iter().map(|q| q.name.clone()).collect()
}

pub fn summarize_scan(scan: &ScanFile) -> ScanSummary {
    let candidate_count = match (&scan.sweep.values, &scan.sweep.range) {
        (Some(values), _) => values.len(),
        (None, Some(range)) => range.points,
        (None, None) => 0,
    };
    ScanSummary {
        name: scan.name.clone(),
        model: scan.model.name.clone(),
        quantity_count: scan.model.quantities.len(),
        transfer_count: scan.model.transfers.len(),
        sweep_target: scan.sweep.target.clone(),
        candidate_count,
    }
}
