//! ps-project: scan definition file format and validation.

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{ValidationError, validate_scan};

use std::path::Path;

use tracing::debug;

/// Newest scan file version this crate reads.
pub const LATEST_VERSION: u32 = 1;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unsupported scan file extension: {0}")]
    UnknownFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ProjectResult<ScanFile> {
    let content = std::fs::read_to_string(path)?;
    let scan: ScanFile = serde_yaml::from_str(&content)?;
    validate_scan(&scan)?;
    debug!(path = %path.display(), name = %scan.name, "loaded scan file");
    Ok(scan)
}

pub fn save_yaml(path: &Path, scan: &ScanFile) -> ProjectResult<()> {
    validate_scan(scan)?;
    let content = serde_yaml::to_string(scan)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<ScanFile> {
    let content = std::fs::read_to_string(path)?;
    let scan: ScanFile = serde_json::from_str(&content)?;
    validate_scan(&scan)?;
    debug!(path = %path.display(), name = %scan.name, "loaded scan file");
    Ok(scan)
}

pub fn save_json(path: &Path, scan: &ScanFile) -> ProjectResult<()> {
    validate_scan(scan)?;
    let content = serde_json::to_string_pretty(scan)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load by extension: `.json` as JSON, `.yaml`/`.yml` as YAML.
pub fn load(path: &Path) -> ProjectResult<ScanFile> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => load_json(path),
        Some("yaml") | Some("yml") => load_yaml(path),
        other => Err(ProjectError::UnknownFormat(
            other.unwrap_or_default().to_string(),
        )),
    }
}
