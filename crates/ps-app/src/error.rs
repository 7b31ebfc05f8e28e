//! Error types for the ps-app service layer.

use std::path::PathBuf;

/// Application error wrapping the backend crates' errors for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Scan file error: {0}")]
    Project(String),

    #[error("Failed to read scan file: {path}")]
    ScanFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write output file: {path}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scan compilation failed: {0}")]
    Compile(String),

    #[error("Sweep error: {0}")]
    Sweep(String),

    /// The sweep was interrupted; no report was produced.
    #[error("Interrupted: {0}")]
    Interrupted(String),

    #[error("Plot error: {0}")]
    Plot(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn is_interrupt(&self) -> bool {
        matches!(self, AppError::Interrupted(_))
    }
}

/// Result type for ps-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ps_project::ProjectError> for AppError {
    fn from(err: ps_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<ps_sim::SimError> for AppError {
    fn from(err: ps_sim::SimError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<ps_sweep::SweepError> for AppError {
    fn from(err: ps_sweep::SweepError) -> Self {
        match err {
            ps_sweep::SweepError::Interrupted { .. } => AppError::Interrupted(err.to_string()),
            other => AppError::Sweep(other.to_string()),
        }
    }
}

impl From<ps_plot::PlotError> for AppError {
    fn from(err: ps_plot::PlotError) -> Self {
        AppError::Plot(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}
