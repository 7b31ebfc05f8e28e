//! Shared application service layer for paramscan.
//!
//! Loads scan files, compiles them into a model, configuration and sweep,
//! runs the sweep and writes the plot and report outputs. The CLI is a thin
//! front end over this crate.

pub mod error;
pub mod project_service;
pub mod scan_compile;
pub mod scan_service;

pub use error::{AppError, AppResult};
pub use project_service::{ScanSummary, list_series, load_scan, summarize_scan, validate_scan_file};
pub use scan_compile::{
    CompiledScan, build_config, build_config_overrides, build_model, build_plot_request,
    build_sweep, compile_scan,
};
pub use scan_service::{
    ReportExport, ScanOptions, ScanResponse, ScanTimingSummary, run_scan, run_scan_with_progress,
};
