//! Scan execution: compile, sweep, export and render.

use std::path::{Path, PathBuf};

use ps_core::Timer;
use ps_plot::{Layout, PlotDispatcher, RenderOutput, SeriesSelection, SvgBackend};
use ps_sim::{CancelToken, OdeSimulator, TrajectoryResult};
use ps_sweep::{ScanReport, ScanReportSummary, SweepOrchestrator, SweepProgressEvent};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::project_service;
use crate::scan_compile::{CompiledScan, compile_scan};

/// Caller overrides for a scan run. Anything left `None` comes from the
/// scan file.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub plot_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
    pub series: Option<SeriesSelection>,
    pub layout: Option<Layout>,
    /// Ignore the output paths declared in the scan file.
    pub ignore_file_outputs: bool,
    pub cancel: Option<CancelToken>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanTimingSummary {
    pub compile_s: f64,
    pub sweep_s: f64,
    pub export_s: f64,
    pub render_s: f64,
    pub total_s: f64,
}

#[derive(Debug)]
pub struct ScanResponse {
    pub name: String,
    pub report: ScanReport,
    pub plot: Option<RenderOutput>,
    pub plot_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
    pub timing: ScanTimingSummary,
}

/// JSON document written for `--report`.
#[derive(Debug, Serialize)]
pub struct ReportExport<'a> {
    pub generated_at: String,
    pub scan: &'a str,
    pub summary: ScanReportSummary,
    pub runs: Vec<RunExport<'a>>,
}

#[derive(Debug, Serialize)]
pub struct RunExport<'a> {
    pub value: f64,
    pub trajectory: &'a TrajectoryResult,
}

impl<'a> ReportExport<'a> {
    pub fn new(scan: &'a str, report: &'a ScanReport) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            scan,
            summary: report.summary(),
            runs: report
                .iter()
                .map(|(value, trajectory)| RunExport { value, trajectory })
                .collect(),
        }
    }
}

pub fn run_scan(path: &Path, options: &ScanOptions) -> AppResult<ScanResponse> {
    run_scan_with_progress(path, options, None)
}

/// Load, compile and run the scan at `path`, streaming sweep progress.
pub fn run_scan_with_progress(
    path: &Path,
    options: &ScanOptions,
    progress_cb: Option<&mut dyn FnMut(SweepProgressEvent)>,
) -> AppResult<ScanResponse> {
    let total = Timer::start();
    let mut timing = ScanTimingSummary::default();

    let compile = Timer::start();
    let scan = project_service::load_scan(path)?;
    let compiled = compile_scan(&scan)?;
    timing.compile_s = compile.stop();

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let (file_plot, file_report) = if options.ignore_file_outputs {
        (None, None)
    } else {
        (
            scan.outputs.plot.as_ref().map(|p| base_dir.join(p)),
            scan.outputs.report.as_ref().map(|p| base_dir.join(p)),
        )
    };
    let plot_path = options.plot_path.clone().or(file_plot);
    let report_path = options.report_path.clone().or(file_report);

    let mut response = execute(
        compiled,
        options,
        progress_cb,
        &mut timing,
        plot_path,
        report_path,
    )?;
    timing.total_s = total.stop();
    response.timing = timing;
    Ok(response)
}

fn execute(
    mut compiled: CompiledScan,
    options: &ScanOptions,
    progress_cb: Option<&mut dyn FnMut(SweepProgressEvent)>,
    timing: &mut ScanTimingSummary,
    plot_path: Option<PathBuf>,
    report_path: Option<PathBuf>,
) -> AppResult<ScanResponse> {
    info!(scan = %compiled.name, sweep = %compiled.sweep, "running scan");

    let simulator = match &options.cancel {
        Some(token) => OdeSimulator::with_cancel_token(token.clone()),
        None => OdeSimulator::new(),
    };
    let mut orchestrator = SweepOrchestrator::new(simulator);

    let sweep = Timer::start();
    let overrides = std::mem::take(&mut compiled.overrides);
    let report = orchestrator.run_scoped_sweep(
        &compiled.model,
        &mut compiled.config,
        overrides,
        &compiled.sweep,
        progress_cb,
    )?;
    timing.sweep_s = sweep.stop();

    if let Some(path) = &report_path {
        let export = Timer::start();
        write_report(path, &compiled.name, &report)?;
        timing.export_s = export.stop();
    }

    let plot = match &plot_path {
        Some(path) if report.is_empty() => {
            warn!(path = %path.display(), "no successful runs, skipping plot");
            None
        }
        Some(path) => {
            let render = Timer::start();
            let output = render_plot(path, &compiled, &report, options)?;
            timing.render_s = render.stop();
            Some(output)
        }
        None => None,
    };

    Ok(ScanResponse {
        name: compiled.name,
        report,
        plot,
        plot_path,
        report_path,
        timing: ScanTimingSummary::default(),
    })
}

fn write_report(path: &Path, scan: &str, report: &ScanReport) -> AppResult<()> {
    let content = serde_json::to_string_pretty(&ReportExport::new(scan, report))?;
    std::fs::write(path, content).map_err(|e| AppError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!(path = %path.display(), "wrote scan report");
    Ok(())
}

fn render_plot(
    path: &Path,
    compiled: &CompiledScan,
    report: &ScanReport,
    options: &ScanOptions,
) -> AppResult<RenderOutput> {
    let mut request = compiled.plot.clone().with_run_labels(report.run_labels());
    if let Some(series) = &options.series {
        request.series = series.clone();
    }
    if let Some(layout) = options.layout {
        request.layout = layout;
    }

    let (width, height) = compiled.plot_size;
    let mut backend = SvgBackend::new(width, height);
    let output = PlotDispatcher::new().render(&mut backend, report, &request)?;
    backend.save(path).map_err(|e| match e {
        ps_plot::PlotError::Backend { message } => AppError::OutputWrite {
            path: path.to_path_buf(),
            source: std::io::Error::other(message),
        },
        other => other.into(),
    })?;
    Ok(output)
}
