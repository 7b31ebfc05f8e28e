use clap::{Parser, Subcommand};
use ps_app::{AppError, AppResult, ScanOptions, ScanResponse, project_service, scan_service};
use ps_plot::{Layout, SeriesSelection};
use ps_sweep::{SweepProgressEvent, SweepStage};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ps-cli")]
#[command(about = "paramscan CLI - parameter sweeps over compartment models", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scan file syntax and references
    Validate {
        /// Path to the scan YAML or JSON file
        scan_path: PathBuf,
    },
    /// Run the sweep described by a scan file
    Run {
        /// Path to the scan YAML or JSON file
        scan_path: PathBuf,
        /// Write the plot as SVG to this path
        #[arg(long)]
        plot: Option<PathBuf>,
        /// Multi-run layout: overlay or trellis
        #[arg(long)]
        layout: Option<Layout>,
        /// Series to plot: "all" or a comma-separated list of names
        #[arg(long)]
        series: Option<SeriesSelection>,
        /// Write the scan report as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
        /// Ignore output paths declared in the scan file
        #[arg(long)]
        no_file_outputs: bool,
    },
    /// List the series a run of this scan produces
    Series {
        /// Path to the scan YAML or JSON file
        scan_path: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Validate { scan_path } => cmd_validate(&scan_path),
        Commands::Run {
            scan_path,
            plot,
            layout,
            series,
            report,
            no_file_outputs,
        } => cmd_run(
            &scan_path,
            ScanOptions {
                plot_path: plot,
                report_path: report,
                series,
                layout,
                ignore_file_outputs: no_file_outputs,
                cancel: None,
            },
        ),
        Commands::Series { scan_path } => cmd_series(&scan_path),
    }
}

fn cmd_validate(scan_path: &Path) -> AppResult<()> {
    println!("Validating scan: {}", scan_path.display());
    let scan = project_service::load_scan(scan_path)?;
    project_service::validate_scan_file(&scan)?;
    let summary = project_service::summarize_scan(&scan);
    println!("✓ Scan is valid");
    println!(
        "  model {} ({} quantities, {} transfers)",
        summary.model, summary.quantity_count, summary.transfer_count
    );
    println!(
        "  sweep {} over {} value(s)",
        summary.sweep_target, summary.candidate_count
    );
    Ok(())
}

fn cmd_series(scan_path: &Path) -> AppResult<()> {
    let scan = project_service::load_scan(scan_path)?;
    for name in project_service::list_series(&scan) {
        println!("{name}");
    }
    Ok(())
}

fn cmd_run(scan_path: &Path, options: ScanOptions) -> AppResult<()> {
    info!(scan = %scan_path.display(), "running scan");

    let response = scan_service::run_scan_with_progress(
        scan_path,
        &options,
        Some(&mut |event: SweepProgressEvent| render_cli_progress(&event)),
    );
    clear_progress_line();

    match response {
        Ok(response) => {
            print_summary(&response);
            Ok(())
        }
        Err(err @ AppError::Interrupted(_)) => {
            error!(error = %err, "scan interrupted; no report produced");
            Err(err)
        }
        Err(err) => Err(err),
    }
}

fn print_summary(response: &ScanResponse) {
    let report = &response.report;
    println!("✓ Scan completed: {}", response.name);
    println!("  Scanned values: {:?}", report.values());
    if !report.is_complete() {
        println!("  Errored values: {:?}", report.errored_values());
    }
    if let Some(warning) = report.warning() {
        println!("  Warning: {warning}");
    }
    if let Some(path) = &response.plot_path {
        if response.plot.is_some() {
            println!("  Plot: {}", path.display());
        }
    }
    if let Some(path) = &response.report_path {
        println!("  Report: {}", path.display());
    }

    let t = &response.timing;
    println!(
        "  Timing: compile {:.3}s, sweep {:.3}s, export {:.3}s, render {:.3}s, total {:.3}s",
        t.compile_s, t.sweep_s, t.export_s, t.render_s, t.total_s
    );
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &SweepProgressEvent) {
    let width = 28usize;
    let fraction = event.fraction_complete();
    let filled = ((fraction * width as f64).round() as usize).min(width);
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled))
    );
    let value = event
        .value
        .map(|v| format!("  value={v}"))
        .unwrap_or_default();
    print!(
        "\r[{}] {:>6.2}%  {}{}  elapsed={:.1}s",
        bar,
        fraction * 100.0,
        event.stage.label(),
        value,
        event.elapsed_wall_s
    );
    if event.stage == SweepStage::Failed {
        if let Some(message) = &event.message {
            print!("  ({message})");
        }
    }
    let _ = io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::{Layer, registry};

    struct InfoCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for InfoCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::INFO {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn run_start_is_logged() {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = registry().with(InfoCounter(Arc::clone(&count)));

        let result = tracing::subscriber::with_default(subscriber, || {
            cmd_run(Path::new("does/not/exist.yaml"), ScanOptions::default())
        });

        assert!(result.is_err());
        assert!(count.load(Ordering::SeqCst) >= 1);
    }
}
