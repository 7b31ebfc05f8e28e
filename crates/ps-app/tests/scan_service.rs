//! End-to-end scan runs writing into a temporary directory.

use std::path::{Path, PathBuf};

use ps_app::{AppError, ScanOptions, list_series, load_scan, run_scan, run_scan_with_progress};
use ps_plot::{Layout, SeriesSelection};
use ps_sim::CancelToken;
use ps_sweep::{SweepProgressEvent, SweepStage};

const SCAN: &str = r#"
version: 1
name: dose scan
model:
  name: oral
  quantities:
    - { name: GI_Tract, path: GI_Tract/Drug, initial_value: 1.0 }
    - { name: Plasma, path: Plasma/Drug }
  transfers:
    - { name: absorption, from: GI_Tract/Drug, to: Plasma/Drug, rate: 0.02 }
    - { name: elimination, from: Plasma/Drug, rate: 0.005 }
config:
  stop_time: 10
  step_size: 0.5
  record_every: 2
config_overrides:
  time_unit: minute
  unit_conversion: true
sweep:
  target: GI_Tract/Drug
  values: [0.5, 0.72, 0.94, 1.17, 1.5]
plot:
  series: all
  layout: trellis
outputs:
  plot: from_file.svg
"#;

fn workdir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ps_app_{}_{name}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    dir
}

fn write_scan(dir: &Path) -> PathBuf {
    let path = dir.join("scan.yaml");
    std::fs::write(&path, SCAN).expect("write scan");
    path
}

#[test]
fn run_writes_plot_and_report() {
    let dir = workdir("outputs");
    let scan_path = write_scan(&dir);
    let options = ScanOptions {
        plot_path: Some(dir.join("scan.svg")),
        report_path: Some(dir.join("scan.json")),
        ..Default::default()
    };

    let response = run_scan(&scan_path, &options).expect("scan runs");

    assert_eq!(response.report.values(), &[0.5, 0.72, 0.94, 1.17, 1.5]);
    assert!(response.report.is_complete());
    let plot = response.plot.expect("plot rendered");
    assert_eq!(plot.axes.len(), 5);
    assert_eq!(plot.labels.xlabel, "Time (minute)");

    let svg = std::fs::read_to_string(dir.join("scan.svg")).expect("svg");
    assert!(svg.contains("GI_Tract/Drug = 0.5"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("scan.json")).expect("json"))
            .expect("valid json");
    assert!(json["generated_at"].is_string());
    assert_eq!(json["scan"], "dose scan");
    assert_eq!(json["runs"].as_array().map(Vec::len), Some(5));
    assert_eq!(json["summary"]["attempted"], 5);
    assert!(!dir.join("from_file.svg").exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn file_outputs_resolve_next_to_scan() {
    let dir = workdir("file_outputs");
    let scan_path = write_scan(&dir);

    let response = run_scan(&scan_path, &ScanOptions::default()).expect("scan runs");

    assert_eq!(response.plot_path, Some(dir.join("from_file.svg")));
    assert!(dir.join("from_file.svg").exists());
    assert!(response.report_path.is_none());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_series_fails_after_report_is_written() {
    let dir = workdir("missing_series");
    let scan_path = write_scan(&dir);
    let options = ScanOptions {
        plot_path: Some(dir.join("scan.svg")),
        report_path: Some(dir.join("scan.json")),
        series: Some(SeriesSelection::named(["Liver"])),
        layout: Some(Layout::Overlay),
        ..Default::default()
    };

    let err = run_scan(&scan_path, &options).expect_err("unknown series");

    assert!(matches!(err, AppError::Plot(ref msg) if msg.contains("Liver")));
    assert!(dir.join("scan.json").exists());
    assert!(!dir.join("scan.svg").exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn cancelled_scan_reports_interrupt() {
    let dir = workdir("cancelled");
    let scan_path = write_scan(&dir);
    let token = CancelToken::new();
    token.cancel();
    let options = ScanOptions {
        ignore_file_outputs: true,
        cancel: Some(token),
        ..Default::default()
    };

    let mut stages = Vec::new();
    let mut cb = |e: SweepProgressEvent| stages.push(e.stage);
    let err = run_scan_with_progress(&scan_path, &options, Some(&mut cb)).expect_err("interrupt");

    assert!(err.is_interrupt());
    assert_eq!(stages.last(), Some(&SweepStage::Interrupted));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn series_listing_follows_model_order() {
    let dir = workdir("series");
    let scan = load_scan(&write_scan(&dir)).expect("load");
    assert_eq!(list_series(&scan), ["GI_Tract", "Plasma"]);
    let _ = std::fs::remove_dir_all(&dir);
}
