//! Aggregated outcome of a sweep.

use std::fmt;

use ps_sim::{OverrideAttribute, RunSet, TargetPath, TrajectoryResult};
use serde::Serialize;

use crate::spec::SweepSpecification;

/// Raised once per sweep when at least one iteration produced no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IncompleteSweepWarning {
    pub errored: usize,
    pub attempted: usize,
}

impl fmt::Display for IncompleteSweepWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} sweep iteration(s) produced no data",
            self.errored, self.attempted
        )
    }
}

/// Successful trajectories and the values they came from, plus the values
/// whose invocation failed.
///
/// `values()[i]` produced `trajectories()[i]`. Both follow the sweep order
/// with failed candidates skipped, and no value is both scanned and errored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    target: TargetPath,
    attribute: OverrideAttribute,
    values: Vec<f64>,
    errored_values: Vec<f64>,
    trajectories: Vec<TrajectoryResult>,
    warning: Option<IncompleteSweepWarning>,
}

impl ScanReport {
    pub(crate) fn new(spec: &SweepSpecification) -> Self {
        Self {
            target: spec.target().clone(),
            attribute: spec.attribute(),
            values: Vec::with_capacity(spec.len()),
            errored_values: Vec::new(),
            trajectories: Vec::with_capacity(spec.len()),
            warning: None,
        }
    }

    pub(crate) fn record_success(&mut self, value: f64, trajectory: TrajectoryResult) {
        self.values.push(value);
        self.trajectories.push(trajectory);
    }

    pub(crate) fn record_failure(&mut self, value: f64) {
        self.errored_values.push(value);
    }

    /// Close the report, producing the aggregate warning if anything failed.
    pub(crate) fn finish(&mut self) -> Option<IncompleteSweepWarning> {
        if self.errored_values.is_empty() {
            return None;
        }
        let warning = IncompleteSweepWarning {
            errored: self.errored_values.len(),
            attempted: self.attempted(),
        };
        self.warning = Some(warning);
        self.warning
    }

    pub fn target(&self) -> &TargetPath {
        &self.target
    }

    pub fn attribute(&self) -> OverrideAttribute {
        self.attribute
    }

    /// Successfully scanned values, in sweep order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Values whose invocation failed, in sweep order.
    pub fn errored_values(&self) -> &[f64] {
        &self.errored_values
    }

    pub fn trajectories(&self) -> &[TrajectoryResult] {
        &self.trajectories
    }

    /// Pairs of scanned value and its trajectory.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &TrajectoryResult)> {
        self.values.iter().copied().zip(self.trajectories.iter())
    }

    /// Number of successful runs.
    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.values.len() + self.errored_values.len()
    }

    pub fn is_complete(&self) -> bool {
        self.errored_values.is_empty()
    }

    pub fn warning(&self) -> Option<&IncompleteSweepWarning> {
        self.warning.as_ref()
    }

    /// Human-readable label for each run, e.g. `GI_Tract/Drug = 0.5`.
    pub fn run_labels(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|v| format!("{} = {}", self.target, v))
            .collect()
    }

    pub fn summary(&self) -> ScanReportSummary {
        ScanReportSummary {
            target: self.target.to_string(),
            attribute: self.attribute,
            attempted: self.attempted(),
            values: self.values.clone(),
            errored_values: self.errored_values.clone(),
            warning: self.warning.map(|w| w.to_string()),
        }
    }
}

impl RunSet for ScanReport {
    fn runs(&self) -> &[TrajectoryResult] {
        &self.trajectories
    }
}

/// Compact, serialisable view of a report without the trajectories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReportSummary {
    pub target: String,
    pub attribute: OverrideAttribute,
    pub attempted: usize,
    pub values: Vec<f64>,
    pub errored_values: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
