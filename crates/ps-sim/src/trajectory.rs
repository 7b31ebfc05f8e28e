//! Output of one successful simulation invocation.

use std::collections::HashSet;

use ps_core::TimeUnit;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// One named column of values sampled at the trajectory's time points.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NamedSeries {
    name: String,
    values: Vec<f64>,
}

impl NamedSeries {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Configuration facts recorded alongside the samples.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryMetadata {
    /// Model or run name
    pub name: String,
    /// Time unit declared by the configuration, if any
    pub time_unit: Option<TimeUnit>,
    /// Whether time samples were converted into `time_unit`
    pub unit_conversion: bool,
}

/// Time samples plus named series. Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrajectoryResult {
    time: Vec<f64>,
    series: Vec<NamedSeries>,
    metadata: TrajectoryMetadata,
}

impl TrajectoryResult {
    /// Build a trajectory, checking that every series has one value per
    /// time sample and that series names are unique.
    pub fn new(
        time: Vec<f64>,
        series: Vec<NamedSeries>,
        metadata: TrajectoryMetadata,
    ) -> SimResult<Self> {
        let mut seen = HashSet::new();
        for s in &series {
            if s.values.len() != time.len() {
                return Err(SimError::InvalidModel {
                    message: format!(
                        "series '{}' has {} values for {} time samples",
                        s.name,
                        s.values.len(),
                        time.len()
                    ),
                });
            }
            if !seen.insert(s.name.as_str()) {
                return Err(SimError::InvalidModel {
                    message: format!("duplicate series name '{}'", s.name),
                });
            }
        }
        Ok(Self {
            time,
            series,
            metadata,
        })
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn series(&self) -> &[NamedSeries] {
        &self.series
    }

    /// Series names in native order.
    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&NamedSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn has_series(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn metadata(&self) -> &TrajectoryMetadata {
        &self.metadata
    }

    /// Number of time samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Anything that can be plotted as an ordered list of runs.
pub trait RunSet {
    fn runs(&self) -> &[TrajectoryResult];
}

impl RunSet for TrajectoryResult {
    fn runs(&self) -> &[TrajectoryResult] {
        std::slice::from_ref(self)
    }
}

impl RunSet for [TrajectoryResult] {
    fn runs(&self) -> &[TrajectoryResult] {
        self
    }
}

impl RunSet for Vec<TrajectoryResult> {
    fn runs(&self) -> &[TrajectoryResult] {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> TrajectoryMetadata {
        TrajectoryMetadata {
            name: "oral".to_string(),
            time_unit: Some(TimeUnit::Hour),
            unit_conversion: true,
        }
    }

    #[test]
    fn keeps_native_series_order() {
        let traj = TrajectoryResult::new(
            vec![0.0, 1.0],
            vec![
                NamedSeries::new("Plasma", vec![0.0, 0.4]),
                NamedSeries::new("GI_Tract", vec![1.0, 0.6]),
            ],
            meta(),
        )
        .unwrap();
        let names: Vec<&str> = traj.series_names().collect();
        assert_eq!(names, ["Plasma", "GI_Tract"]);
        assert_eq!(traj.get("GI_Tract").unwrap().values(), [1.0, 0.6]);
        assert!(!traj.has_series("Liver"));
        assert_eq!(traj.len(), 2);
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = TrajectoryResult::new(
            vec![0.0, 1.0],
            vec![NamedSeries::new("Plasma", vec![0.0])],
            meta(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Plasma"));
    }

    #[test]
    fn rejects_duplicate_names() {
        let result = TrajectoryResult::new(
            vec![0.0],
            vec![
                NamedSeries::new("Plasma", vec![0.0]),
                NamedSeries::new("Plasma", vec![1.0]),
            ],
            meta(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn single_trajectory_is_one_run() {
        let traj = TrajectoryResult::new(vec![0.0], vec![], meta()).unwrap();
        assert_eq!(traj.runs().len(), 1);
        let runs = vec![traj.clone(), traj];
        assert_eq!(runs.runs().len(), 2);
    }
}
