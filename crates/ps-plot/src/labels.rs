//! Title and axis label resolution.

use ps_sim::TrajectoryResult;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIME_LABEL: &str = "Time";
pub const DEFAULT_Y_LABEL: &str = "Value";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Labels {
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
}

/// Per-field overrides supplied with a plot request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelOverrides {
    pub title: Option<String>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
}

impl LabelOverrides {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn xlabel(mut self, xlabel: impl Into<String>) -> Self {
        self.xlabel = Some(xlabel.into());
        self
    }

    pub fn ylabel(mut self, ylabel: impl Into<String>) -> Self {
        self.ylabel = Some(ylabel.into());
        self
    }
}

pub struct LabelResolver;

impl LabelResolver {
    /// Each override replaces only its own field.
    pub fn resolve(
        overrides: &LabelOverrides,
        default_title: &str,
        inferred_xlabel: &str,
        default_ylabel: &str,
    ) -> Labels {
        Labels {
            title: overrides
                .title
                .clone()
                .unwrap_or_else(|| default_title.to_string()),
            xlabel: overrides
                .xlabel
                .clone()
                .unwrap_or_else(|| inferred_xlabel.to_string()),
            ylabel: overrides
                .ylabel
                .clone()
                .unwrap_or_else(|| default_ylabel.to_string()),
        }
    }

    /// `Time (<unit>)` when every run was converted into the same declared
    /// unit, bare `Time` otherwise.
    pub fn infer_time_label(runs: &[TrajectoryResult]) -> String {
        let Some(first) = runs.first() else {
            return DEFAULT_TIME_LABEL.to_string();
        };
        let Some(unit) = first.metadata().time_unit else {
            return DEFAULT_TIME_LABEL.to_string();
        };
        let shared = runs.iter().all(|run| {
            let meta = run.metadata();
            meta.unit_conversion && meta.time_unit == Some(unit)
        });
        if shared {
            format!("{DEFAULT_TIME_LABEL} ({unit})")
        } else {
            DEFAULT_TIME_LABEL.to_string()
        }
    }
}
