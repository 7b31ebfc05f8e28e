//! Which series to draw.

use std::fmt;
use std::str::FromStr;

use ps_sim::TrajectoryResult;

use crate::error::DataSelectionError;

/// Requested series: every series the data has, or an explicit list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SeriesSelection {
    #[default]
    All,
    Named(Vec<String>),
}

impl SeriesSelection {
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SeriesSelection::Named(names.into_iter().map(Into::into).collect())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, SeriesSelection::All)
    }
}

impl fmt::Display for SeriesSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesSelection::All => f.write_str("all"),
            SeriesSelection::Named(names) => f.write_str(&names.join(",")),
        }
    }
}

/// `all` (any case) selects everything; anything else is a comma-separated
/// list of names.
impl FromStr for SeriesSelection {
    type Err = DataSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(SeriesSelection::All);
        }
        let names: Vec<String> = trimmed
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();
        if names.is_empty() {
            return Err(DataSelectionError::EmptySelection);
        }
        Ok(SeriesSelection::Named(names))
    }
}

pub struct SeriesSelector;

impl SeriesSelector {
    /// Resolve `selection` against one trajectory.
    pub fn resolve(
        trajectory: &TrajectoryResult,
        selection: &SeriesSelection,
    ) -> Result<Vec<String>, DataSelectionError> {
        Self::resolve_runs(std::slice::from_ref(trajectory), selection)
    }

    /// Resolve `selection` against a set of runs.
    ///
    /// `All` takes the first run's series in its native order. Every resolved
    /// name must exist in every run, so a successful resolution guarantees
    /// that nothing is missing once drawing starts.
    pub fn resolve_runs(
        runs: &[TrajectoryResult],
        selection: &SeriesSelection,
    ) -> Result<Vec<String>, DataSelectionError> {
        let first = runs.first().ok_or(DataSelectionError::NoRuns)?;

        let names: Vec<String> = match selection {
            SeriesSelection::All => first.series_names().map(str::to_string).collect(),
            SeriesSelection::Named(names) => names.clone(),
        };
        if names.is_empty() {
            return Err(DataSelectionError::EmptySelection);
        }

        for (run, trajectory) in runs.iter().enumerate() {
            if let Some(missing) = names.iter().find(|n| !trajectory.has_series(n)) {
                return Err(DataSelectionError::MissingSeries {
                    name: missing.clone(),
                    run,
                });
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ps_sim::{NamedSeries, TrajectoryMetadata};

    fn traj(names: &[&str]) -> TrajectoryResult {
        TrajectoryResult::new(
            vec![0.0, 1.0],
            names
                .iter()
                .map(|n| NamedSeries::new(*n, vec![0.0, 1.0]))
                .collect(),
            TrajectoryMetadata::default(),
        )
        .unwrap()
    }

    #[test]
    fn all_returns_native_order() {
        let t = traj(&["A", "B", "C"]);
        assert_eq!(
            SeriesSelector::resolve(&t, &SeriesSelection::All).unwrap(),
            ["A", "B", "C"]
        );
    }

    #[test]
    fn named_keeps_requested_order() {
        let t = traj(&["A", "B", "C"]);
        let sel = SeriesSelection::named(["C", "A"]);
        assert_eq!(SeriesSelector::resolve(&t, &sel).unwrap(), ["C", "A"]);
    }

    #[test]
    fn missing_name_reports_run() {
        let runs = vec![traj(&["A", "B"]), traj(&["A"])];
        let err = SeriesSelector::resolve_runs(&runs, &SeriesSelection::named(["B"])).unwrap_err();
        assert_eq!(
            err,
            DataSelectionError::MissingSeries {
                name: "B".to_string(),
                run: 1
            }
        );
    }

    #[test]
    fn empty_inputs_rejected() {
        assert_eq!(
            SeriesSelector::resolve_runs(&[], &SeriesSelection::All).unwrap_err(),
            DataSelectionError::NoRuns
        );
        let t = traj(&["A"]);
        assert_eq!(
            SeriesSelector::resolve(&t, &SeriesSelection::Named(Vec::new())).unwrap_err(),
            DataSelectionError::EmptySelection
        );
    }

    #[test]
    fn parse_selection() {
        assert_eq!("ALL".parse::<SeriesSelection>().unwrap(), SeriesSelection::All);
        assert_eq!(
            "Plasma, GI_Tract".parse::<SeriesSelection>().unwrap(),
            SeriesSelection::named(["Plasma", "GI_Tract"])
        );
        assert!(" , ".parse::<SeriesSelection>().is_err());
    }
}
