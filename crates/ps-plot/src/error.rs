use thiserror::Error;

/// A requested plot cannot be built from the data it was given.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataSelectionError {
    #[error("Series '{name}' not found in run {run}")]
    MissingSeries { name: String, run: usize },

    #[error("Series selection resolved to no series")]
    EmptySelection,

    #[error("Nothing to plot: no runs")]
    NoRuns,

    #[error("Run {run} has no samples")]
    EmptyRun { run: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlotError {
    #[error(transparent)]
    DataSelection(#[from] DataSelectionError),

    #[error("Invalid plot argument: {what}")]
    InvalidArg { what: String },

    #[error("Unknown axes {0}")]
    UnknownAxes(usize),

    #[error("Plot backend error: {message}")]
    Backend { message: String },
}

pub type PlotResult<T> = Result<T, PlotError>;

impl PlotError {
    pub(crate) fn backend(err: impl std::fmt::Display) -> Self {
        PlotError::Backend {
            message: err.to_string(),
        }
    }
}
