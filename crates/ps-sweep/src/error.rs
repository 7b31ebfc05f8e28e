//! Error types for sweep execution.

use ps_sim::InvokeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SweepError {
    /// An invocation raised an interrupt; no further candidates were run.
    #[error("Sweep interrupted at value {value} after {completed} of {total} iteration(s)")]
    Interrupted {
        value: f64,
        completed: usize,
        total: usize,
        #[source]
        source: InvokeError,
    },

    #[error("Invalid sweep specification: {0}")]
    InvalidSpecification(String),
}

pub type SweepResult<T> = Result<T, SweepError>;
