//! Error types for simulation operations.

use ps_core::CoreError;
use thiserror::Error;

use crate::overrides::OverrideAttribute;

/// Errors encountered while building or integrating a model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid model: {message}")]
    InvalidModel { message: String },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: String },

    #[error("Step limit of {max_steps} reached before stop time {t_end}")]
    StepLimit { max_steps: usize, t_end: f64 },

    #[error("Integration cancelled at t = {t}")]
    Cancelled { t: f64 },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type SimResult<T> = Result<T, SimError>;

/// How the sweep must react to an invocation failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Abort the whole sweep and propagate.
    Interrupt,
    /// Record the value as errored and move on.
    Iteration,
}

/// Failure of a single simulation invocation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvokeError {
    #[error("Simulation interrupted")]
    Interrupted,

    #[error("Invalid override {attribute} of '{target}': {reason}")]
    InvalidOverride {
        target: String,
        attribute: OverrideAttribute,
        reason: String,
    },

    #[error("Simulation failed: {0}")]
    Sim(SimError),

    #[error("Simulation failed: {message}")]
    Failed { message: String },
}

impl InvokeError {
    pub fn failed(message: impl Into<String>) -> Self {
        InvokeError::Failed {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            InvokeError::Interrupted => FailureKind::Interrupt,
            _ => FailureKind::Iteration,
        }
    }

    pub fn is_interrupt(&self) -> bool {
        self.kind() == FailureKind::Interrupt
    }
}

impl From<SimError> for InvokeError {
    fn from(e: SimError) -> Self {
        match e {
            SimError::Cancelled { .. } => InvokeError::Interrupted,
            other => InvokeError::Sim(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_classifies_as_interrupt() {
        let err: InvokeError = SimError::Cancelled { t: 1.5 }.into();
        assert!(err.is_interrupt());
        assert_eq!(err.kind(), FailureKind::Interrupt);
    }

    #[test]
    fn other_failures_classify_as_iteration() {
        let err: InvokeError = SimError::NonPhysical {
            what: "negative amount".to_string(),
        }
        .into();
        assert_eq!(err.kind(), FailureKind::Iteration);
        assert!(!InvokeError::failed("solver diverged").is_interrupt());
        assert!(
            !InvokeError::InvalidOverride {
                target: "Plasma/Drug".to_string(),
                attribute: OverrideAttribute::InitialValue,
                reason: "unknown".to_string(),
            }
            .is_interrupt()
        );
    }
}
