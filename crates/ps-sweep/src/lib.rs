//! ps-sweep: parameter sweeps over a black-box simulation engine.
//!
//! A sweep runs one simulation per candidate value, strictly in order and one
//! at a time. Iteration failures are isolated and recorded; an interrupt
//! aborts the sweep and propagates.

pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod report;
pub mod spec;

pub use error::{SweepError, SweepResult};
pub use orchestrator::SweepOrchestrator;
pub use progress::{SweepProgressEvent, SweepStage};
pub use report::{IncompleteSweepWarning, ScanReport, ScanReportSummary};
pub use spec::{Spacing, SweepRange, SweepSpecification};
