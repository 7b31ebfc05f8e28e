//! Simulation invocation for parameter scans.
//!
//! Provides:
//! - Target paths and per-invocation model override sets
//! - Immutable trajectory results with named series
//! - The `SimulationInvoker` seam the sweep drives
//! - A reference compartment-model simulator (fixed-step RK4 / forward Euler)
//! - Cooperative cancellation surfaced as an interrupt

pub mod compartment;
pub mod config;
pub mod error;
pub mod integrator;
pub mod invoker;
pub mod model;
pub mod overrides;
pub mod path;
pub mod sim;
pub mod trajectory;

// Re-exports for public API
pub use compartment::{CompartmentModel, Quantity, Transfer};
pub use config::{IntegratorType, SimConfig};
pub use error::{FailureKind, InvokeError, SimError, SimResult};
pub use integrator::{ForwardEuler, Integrator, RK4};
pub use invoker::{CancelToken, OdeSimulator, SimulationInvoker};
pub use model::TransientModel;
pub use overrides::{ModelOverride, ModelOverrideSet, OverrideAttribute};
pub use path::TargetPath;
pub use sim::{SimOptions, SimRecord, run_sim};
pub use trajectory::{NamedSeries, RunSet, TrajectoryMetadata, TrajectoryResult};
