//! ps-core: stable foundation for paramscan.
//!
//! Contains:
//! - units (time units backed by uom)
//! - numeric (Real + tolerances + float helpers)
//! - config (named mutable configuration fields + get/set accessors)
//! - scoped (configuration overrides restored on scope exit)
//! - timing (wall-clock timers)
//! - error (shared error types)

pub mod config;
pub mod error;
pub mod numeric;
pub mod scoped;
pub mod timing;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use config::{ConfigAccess, ConfigField, ConfigValue};
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use scoped::{ConfigOverrides, ConfigurationSnapshot, ScopedConfigOverride};
pub use timing::{AccumulatingTimer, Timer};
pub use units::TimeUnit;
