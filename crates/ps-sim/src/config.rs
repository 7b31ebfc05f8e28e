//! Simulation configuration handed to every invocation.

use ps_core::{
    ConfigAccess, ConfigField, ConfigValue, CoreError, CoreResult, TimeUnit, ensure_finite,
};
use serde::{Deserialize, Serialize};

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorType {
    /// 4th-order Runge-Kutta (default, most accurate, 4 rhs calls per step).
    #[default]
    RK4,
    /// Forward Euler (1st-order, faster, 1 rhs call per step).
    ForwardEuler,
}

/// Configuration for one simulation run.
///
/// `stop_time` and `step_size` are expressed in `time_unit` when
/// `unit_conversion` is on, and in raw model time otherwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub stop_time: f64,
    #[serde(default)]
    pub time_unit: TimeUnit,
    #[serde(default)]
    pub unit_conversion: bool,
    #[serde(default = "default_step_size")]
    pub step_size: f64,
    /// Record every N-th step (decimation)
    #[serde(default = "default_record_every")]
    pub record_every: usize,
    /// Maximum number of steps (safety limit)
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default)]
    pub integrator: IntegratorType,
}

fn default_step_size() -> f64 {
    1e-2
}

fn default_record_every() -> usize {
    10
}

fn default_max_steps() -> usize {
    1_000_000
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            stop_time: 10.0,
            time_unit: TimeUnit::default(),
            unit_conversion: false,
            step_size: default_step_size(),
            record_every: default_record_every(),
            max_steps: default_max_steps(),
            integrator: IntegratorType::default(),
        }
    }
}

impl SimConfig {
    /// Stop time and step size in model time (seconds when converting).
    pub fn model_time_span(&self) -> (f64, f64) {
        if self.unit_conversion {
            (
                self.time_unit.to_seconds(self.stop_time),
                self.time_unit.to_seconds(self.step_size),
            )
        } else {
            (self.stop_time, self.step_size)
        }
    }

    /// Map a model time sample to the reported time axis.
    pub fn report_time(&self, model_t: f64) -> f64 {
        if self.unit_conversion {
            self.time_unit.from_seconds(model_t)
        } else {
            model_t
        }
    }
}

impl ConfigAccess for SimConfig {
    fn get(&self, field: ConfigField) -> ConfigValue {
        match field {
            ConfigField::StopTime => ConfigValue::Real(self.stop_time),
            ConfigField::TimeUnit => ConfigValue::TimeUnit(self.time_unit),
            ConfigField::UnitConversion => ConfigValue::Flag(self.unit_conversion),
        }
    }

    fn set(&mut self, field: ConfigField, value: ConfigValue) -> CoreResult<()> {
        match field {
            ConfigField::StopTime => {
                let v = ensure_finite(value.as_real(field)?, "stop time")?;
                if v < 0.0 {
                    return Err(CoreError::Rejected {
                        field,
                        reason: format!("stop time must be non-negative, got {v}"),
                    });
                }
                self.stop_time = v;
            }
            ConfigField::TimeUnit => self.time_unit = value.as_time_unit(field)?,
            ConfigField::UnitConversion => self.unit_conversion = value.as_flag(field)?,
        }
        Ok(())
    }
}
