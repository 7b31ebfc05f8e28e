//! Named mutable configuration fields and their accessors.
//!
//! Simulation configurations are opaque to the sweep machinery. Only the
//! fields listed in [`ConfigField`] are read or written, always through
//! [`ConfigAccess`].

use core::fmt;

use crate::error::{CoreError, CoreResult};
use crate::units::TimeUnit;

/// Mutable configuration field that a sweep may override.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfigField {
    StopTime,
    TimeUnit,
    UnitConversion,
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigField::StopTime => "stop time",
            ConfigField::TimeUnit => "time unit",
            ConfigField::UnitConversion => "unit conversion",
        };
        f.write_str(name)
    }
}

/// Value held by a [`ConfigField`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigValue {
    Real(f64),
    TimeUnit(TimeUnit),
    Flag(bool),
}

impl ConfigValue {
    pub fn as_real(&self, field: ConfigField) -> CoreResult<f64> {
        match self {
            ConfigValue::Real(v) => Ok(*v),
            _ => Err(CoreError::FieldType {
                field,
                expected: "real",
            }),
        }
    }

    pub fn as_time_unit(&self, field: ConfigField) -> CoreResult<TimeUnit> {
        match self {
            ConfigValue::TimeUnit(u) => Ok(*u),
            _ => Err(CoreError::FieldType {
                field,
                expected: "time unit",
            }),
        }
    }

    pub fn as_flag(&self, field: ConfigField) -> CoreResult<bool> {
        match self {
            ConfigValue::Flag(b) => Ok(*b),
            _ => Err(CoreError::FieldType {
                field,
                expected: "flag",
            }),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Real(v) => write!(f, "{v}"),
            ConfigValue::TimeUnit(u) => write!(f, "{u}"),
            ConfigValue::Flag(b) => write!(f, "{b}"),
        }
    }
}

/// Get/set accessors over the mutable fields of a configuration.
pub trait ConfigAccess {
    /// Current value of `field`.
    fn get(&self, field: ConfigField) -> ConfigValue;

    /// Replace the value of `field`. Implementations reject values of the
    /// wrong type or out of range and leave the field untouched.
    fn set(&mut self, field: ConfigField, value: ConfigValue) -> CoreResult<()>;
}
