use thiserror::Error;

use crate::config::ConfigField;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Unknown time unit: {0}")]
    UnknownTimeUnit(String),

    #[error("Type mismatch for config field {field}: expected {expected}")]
    FieldType {
        field: ConfigField,
        expected: &'static str,
    },

    #[error("Rejected value for config field {field}: {reason}")]
    Rejected { field: ConfigField, reason: String },
}
