//! Sweep specification: which quantity to vary and through which values.
//!
//! Values are either listed explicitly or generated from a range with linear
//! or logarithmic spacing. A specification is immutable once built.

use std::fmt;

use ps_core::{Tolerances, linspace, logspace, nearly_equal};
use ps_sim::{OverrideAttribute, TargetPath};
use serde::{Deserialize, Serialize};

use crate::error::{SweepError, SweepResult};

/// Type of sweep progression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spacing {
    /// Uniformly spaced points
    #[default]
    Linear,
    /// Logarithmically spaced points
    Logarithmic,
}

/// Range a sweep's candidate values are generated from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRange {
    pub start: f64,
    pub end: f64,
    /// Number of points to generate
    pub points: usize,
    #[serde(default)]
    pub spacing: Spacing,
}

impl SweepRange {
    pub fn validate(&self) -> SweepResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(invalid("range bounds must be finite"));
        }
        if self.points < 2 {
            return Err(invalid("sweep must have at least 2 points"));
        }
        if nearly_equal(self.start, self.end, Tolerances::default()) {
            return Err(invalid("start and end values must be different"));
        }
        if self.spacing == Spacing::Logarithmic && (self.start <= 0.0 || self.end <= 0.0) {
            return Err(invalid("logarithmic sweep bounds must be positive"));
        }
        Ok(())
    }

    /// Generate all points in the sweep.
    pub fn generate_points(&self) -> SweepResult<Vec<f64>> {
        self.validate()?;
        Ok(match self.spacing {
            Spacing::Linear => self.generate_linear(),
            Spacing::Logarithmic => self.generate_logarithmic(),
        })
    }

    fn generate_linear(&self) -> Vec<f64> {
        linspace(self.start, self.end, self.points)
    }

    fn generate_logarithmic(&self) -> Vec<f64> {
        logspace(self.start, self.end, self.points)
    }
}

/// Ordered candidate values for one target quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepSpecification {
    target: TargetPath,
    attribute: OverrideAttribute,
    values: Vec<f64>,
}

impl SweepSpecification {
    /// Sweep the initial value of `target` through `values`, in order.
    ///
    /// Values must be finite and pairwise distinct so that every candidate is
    /// either scanned or errored, never both.
    pub fn new(target: TargetPath, values: Vec<f64>) -> SweepResult<Self> {
        if values.is_empty() {
            return Err(invalid("sweep needs at least one candidate value"));
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite()) {
            return Err(SweepError::InvalidSpecification(format!(
                "candidate value {v} is not finite"
            )));
        }
        for (i, v) in values.iter().enumerate() {
            if values[..i].contains(v) {
                return Err(SweepError::InvalidSpecification(format!(
                    "candidate value {v} appears more than once"
                )));
            }
        }
        Ok(Self {
            target,
            attribute: OverrideAttribute::InitialValue,
            values,
        })
    }

    pub fn from_range(target: TargetPath, range: &SweepRange) -> SweepResult<Self> {
        Self::new(target, range.generate_points()?)
    }

    /// Sweep a different attribute of the target.
    pub fn with_attribute(mut self, attribute: OverrideAttribute) -> Self {
        self.attribute = attribute;
        self
    }

    pub fn target(&self) -> &TargetPath {
        &self.target
    }

    pub fn attribute(&self) -> OverrideAttribute {
        self.attribute
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Spacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "Linear"),
            Self::Logarithmic => write!(f, "Logarithmic"),
        }
    }
}

impl fmt::Display for SweepSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sweep {} of {} over {} value(s)",
            self.attribute,
            self.target,
            self.values.len()
        )
    }
}

fn invalid(msg: &str) -> SweepError {
    SweepError::InvalidSpecification(msg.to_string())
}
