//! Point overrides handed to a single simulation invocation.
//!
//! An override set never mutates the base model; the simulator applies it to
//! its own working copy. The sweep builds a fresh set for every candidate.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::path::TargetPath;

/// Model attribute an override replaces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideAttribute {
    /// Initial amount of a quantity.
    #[default]
    InitialValue,
    /// First-order rate constant of a transfer.
    RateConstant,
}

impl fmt::Display for OverrideAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideAttribute::InitialValue => f.write_str("initial value"),
            OverrideAttribute::RateConstant => f.write_str("rate constant"),
        }
    }
}

/// Set `attribute` of `target` to `value`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelOverride {
    pub target: TargetPath,
    pub attribute: OverrideAttribute,
    pub value: f64,
}

/// Named collection of point overrides.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelOverrideSet {
    name: String,
    entries: Vec<ModelOverride>,
}

impl ModelOverrideSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Override set holding exactly one entry.
    pub fn single(
        name: impl Into<String>,
        target: TargetPath,
        attribute: OverrideAttribute,
        value: f64,
    ) -> Self {
        let mut set = Self::new(name);
        set.insert(target, attribute, value);
        set
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an override, replacing any existing entry for the same
    /// target and attribute.
    pub fn insert(&mut self, target: TargetPath, attribute: OverrideAttribute, value: f64) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|o| o.target == target && o.attribute == attribute)
        {
            existing.value = value;
            return;
        }
        self.entries.push(ModelOverride {
            target,
            attribute,
            value,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelOverride> {
        self.entries.iter()
    }
}
