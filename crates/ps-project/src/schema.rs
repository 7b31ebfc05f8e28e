//! Scan file schema definitions.

use std::path::PathBuf;

use ps_core::TimeUnit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanFile {
    pub version: u32,
    pub name: String,
    pub model: ModelDef,
    #[serde(default)]
    pub config: ConfigDef,
    /// Applied for the duration of the sweep only.
    #[serde(default)]
    pub config_overrides: ConfigOverridesDef,
    pub sweep: SweepDef,
    #[serde(default)]
    pub plot: PlotDef,
    #[serde(default)]
    pub outputs: OutputsDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelDef {
    pub name: String,
    #[serde(default)]
    pub quantities: Vec<QuantityDef>,
    #[serde(default)]
    pub transfers: Vec<TransferDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuantityDef {
    pub name: String,
    /// Slash-separated path, e.g. `Plasma/Drug`
    pub path: String,
    #[serde(default)]
    pub initial_value: f64,
}

/// First-order transfer; a missing `to` is elimination out of the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransferDef {
    pub name: String,
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Per model second
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorDef {
    #[default]
    Rk4,
    ForwardEuler,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigDef {
    pub stop_time: f64,
    pub time_unit: TimeUnit,
    pub unit_conversion: bool,
    pub step_size: f64,
    pub record_every: usize,
    pub max_steps: usize,
    pub integrator: IntegratorDef,
}

impl Default for ConfigDef {
    fn default() -> Self {
        Self {
            stop_time: 10.0,
            time_unit: TimeUnit::Second,
            unit_conversion: false,
            step_size: 1e-2,
            record_every: 10,
            max_steps: 1_000_000,
            integrator: IntegratorDef::Rk4,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigOverridesDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_unit: Option<TimeUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_conversion: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttributeDef {
    #[default]
    InitialValue,
    RateConstant,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpacingDef {
    #[default]
    Linear,
    Logarithmic,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RangeDef {
    pub start: f64,
    pub end: f64,
    pub points: usize,
    #[serde(default)]
    pub spacing: SpacingDef,
}

/// Exactly one of `values` and `range` must be given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepDef {
    /// Quantity path or name; a transfer name for `rate_constant`.
    pub target: String,
    #[serde(default)]
    pub attribute: AttributeDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeDef>,
}

/// `all`, or an explicit list of series names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SeriesDef {
    Keyword(String),
    Names(Vec<String>),
}

impl Default for SeriesDef {
    fn default() -> Self {
        SeriesDef::Keyword("all".to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDef {
    #[default]
    Overlay,
    Trellis,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScaleDef {
    #[default]
    Linear,
    Log,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AxisDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_limits: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_limits: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_scale: Option<ScaleDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_scale: Option<ScaleDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlotDef {
    pub series: SeriesDef,
    pub layout: LayoutDef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xlabel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ylabel: Option<String>,
    pub axis: AxisDef,
    pub width: u32,
    pub height: u32,
}

impl Default for PlotDef {
    fn default() -> Self {
        Self {
            series: SeriesDef::default(),
            layout: LayoutDef::Overlay,
            title: None,
            xlabel: None,
            ylabel: None,
            axis: AxisDef::default(),
            width: 1024,
            height: 768,
        }
    }
}

/// Output locations, relative paths resolved against the scan file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputsDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PathBuf>,
}
