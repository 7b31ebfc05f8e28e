//! Colors, axis properties and text handling.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

const DEFAULT_COLORS: [Rgb; 7] = [
    Rgb::new(0, 114, 189),
    Rgb::new(217, 83, 25),
    Rgb::new(237, 177, 32),
    Rgb::new(126, 47, 142),
    Rgb::new(119, 172, 48),
    Rgb::new(77, 190, 238),
    Rgb::new(162, 20, 47),
];

/// Ordered line colors. Never empty.
///
/// The palette is handed to every draw call and indexed explicitly, so there
/// is no color cycle state to reset between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> PlotResult<Self> {
        if colors.is_empty() {
            return Err(PlotError::InvalidArg {
                what: "palette needs at least one color".to_string(),
            });
        }
        Ok(Self { colors })
    }

    /// Color at `index`, wrapping around the palette.
    pub fn color(&self, index: usize) -> Rgb {
        self.colors[index % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    #[default]
    Linear,
    Log,
}

/// Caller-supplied axis customisation, applied to every produced axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "property", rename_all = "snake_case")]
pub enum AxisProperty {
    XLimits { min: f64, max: f64 },
    YLimits { min: f64, max: f64 },
    XScale { scale: Scale },
    YScale { scale: Scale },
    Grid { visible: bool },
    FontSize { size: u32 },
}

impl AxisProperty {
    pub fn validate(&self) -> PlotResult<()> {
        match *self {
            AxisProperty::XLimits { min, max } | AxisProperty::YLimits { min, max } => {
                if !min.is_finite() || !max.is_finite() || min >= max {
                    return Err(PlotError::InvalidArg {
                        what: format!("axis limits must be finite with min < max, got [{min}, {max}]"),
                    });
                }
            }
            AxisProperty::FontSize { size } if size == 0 => {
                return Err(PlotError::InvalidArg {
                    what: "font size must be positive".to_string(),
                });
            }
            _ => {}
        }
        Ok(())
    }

    /// Validate `properties` as applied together, in order.
    ///
    /// A log axis can only show positive values, so limits reaching zero or
    /// below are rejected whichever order scale and limits were given in.
    pub fn validate_all(properties: &[AxisProperty]) -> PlotResult<()> {
        let mut x = (Scale::Linear, None);
        let mut y = (Scale::Linear, None);
        for property in properties {
            property.validate()?;
            match *property {
                AxisProperty::XLimits { min, .. } => x.1 = Some(min),
                AxisProperty::YLimits { min, .. } => y.1 = Some(min),
                AxisProperty::XScale { scale } => x.0 = scale,
                AxisProperty::YScale { scale } => y.0 = scale,
                _ => {}
            }
        }
        for (axis, (scale, min)) in [("x", x), ("y", y)] {
            if let (Scale::Log, Some(min)) = (scale, min)
                && min <= 0.0
            {
                return Err(PlotError::InvalidArg {
                    what: format!("{axis} limits must be positive on a log axis, got min {min}"),
                });
            }
        }
        Ok(())
    }
}

/// How a backend should treat markup characters in text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextInterpreter {
    /// Text is shown exactly as given; `_`, `^` and friends are not markup.
    #[default]
    Literal,
}
