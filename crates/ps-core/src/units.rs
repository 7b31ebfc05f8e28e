// ps-core/src/units.rs

use core::fmt;
use core::str::FromStr;

use uom::si::f64::Time as UomTime;
use uom::si::time::{day, hour, minute, second};

use crate::CoreError;

// Public canonical unit type (SI, f64)
pub type Time = UomTime;

#[inline]
pub fn s(v: f64) -> Time {
    Time::new::<second>(v)
}

/// Time unit declared by a simulation configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum TimeUnit {
    #[default]
    Second,
    Minute,
    Hour,
    Day,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 4] = [
        TimeUnit::Second,
        TimeUnit::Minute,
        TimeUnit::Hour,
        TimeUnit::Day,
    ];

    /// Name used in axis labels, e.g. `Time (hour)`.
    pub fn name(self) -> &'static str {
        match self {
            TimeUnit::Second => "second",
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
        }
    }

    /// Build a uom time from a value expressed in this unit.
    pub fn quantity(self, v: f64) -> Time {
        match self {
            TimeUnit::Second => Time::new::<second>(v),
            TimeUnit::Minute => Time::new::<minute>(v),
            TimeUnit::Hour => Time::new::<hour>(v),
            TimeUnit::Day => Time::new::<day>(v),
        }
    }

    /// Express a uom time in this unit.
    pub fn value_of(self, t: Time) -> f64 {
        match self {
            TimeUnit::Second => t.get::<second>(),
            TimeUnit::Minute => t.get::<minute>(),
            TimeUnit::Hour => t.get::<hour>(),
            TimeUnit::Day => t.get::<day>(),
        }
    }

    pub fn to_seconds(self, v: f64) -> f64 {
        self.quantity(v).get::<second>()
    }

    pub fn from_seconds(self, seconds: f64) -> f64 {
        self.value_of(s(seconds))
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "second" | "seconds" => Ok(TimeUnit::Second),
            "min" | "minute" | "minutes" => Ok(TimeUnit::Minute),
            "h" | "hr" | "hour" | "hours" => Ok(TimeUnit::Hour),
            "d" | "day" | "days" => Ok(TimeUnit::Day),
            other => Err(CoreError::UnknownTimeUnit(other.to_string())),
        }
    }
}
