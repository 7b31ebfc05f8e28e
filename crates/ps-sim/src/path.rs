//! Hierarchical paths naming a model quantity, e.g. `Plasma/Drug`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Path of a target quantity, outermost container first.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetPath {
    segments: Vec<String>,
}

impl TargetPath {
    pub const SEPARATOR: char = '/';

    pub fn new<I, S>(segments: I) -> Result<Self, SimError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments
            .into_iter()
            .map(|s| s.into().trim().to_string())
            .collect();
        if segments.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return Err(SimError::InvalidArg {
                what: "target path segments must be non-empty",
            });
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Innermost segment (the entity itself).
    pub fn leaf(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Enclosing container path, if any.
    pub fn container(&self) -> Option<TargetPath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", Self::SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for TargetPath {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.split(Self::SEPARATOR))
    }
}

impl TryFrom<String> for TargetPath {
    type Error = SimError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TargetPath> for String {
    fn from(path: TargetPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let path: TargetPath = "Plasma/Drug".parse().unwrap();
        assert_eq!(path.segments(), ["Plasma", "Drug"]);
        assert_eq!(path.leaf(), "Drug");
        assert_eq!(path.container().unwrap().to_string(), "Plasma");
        assert_eq!(path.to_string(), "Plasma/Drug");
    }

    #[test]
    fn trims_segments() {
        let path: TargetPath = " GI_Tract / Drug ".parse().unwrap();
        assert_eq!(path.to_string(), "GI_Tract/Drug");
    }

    #[test]
    fn rejects_empty_segments() {
        assert!("".parse::<TargetPath>().is_err());
        assert!("Plasma//Drug".parse::<TargetPath>().is_err());
        assert!("Plasma/".parse::<TargetPath>().is_err());
    }

    #[test]
    fn single_segment_has_no_container() {
        let path: TargetPath = "absorption".parse().unwrap();
        assert!(path.container().is_none());
    }
}
