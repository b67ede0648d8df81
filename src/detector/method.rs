//! Closed set of detection methods and targets.
use crate::extractors::ExtractorKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the caller is looking for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionTarget {
    /// Discrete road-surface depressions filtered by strict shape bounds.
    #[default]
    Pothole,
    /// Area coverage (grass, weeds); only a minimum area applies.
    Vegetation,
}

impl DetectionTarget {
    /// Extractors fused by [`Method::Combined`] for this target.
    pub fn combined_extractors(self) -> &'static [ExtractorKind] {
        match self {
            DetectionTarget::Pothole => &[
                ExtractorKind::Contour,
                ExtractorKind::Texture,
                ExtractorKind::Shadow,
            ],
            DetectionTarget::Vegetation => &[ExtractorKind::Color, ExtractorKind::Texture],
        }
    }

    pub fn is_coverage(self) -> bool {
        matches!(self, DetectionTarget::Vegetation)
    }
}

/// Detection method selected per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Color,
    Contour,
    Texture,
    Shadow,
    Combined,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::Color,
        Method::Contour,
        Method::Texture,
        Method::Shadow,
        Method::Combined,
    ];

    /// Extractors this method runs for `target`, before mode adjustments.
    pub fn extractors(self, target: DetectionTarget) -> Vec<ExtractorKind> {
        match self {
            Method::Color => vec![ExtractorKind::Color],
            Method::Contour => vec![ExtractorKind::Contour],
            Method::Texture => vec![ExtractorKind::Texture],
            Method::Shadow => vec![ExtractorKind::Shadow],
            Method::Combined => target.combined_extractors().to_vec(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Color => "color",
            Method::Contour => "contour",
            Method::Texture => "texture",
            Method::Shadow => "shadow",
            Method::Combined => "combined",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown method '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_depends_on_target() {
        assert_eq!(
            Method::Combined.extractors(DetectionTarget::Pothole),
            vec![
                ExtractorKind::Contour,
                ExtractorKind::Texture,
                ExtractorKind::Shadow
            ]
        );
        assert_eq!(
            Method::Combined.extractors(DetectionTarget::Vegetation),
            vec![ExtractorKind::Color, ExtractorKind::Texture]
        );
        assert_eq!(
            Method::Shadow.extractors(DetectionTarget::Vegetation),
            vec![ExtractorKind::Shadow]
        );
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Contour".parse::<Method>(), Ok(Method::Contour));
        assert!("deep_learning".parse::<Method>().is_err());
    }
}
