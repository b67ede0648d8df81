//! Feature extractors: independent per-pixel evidence fields in `[0, 1]`.
//!
//! Each extractor is a pure function of the input [`Image`] and its parameter
//! struct. They share no mutable state, so the pipeline may run several of
//! them concurrently on the same image.
//!
//! Extractors that cannot compute on a degenerate input (flat image,
//! zero-variance field) report [`DegenerateInput`]; [`ExtractorKind::extract`]
//! recovers that locally as an all-zero mask, so absence of signal never
//! surfaces as a failure.

pub mod color;
pub mod contour;
pub mod shadow;
pub mod texture;

pub use color::ColorCoverageExtractor;
pub use contour::ContourGeometryExtractor;
pub use shadow::ShadowDepthExtractor;
pub use texture::TextureIrregularityExtractor;

use crate::detector::{MethodConfig, ModeProfile};
use crate::geometry::ShapeDescriptor;
use crate::image::{BinaryMask, Image, ImageF32};
use crate::regions::RegionBounds;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identity of a feature extractor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    Color,
    Contour,
    Texture,
    Shadow,
}

impl ExtractorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractorKind::Color => "color",
            ExtractorKind::Contour => "contour",
            ExtractorKind::Texture => "texture",
            ExtractorKind::Shadow => "shadow",
        }
    }

    /// Run the extractor bound to this identity, substituting an all-zero
    /// mask when the input is degenerate for it.
    pub fn extract(self, image: &Image, config: &MethodConfig, ctx: &ExtractContext) -> FeatureMask {
        let outcome = match self {
            ExtractorKind::Color => ColorCoverageExtractor::new(&config.color).extract(image, ctx),
            ExtractorKind::Contour => {
                ContourGeometryExtractor::new(&config.contour).extract(image, ctx)
            }
            ExtractorKind::Texture => {
                TextureIrregularityExtractor::new(&config.texture).extract(image, ctx)
            }
            ExtractorKind::Shadow => ShadowDepthExtractor::new(&config.shadow).extract(image, ctx),
        };
        match outcome {
            Ok(mask) => mask,
            Err(err) => {
                debug!("{} extractor: {} -> zero mask", self, err);
                FeatureMask::zeros(self, image.width(), image.height())
            }
        }
    }
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for which an extractor has no meaningful output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("degenerate input: {0}")]
pub struct DegenerateInput(pub &'static str);

/// Per-call values threaded into every extractor.
#[derive(Clone, Debug)]
pub struct ExtractContext {
    pub profile: ModeProfile,
    /// Multiplier from working-resolution pixel counts to full-resolution area.
    pub area_scale: f64,
    /// Acceptance bounds for provisional shapes.
    pub bounds: RegionBounds,
}

/// Common signature of the feature extractors.
pub trait FeatureExtractor {
    fn kind(&self) -> ExtractorKind;

    fn extract(&self, image: &Image, ctx: &ExtractContext) -> Result<FeatureMask, DegenerateInput>;
}

/// Scalar evidence field produced by one extractor.
#[derive(Clone, Debug)]
pub struct FeatureMask {
    pub kind: ExtractorKind,
    /// Values in `[0, 1]` at working resolution.
    pub field: ImageF32,
    /// Provisional shape metadata (contour extractor only).
    pub shapes: Vec<ShapeDescriptor>,
}

impl FeatureMask {
    pub fn new(kind: ExtractorKind, mut field: ImageF32) -> Self {
        field.clamp_in_place(0.0, 1.0);
        Self {
            kind,
            field,
            shapes: Vec::new(),
        }
    }

    pub fn zeros(kind: ExtractorKind, w: usize, h: usize) -> Self {
        Self::new(kind, ImageF32::new(w, h))
    }

    /// Binary view used for consensus: foreground where the value is >= 0.5.
    pub fn binarize(&self) -> BinaryMask {
        BinaryMask {
            w: self.field.w,
            h: self.field.h,
            data: self.field.data.iter().map(|&v| (v >= 0.5) as u8).collect(),
        }
    }

    /// Fraction of pixels with evidence >= 0.5.
    pub fn coverage(&self) -> f32 {
        self.binarize().fraction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_mask_values_are_clamped() {
        let field = ImageF32::from_fn(4, 1, |x, _| x as f32 - 1.0);
        let mask = FeatureMask::new(ExtractorKind::Shadow, field);
        assert_eq!(mask.field.data, vec![0.0, 0.0, 1.0, 1.0]);
        assert_eq!(mask.binarize().count(), 2);
        assert!((mask.coverage() - 0.5).abs() < 1e-6);
    }
}
