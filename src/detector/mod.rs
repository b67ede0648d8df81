//! Detection front door: configuration, methods, quality modes and the
//! [`SurfaceDetector`] pipeline.
//!
//! Modules
//! - [`params`]: per-stage parameter structs grouped into [`MethodConfig`].
//! - [`method`]: the closed [`Method`] and [`DetectionTarget`] enums.
//! - [`mode`]: [`QualityMode`] and the [`ModeProfile`] it resolves to.
//! - `pipeline`: [`SurfaceDetector`], [`detect`] and [`detect_batch`].

pub mod method;
pub mod mode;
pub mod params;
mod pipeline;

pub use method::{DetectionTarget, Method};
pub use mode::{ModeProfile, QualityMode};
pub use params::{
    ColorBand, ColorParams, ConfidenceWeights, ContourParams, ExtractorWeights, FusionParams,
    MethodConfig, ModeParams, RegionParams, ScenarioThresholds, ScoringParams, ShadowParams,
    TextureParams,
};
pub use pipeline::{detect, detect_batch, SurfaceDetector, MIN_DIMENSION};
