#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod stream;
pub mod types;

// Stage building blocks. Public for tools and tests; not a stable API.
pub mod edges;
pub mod extractors;
pub mod filters;
pub mod fusion;
pub mod geometry;
pub mod morphology;
pub mod regions;
pub mod scoring;

// Tool configuration for `src/bin`.
pub mod config;

// --- High-level re-exports -------------------------------------------------

// Main entry points: detector, configuration and results.
pub use crate::detector::{
    detect, detect_batch, DetectionTarget, Method, MethodConfig, QualityMode, SurfaceDetector,
};
pub use crate::error::{DetectionError, ValidationError};
pub use crate::types::{BoundingBox, DensityClass, DetectionResult, Region};

// Scores and diagnostics carried by every result.
pub use crate::diagnostics::{DetectionReport, PipelineTrace, ScenarioFlag};
pub use crate::scoring::{ConfidenceBreakdown, ConfidenceLevel};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use surface_detector::prelude::*;
///
/// # fn main() -> Result<(), DetectionError> {
/// let (w, h) = (640usize, 480usize);
/// let image = Image::from_gray(w, h, vec![128u8; w * h])?;
///
/// let detector = SurfaceDetector::new(MethodConfig::pothole())?;
/// let result = detector.detect(&image, Method::Combined, QualityMode::RealTime)?;
/// println!(
///     "regions={} confidence={:.3} flags={:?}",
///     result.regions.len(),
///     result.confidence,
///     result.flags
/// );
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::Image;
    pub use crate::{
        DetectionError, DetectionResult, Method, MethodConfig, QualityMode, SurfaceDetector,
    };
}
