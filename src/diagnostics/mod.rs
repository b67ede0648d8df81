//! Diagnostics attached to detection results.
//!
//! - [`scenario`]: the rule table that turns image statistics and sub-scores
//!   into [`ScenarioFlag`]s carried by every result.
//! - [`pipeline`]: the optional [`PipelineTrace`] returned next to the result
//!   by [`SurfaceDetector::detect_with_diagnostics`](crate::SurfaceDetector),
//!   with per-stage timings and counters.

pub mod pipeline;
pub mod scenario;
pub mod timing;

pub use pipeline::{
    DetectionReport, ExtractorStage, FusionStage, InputDescriptor, PipelineTrace, RegionStage,
};
pub use scenario::{evaluate as evaluate_scenarios, ScenarioFlag, ScenarioInput};
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
