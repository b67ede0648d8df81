use crate::diagnostics::TimingBreakdown;
use crate::detector::{DetectionTarget, Method, QualityMode};
use crate::extractors::ExtractorKind;
use crate::types::DetectionResult;
use serde::Serialize;

/// Result produced by [`SurfaceDetector::detect_with_diagnostics`](crate::SurfaceDetector).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub result: DetectionResult,
    pub trace: PipelineTrace,
}

/// End-to-end trace describing the internal execution of one call.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTrace {
    pub input: InputDescriptor,
    pub timings: TimingBreakdown,
    pub extractors: Vec<ExtractorStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fusion: Option<FusionStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions: Option<RegionStage>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub work_width: usize,
    pub work_height: usize,
    pub method: Method,
    pub target: DetectionTarget,
    pub mode: QualityMode,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractorStage {
    pub kind: ExtractorKind,
    /// Fraction of working-resolution pixels with evidence >= 0.5.
    pub coverage: f32,
    /// Provisional shapes reported by the extractor (contour only).
    pub shapes: usize,
    pub elapsed_ms: f64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionStage {
    pub weights: Vec<(ExtractorKind, f32)>,
    pub threshold: f32,
    pub raised_for_low_contrast: bool,
    pub coverage: f32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStage {
    pub candidates: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub watershed_splits: usize,
}
