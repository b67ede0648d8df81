use crate::detector::{DetectionTarget, Method, QualityMode};
use crate::diagnostics::ScenarioFlag;
use crate::image::BinaryMask;
use crate::scoring::{ConfidenceBreakdown, ConfidenceLevel};
use nalgebra::Point2;
use serde::Serialize;

/// Axis-aligned pixel rectangle; `width`/`height` count pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Grow by `margin` on every side, clipped to a `w × h` image.
    pub fn expanded(&self, margin: u32, w: usize, h: usize) -> BoundingBox {
        let x0 = self.x.saturating_sub(margin);
        let y0 = self.y.saturating_sub(margin);
        let x1 = (self.right() + margin).min(w as u32);
        let y1 = (self.bottom() + margin).min(h as u32);
        BoundingBox {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }

    /// Map from a resampled frame back to a `w × h` frame by per-axis scale
    /// factors, clipped to the target image.
    pub fn scaled(&self, sx: f64, sy: f64, w: usize, h: usize) -> BoundingBox {
        let x0 = ((self.x as f64 * sx).floor() as u32).min(w.saturating_sub(1) as u32);
        let y0 = ((self.y as f64 * sy).floor() as u32).min(h.saturating_sub(1) as u32);
        let x1 = ((self.right() as f64 * sx).ceil() as u32).clamp(x0 + 1, w as u32);
        let y1 = ((self.bottom() as f64 * sy).ceil() as u32).clamp(y0 + 1, h as u32);
        BoundingBox {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}

/// One detected instance.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub bbox: BoundingBox,
    /// Pixel area in full-resolution units.
    pub area: f64,
    pub perimeter: f64,
    pub circularity: f64,
    pub convexity: f64,
    pub aspect_ratio: f64,
    pub centroid: Point2<f64>,
    pub orientation_deg: f64,
    pub elongation: f64,
    /// Mean gray level (0..255) inside the region.
    pub mean_intensity: f64,
    /// Mean gray level of the surrounding background ring.
    pub background_intensity: f64,
    /// `(background − mean) / 255`; positive for regions darker than their
    /// surroundings.
    pub contrast: f64,
    pub confidence: f64,
}

/// Vegetation coverage density class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityClass {
    Low,
    Medium,
    High,
}

impl DensityClass {
    /// Classify a coverage percentage; `None` when nothing was detected.
    pub fn from_coverage(coverage_percentage: f64, region_count: usize) -> Option<Self> {
        if region_count == 0 {
            None
        } else if coverage_percentage < 10.0 {
            Some(DensityClass::Low)
        } else if coverage_percentage < 30.0 {
            Some(DensityClass::Medium)
        } else {
            Some(DensityClass::High)
        }
    }
}

/// Outcome of one detection call. Immutable once returned.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub method: Method,
    pub target: DetectionTarget,
    pub mode: QualityMode,
    pub width: usize,
    pub height: usize,
    pub regions: Vec<Region>,
    /// `100 · Σ region area / (width · height)`.
    pub coverage_percentage: f64,
    pub total_area: f64,
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    pub breakdown: ConfidenceBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<DensityClass>,
    /// Sorted, de-duplicated.
    pub flags: Vec<ScenarioFlag>,
    /// Final binary mask at input resolution.
    #[serde(skip)]
    pub mask: BinaryMask,
}

impl DetectionResult {
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn has_flag(&self, flag: ScenarioFlag) -> bool {
        self.flags.contains(&flag)
    }
}
