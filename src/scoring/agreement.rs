//! Consensus, count plausibility and spatial dispersion sub-scores.
use crate::extractors::FeatureMask;
use crate::types::Region;
use nalgebra::{Point2, Vector2};

/// Mean pairwise IoU of the extractors' binary masks.
///
/// Fewer than two masks, or only pairs where both masks are empty, yield
/// `neutral`.
pub fn consensus(masks: &[FeatureMask], neutral: f64) -> f64 {
    if masks.len() < 2 {
        return neutral;
    }
    let binary: Vec<_> = masks.iter().map(FeatureMask::binarize).collect();
    let mut sum = 0.0f64;
    let mut pairs = 0usize;
    for i in 0..binary.len() {
        for j in i + 1..binary.len() {
            if let Some(iou) = binary[i].iou(&binary[j]) {
                sum += iou as f64;
                pairs += 1;
            }
        }
    }
    if pairs == 0 {
        neutral
    } else {
        (sum / pairs as f64).clamp(0.0, 1.0)
    }
}

/// 0 for no regions, 1 up to `max_count`, then decaying as `max_count / n`.
pub fn count_plausibility(n: usize, max_count: usize) -> f64 {
    match n {
        0 => 0.0,
        n if n <= max_count => 1.0,
        n => max_count as f64 / n as f64,
    }
}

/// Spread of region centroids over a `width × height` frame.
///
/// Half of the score is the occupancy of a 3×3 grid (cells hit over
/// `min(n, 9)`), half the RMS centroid distance relative to a quarter of the
/// frame diagonal. Fewer than two regions score 0.5.
pub fn spatial_dispersion(regions: &[Region], width: usize, height: usize) -> f64 {
    if regions.len() < 2 || width == 0 || height == 0 {
        return 0.5;
    }
    let n = regions.len();
    let mut cells = [false; 9];
    for r in regions {
        let cx = ((r.centroid.x.max(0.0) * 3.0 / width as f64) as usize).min(2);
        let cy = ((r.centroid.y.max(0.0) * 3.0 / height as f64) as usize).min(2);
        cells[cy * 3 + cx] = true;
    }
    let hit = cells.iter().filter(|&&c| c).count();
    let occupancy = hit as f64 / n.min(9) as f64;

    let mean: Vector2<f64> =
        regions.iter().map(|r| r.centroid.coords).sum::<Vector2<f64>>() / n as f64;
    let mean = Point2::from(mean);
    let rms = (regions
        .iter()
        .map(|r| (r.centroid - mean).norm_squared())
        .sum::<f64>()
        / n as f64)
        .sqrt();
    let half_diagonal = 0.5 * ((width * width + height * height) as f64).sqrt();
    let spread = (2.0 * rms / half_diagonal).min(1.0);

    (0.5 * occupancy + 0.5 * spread).clamp(0.0, 1.0)
}
