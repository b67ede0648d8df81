//! Shape descriptors of a labelled component.
use super::components::{Component, Labeling};
use super::contour::{chain_perimeter, polygon_area, trace_outer_boundary};
use super::hull::{convex_hull, hull_area};
use crate::types::BoundingBox;
use nalgebra::{Matrix2, Point2, SymmetricEigen};

#[derive(Clone, Debug)]
pub struct ShapeDescriptor {
    /// Pixel count.
    pub area: f64,
    /// Chain-code length of the outer boundary.
    pub perimeter: f64,
    /// `4π·area / perimeter²`, capped at 1.
    pub circularity: f64,
    /// Boundary polygon area over its convex hull area, capped at 1.
    pub convexity: f64,
    /// Bounding-box width over height.
    pub aspect_ratio: f64,
    pub bbox: BoundingBox,
    pub centroid: Point2<f64>,
    /// Major-axis direction in degrees, `[0, 180)`.
    pub orientation_deg: f64,
    /// Square root of the eigenvalue ratio of the pixel covariance (≥ 1).
    pub elongation: f64,
}

impl ShapeDescriptor {
    /// Measure `component`. Returns `None` for components whose boundary has
    /// zero length (single pixels).
    pub fn measure(labeling: &Labeling, component: &Component) -> Option<Self> {
        let contour = trace_outer_boundary(labeling, component);
        let perimeter = chain_perimeter(&contour);
        if perimeter <= 0.0 {
            return None;
        }
        let area = component.area as f64;
        let circularity = (4.0 * std::f64::consts::PI * area / (perimeter * perimeter)).min(1.0);

        let boundary: Vec<Point2<f64>> = contour
            .iter()
            .map(|&(x, y)| Point2::new(x as f64, y as f64))
            .collect();
        let hull = hull_area(&convex_hull(&boundary));
        let convexity = if hull > 0.0 {
            (polygon_area(&contour) / hull).min(1.0)
        } else {
            0.0
        };

        let bbox = component.bbox;
        let aspect_ratio = bbox.width as f64 / bbox.height.max(1) as f64;

        let c = component.centroid;
        let (mut cxx, mut cxy, mut cyy) = (0.0, 0.0, 0.0);
        for (x, y) in labeling.pixels(component) {
            let dx = x as f64 - c.x;
            let dy = y as f64 - c.y;
            cxx += dx * dx;
            cxy += dx * dy;
            cyy += dy * dy;
        }
        let eig = SymmetricEigen::new(Matrix2::new(cxx, cxy, cxy, cyy) / area);
        let (major, lambda_max, lambda_min) = if eig.eigenvalues[0] >= eig.eigenvalues[1] {
            (eig.eigenvectors.column(0), eig.eigenvalues[0], eig.eigenvalues[1])
        } else {
            (eig.eigenvectors.column(1), eig.eigenvalues[1], eig.eigenvalues[0])
        };
        let orientation_deg = major[1].atan2(major[0]).to_degrees().rem_euclid(180.0);
        // pixel quantisation variance keeps thin shapes finite
        let elongation = ((lambda_max + 1.0 / 12.0) / (lambda_min + 1.0 / 12.0)).sqrt();

        Some(Self {
            area,
            perimeter,
            circularity,
            convexity,
            aspect_ratio,
            bbox,
            centroid: c,
            orientation_deg,
            elongation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::label_components;
    use crate::image::BinaryMask;

    fn measure(mask: &BinaryMask) -> ShapeDescriptor {
        let lab = label_components(mask);
        ShapeDescriptor::measure(&lab, &lab.components[0]).expect("measurable")
    }

    #[test]
    fn disk_is_round_and_convex() {
        let mask = BinaryMask::from_fn(120, 120, |x, y| {
            (x as f64 - 60.0).powi(2) + (y as f64 - 60.0).powi(2) <= 40.0 * 40.0
        });
        let d = measure(&mask);
        assert!(d.circularity > 0.85, "circularity {}", d.circularity);
        assert!(d.convexity > 0.97, "convexity {}", d.convexity);
        assert!((d.aspect_ratio - 1.0).abs() < 1e-9);
        assert!(d.elongation < 1.05);
    }

    #[test]
    fn crescent_is_not_convex() {
        let mask = BinaryMask::from_fn(120, 120, |x, y| {
            let outer = (x as f64 - 60.0).powi(2) + (y as f64 - 60.0).powi(2) <= 40.0 * 40.0;
            let bite = (x as f64 - 80.0).powi(2) + (y as f64 - 60.0).powi(2) <= 35.0 * 35.0;
            outer && !bite
        });
        let d = measure(&mask);
        assert!(d.convexity < 0.7, "convexity {}", d.convexity);
    }

    #[test]
    fn horizontal_bar_orientation_and_aspect() {
        let mask = BinaryMask::from_fn(60, 30, |x, y| (10..50).contains(&x) && (12..18).contains(&y));
        let d = measure(&mask);
        assert!((d.aspect_ratio - 40.0 / 6.0).abs() < 1e-9);
        assert!(d.orientation_deg < 1.0 || d.orientation_deg > 179.0);
        assert!(d.elongation > 4.0);
    }
}
