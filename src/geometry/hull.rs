//! Andrew's monotone-chain convex hull.
use nalgebra::Point2;

fn cross(o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (a - o).perp(&(b - o))
}

/// Convex hull in counter-clockwise order (math orientation), without the
/// closing duplicate. Collinear points are dropped.
pub fn convex_hull(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut pts: Vec<Point2<f64>> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<Point2<f64>> = Vec::with_capacity(pts.len());
    for p in &pts {
        while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }
    let mut upper: Vec<Point2<f64>> = Vec::with_capacity(pts.len());
    for p in pts.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Shoelace area of a hull (or any simple polygon).
pub fn hull_area(hull: &[Point2<f64>]) -> f64 {
    if hull.len() < 3 {
        return 0.0;
    }
    let n = hull.len();
    let twice: f64 = (0..n)
        .map(|i| hull[i].coords.perp(&hull[(i + 1) % n].coords))
        .sum();
    twice.abs() * 0.5
}
