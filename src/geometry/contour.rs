//! Moore-neighbour boundary tracing and polygon measures.
use super::components::{Component, Labeling};

/// Clockwise (in image coordinates, y down) neighbour offsets starting west.
const MOORE: [(i64, i64); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

fn direction_index(dx: i64, dy: i64) -> usize {
    MOORE
        .iter()
        .position(|&d| d == (dx, dy))
        .unwrap_or(0)
}

/// Trace the outer boundary of `component` as an ordered, closed chain of
/// 8-adjacent pixel positions (the closing step back to the first point is
/// implicit).
///
/// Tracing starts at the component's first raster pixel with the backtrack
/// cell to its west, walks clockwise and stops when the first move would be
/// repeated from the start pixel.
pub fn trace_outer_boundary(labeling: &Labeling, component: &Component) -> Vec<(i64, i64)> {
    let label = component.label;
    let start = (component.start.0 as i64, component.start.1 as i64);
    let is_fg = |p: (i64, i64)| labeling.label_at_signed(p.0, p.1) == label;

    let mut contour = vec![start];
    let mut current = start;
    let mut backtrack = 0usize; // west
    let mut first_move: Option<(i64, i64)> = None;
    let limit = 4 * component.area + 8;

    for _ in 0..limit {
        let mut next = None;
        for k in 1..=8 {
            let idx = (backtrack + k) % 8;
            let cand = (current.0 + MOORE[idx].0, current.1 + MOORE[idx].1);
            if is_fg(cand) {
                let prev_idx = (backtrack + k - 1) % 8;
                let prev = (current.0 + MOORE[prev_idx].0, current.1 + MOORE[prev_idx].1);
                next = Some((cand, prev));
                break;
            }
        }
        let Some((cand, prev)) = next else {
            // isolated pixel
            break;
        };
        if current == start {
            match first_move {
                None => first_move = Some(cand),
                Some(first) if first == cand => break,
                Some(_) => {}
            }
        }
        backtrack = direction_index(prev.0 - cand.0, prev.1 - cand.1);
        current = cand;
        contour.push(current);
    }

    if contour.len() > 1 && contour.last() == Some(&start) {
        contour.pop();
    }
    contour
}

/// Closed chain-code length: 1 per axial step, √2 per diagonal step.
pub fn chain_perimeter(points: &[(i64, i64)]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            if a.0 != b.0 && a.1 != b.1 {
                std::f64::consts::SQRT_2
            } else if a == b {
                0.0
            } else {
                1.0
            }
        })
        .sum()
}

/// Absolute shoelace area of the closed polygon through `points`.
pub fn polygon_area(points: &[(i64, i64)]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let twice: i64 = (0..n)
        .map(|i| {
            let (x0, y0) = points[i];
            let (x1, y1) = points[(i + 1) % n];
            x0 * y1 - x1 * y0
        })
        .sum();
    twice.abs() as f64 * 0.5
}
