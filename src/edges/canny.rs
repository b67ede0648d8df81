//! Canny edge detector: Sobel gradients, directional non-maximum suppression
//! and 8-connected hysteresis.
//!
//! Thresholds apply to the L1 gradient magnitude `|gx| + |gy|` of the input
//! plane (0..255 intensities). NMS keeps a pixel when it is strictly greater
//! than the neighbour "behind" it and not smaller than the one "ahead", so a
//! two-pixel plateau of equal response thins to a single pixel.
//! The outermost 1-pixel frame never carries an edge.
use crate::edges::grad::{sobel_gradients, Grad};
use crate::image::{BinaryMask, ImageF32, ImageView};

const TAN_22_5_DEG: f32 = 0.414_213_57;

/// Edge map plus the gradients it was computed from.
pub struct CannyResult {
    pub edges: BinaryMask,
    pub grad: Grad,
}

/// Run Canny on `l` with hysteresis thresholds `low < high`.
pub fn canny(l: &ImageF32, low: f32, high: f32) -> CannyResult {
    let grad = sobel_gradients(l);
    let edges = canny_from_gradients(&grad, low, high);
    CannyResult { edges, grad }
}

/// Hysteresis edge map from precomputed gradients.
pub fn canny_from_gradients(grad: &Grad, low: f32, high: f32) -> BinaryMask {
    let (w, h) = (grad.gx.w, grad.gx.h);
    let mut edges = BinaryMask::new(w, h);
    if w < 3 || h < 3 {
        return edges;
    }
    let (low, high) = if low <= high { (low, high) } else { (high, low) };
    let mag = grad.l1_magnitude();

    // 0 = suppressed, 1 = weak candidate, 2 = strong
    let mut state = vec![0u8; w * h];
    let mut stack = Vec::new();
    for y in 1..h - 1 {
        let prev = mag.row(y - 1);
        let row = mag.row(y);
        let next = mag.row(y + 1);
        let gx_row = grad.gx.row(y);
        let gy_row = grad.gy.row(y);
        for x in 1..w - 1 {
            let m = row[x];
            if m <= low {
                continue;
            }
            let gx = gx_row[x];
            let gy = gy_row[x];
            let (ax, ay) = (gx.abs(), gy.abs());
            let same_sign = (gx >= 0.0) == (gy >= 0.0);
            let (behind, ahead) = if ay <= ax * TAN_22_5_DEG {
                (row[x - 1], row[x + 1])
            } else if ax <= ay * TAN_22_5_DEG {
                (prev[x], next[x])
            } else if same_sign {
                (prev[x - 1], next[x + 1])
            } else {
                (prev[x + 1], next[x - 1])
            };
            if m > behind && m >= ahead {
                let i = y * w + x;
                if m > high {
                    state[i] = 2;
                    stack.push(i);
                } else {
                    state[i] = 1;
                }
            }
        }
    }

    while let Some(i) = stack.pop() {
        edges.data[i] = 1;
        let (x, y) = (i % w, i / w);
        for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                let j = ny * w + nx;
                if state[j] == 1 {
                    state[j] = 2;
                    stack.push(j);
                }
            }
        }
    }
    edges
}
