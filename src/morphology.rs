//! Binary morphology with elliptical structuring elements.
//!
//! Out-of-bounds positions are ignored rather than treated as background, so
//! an all-foreground mask is a fixed point of every operator here.
use crate::image::BinaryMask;

/// Structuring element stored as horizontal runs `(dy, dx_min, dx_max)`
/// relative to the anchor (the centre cell).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructuringElement {
    size: usize,
    spans: Vec<(isize, isize, isize)>,
}

impl StructuringElement {
    /// Filled ellipse inscribed in a `size × size` box.
    ///
    /// Row extents follow `dx = round(c · sqrt((r² − dy²) / r²))`, which for
    /// size 5 yields `00100 / 11111 / 11111 / 11111 / 00100`.
    pub fn ellipse(size: usize) -> Self {
        let size = size.max(1);
        let r = (size / 2) as isize;
        let c = (size / 2) as f64;
        let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };
        let mut spans = Vec::with_capacity(size);
        for i in 0..size as isize {
            let dy = i - r;
            if dy.abs() > r {
                continue;
            }
            let dx = (c * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round() as isize;
            let lo = (-dx).max(-(size as isize / 2));
            let hi = dx.min(size as isize - 1 - size as isize / 2);
            spans.push((dy, lo, hi));
        }
        Self { size, spans }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of cells in the element.
    pub fn area(&self) -> usize {
        self.spans
            .iter()
            .map(|&(_, lo, hi)| (hi - lo + 1) as usize)
            .sum()
    }

    fn is_identity(&self) -> bool {
        self.area() <= 1
    }
}

fn apply(mask: &BinaryMask, se: &StructuringElement, dilate: bool) -> BinaryMask {
    if se.is_identity() || mask.w == 0 || mask.h == 0 {
        return mask.clone();
    }
    let (w, h) = (mask.w as isize, mask.h as isize);
    let mut out = BinaryMask::new(mask.w, mask.h);
    for y in 0..h {
        for x in 0..w {
            // dilate: any in-bounds 1; erode: no in-bounds 0
            let mut hit = !dilate;
            'spans: for &(dy, lo, hi) in &se.spans {
                let sy = y + dy;
                if sy < 0 || sy >= h {
                    continue;
                }
                let row = &mask.data[(sy * w) as usize..((sy + 1) * w) as usize];
                let x0 = (x + lo).max(0);
                let x1 = (x + hi).min(w - 1);
                for sx in x0..=x1 {
                    let on = row[sx as usize] != 0;
                    if dilate && on {
                        hit = true;
                        break 'spans;
                    }
                    if !dilate && !on {
                        hit = false;
                        break 'spans;
                    }
                }
            }
            out.data[(y * w + x) as usize] = hit as u8;
        }
    }
    out
}

pub fn dilate(mask: &BinaryMask, se: &StructuringElement) -> BinaryMask {
    apply(mask, se, true)
}

pub fn erode(mask: &BinaryMask, se: &StructuringElement) -> BinaryMask {
    apply(mask, se, false)
}

/// Dilation followed by erosion; bridges gaps narrower than the element.
pub fn close(mask: &BinaryMask, se: &StructuringElement) -> BinaryMask {
    erode(&dilate(mask, se), se)
}

/// Erosion followed by dilation; removes specks smaller than the element.
pub fn open(mask: &BinaryMask, se: &StructuringElement) -> BinaryMask {
    dilate(&erode(mask, se), se)
}

/// Fill every background pocket that is not 4-connected to the image border.
pub fn fill_holes(mask: &BinaryMask) -> BinaryMask {
    let (w, h) = (mask.w, mask.h);
    let mut outside = vec![false; w * h];
    let mut stack = Vec::new();
    let mut seed = |x: usize, y: usize, outside: &mut Vec<bool>, stack: &mut Vec<usize>| {
        let i = y * w + x;
        if mask.data[i] == 0 && !outside[i] {
            outside[i] = true;
            stack.push(i);
        }
    };
    for x in 0..w {
        seed(x, 0, &mut outside, &mut stack);
        if h > 1 {
            seed(x, h - 1, &mut outside, &mut stack);
        }
    }
    for y in 0..h {
        seed(0, y, &mut outside, &mut stack);
        if w > 1 {
            seed(w - 1, y, &mut outside, &mut stack);
        }
    }
    while let Some(i) = stack.pop() {
        let (x, y) = (i % w, i / w);
        let mut visit = |j: usize| {
            if mask.data[j] == 0 && !outside[j] {
                outside[j] = true;
                stack.push(j);
            }
        };
        if x > 0 {
            visit(i - 1);
        }
        if x + 1 < w {
            visit(i + 1);
        }
        if y > 0 {
            visit(i - w);
        }
        if y + 1 < h {
            visit(i + w);
        }
    }
    BinaryMask {
        w,
        h,
        data: outside.iter().map(|&o| (!o) as u8).collect(),
    }
}
