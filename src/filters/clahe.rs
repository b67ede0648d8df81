//! Contrast-limited adaptive histogram equalisation on 8-bit planes.
//!
//! The image is split into a `tiles × tiles` grid; each tile gets a clipped
//! histogram whose excess is redistributed uniformly before building the
//! equalisation LUT. Output pixels bilinearly blend the LUTs of the four
//! nearest tile centres, which avoids block seams.
use crate::image::ImageU8;

/// Apply CLAHE and return the equalised plane (`stride == w`).
///
/// `clip_limit` is relative to the mean bin height (OpenCV convention);
/// values `<= 0` disable clipping.
pub fn clahe(src: &ImageU8<'_>, clip_limit: f32, tiles: usize) -> Vec<u8> {
    let (w, h) = (src.w, src.h);
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let tiles_x = tiles.clamp(1, w);
    let tiles_y = tiles.clamp(1, h);

    let bounds = |i: usize, n: usize, len: usize| (i * len / n, (i + 1) * len / n);

    let mut luts = vec![[0u8; 256]; tiles_x * tiles_y];
    for ty in 0..tiles_y {
        let (y0, y1) = bounds(ty, tiles_y, h);
        for tx in 0..tiles_x {
            let (x0, x1) = bounds(tx, tiles_x, w);
            let mut hist = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[src.get(x, y) as usize] += 1;
                }
            }
            let area = ((x1 - x0) * (y1 - y0)) as u32;
            if clip_limit > 0.0 {
                clip_histogram(&mut hist, clip_limit, area);
            }
            let lut = &mut luts[ty * tiles_x + tx];
            let scale = 255.0 / area.max(1) as f32;
            let mut cdf = 0u32;
            for (v, &count) in hist.iter().enumerate() {
                cdf += count;
                lut[v] = (cdf as f32 * scale).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    let tile_w = w as f32 / tiles_x as f32;
    let tile_h = h as f32 / tiles_y as f32;
    let mut out = vec![0u8; w * h];
    for y in 0..h {
        let fy = (y as f32 + 0.5) / tile_h - 0.5;
        let ty0 = fy.floor().clamp(0.0, (tiles_y - 1) as f32) as usize;
        let ty1 = (ty0 + 1).min(tiles_y - 1);
        let ay = (fy - ty0 as f32).clamp(0.0, 1.0);
        for x in 0..w {
            let fx = (x as f32 + 0.5) / tile_w - 0.5;
            let tx0 = fx.floor().clamp(0.0, (tiles_x - 1) as f32) as usize;
            let tx1 = (tx0 + 1).min(tiles_x - 1);
            let ax = (fx - tx0 as f32).clamp(0.0, 1.0);
            let v = src.get(x, y) as usize;
            let l00 = luts[ty0 * tiles_x + tx0][v] as f32;
            let l01 = luts[ty0 * tiles_x + tx1][v] as f32;
            let l10 = luts[ty1 * tiles_x + tx0][v] as f32;
            let l11 = luts[ty1 * tiles_x + tx1][v] as f32;
            let top = l00 + (l01 - l00) * ax;
            let bottom = l10 + (l11 - l10) * ax;
            out[y * w + x] = (top + (bottom - top) * ay).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

fn clip_histogram(hist: &mut [u32; 256], clip_limit: f32, area: u32) {
    let limit = ((clip_limit * area as f32 / 256.0) as u32).max(1);
    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }
    let per_bin = excess / 256;
    let residual = (excess % 256) as usize;
    for bin in hist.iter_mut() {
        *bin += per_bin;
    }
    if residual > 0 {
        // spread the leftover evenly over the range, not just the low bins
        let step = (256 / residual).max(1);
        for bin in hist.iter_mut().step_by(step).take(residual) {
            *bin += 1;
        }
    }
}
