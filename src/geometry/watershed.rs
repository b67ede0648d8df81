//! Marker-based watershed on the distance transform, used to separate
//! touching blobs that were merged into one component.
use super::components::label_components;
use super::distance::chamfer_distance;
use crate::image::BinaryMask;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Split the foreground of `mask` along watershed lines.
///
/// Markers are the 8-connected blobs where the distance exceeds
/// `marker_ratio · max`. Returns `None` when fewer than two markers exist.
/// Otherwise every pixel is flooded from the markers in order of decreasing
/// distance, and a pixel is carved out when one of its 8-neighbours belongs to
/// a basin with a smaller label, leaving 8-disconnected pieces.
pub fn split_touching(mask: &BinaryMask, marker_ratio: f32) -> Option<BinaryMask> {
    let (w, h) = (mask.w, mask.h);
    let dist = chamfer_distance(mask);
    let max = dist.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return None;
    }
    let cut = marker_ratio as f64 * max as f64;
    let seeds = BinaryMask {
        w,
        h,
        data: dist.iter().map(|&d| (d as f64 > cut) as u8).collect(),
    };
    let markers = label_components(&seeds);
    if markers.components.len() < 2 {
        return None;
    }

    let mut basin = markers.labels.clone();
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;
    for (i, &l) in basin.iter().enumerate() {
        if l != 0 {
            heap.push((dist[i], Reverse(seq), i));
            seq += 1;
        }
    }
    while let Some((_, _, i)) = heap.pop() {
        let (x, y) = (i % w, i / w);
        let label = basin[i];
        for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                let j = ny * w + nx;
                if mask.data[j] != 0 && basin[j] == 0 {
                    basin[j] = label;
                    heap.push((dist[j], Reverse(seq), j));
                    seq += 1;
                }
            }
        }
    }

    let mut out = mask.clone();
    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            let l = basin[i];
            if l == 0 {
                continue;
            }
            let touches_lower = (y.saturating_sub(1)..=(y + 1).min(h - 1)).any(|ny| {
                (x.saturating_sub(1)..=(x + 1).min(w - 1)).any(|nx| {
                    let m = basin[ny * w + nx];
                    m != 0 && m < l
                })
            });
            if touches_lower {
                out.data[i] = 0;
            }
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_disks() -> BinaryMask {
        BinaryMask::from_fn(50, 30, |x, y| {
            let d1 = (x as f32 - 15.0).powi(2) + (y as f32 - 15.0).powi(2);
            let d2 = (x as f32 - 33.0).powi(2) + (y as f32 - 15.0).powi(2);
            d1 <= 100.0 || d2 <= 100.0
        })
    }

    #[test]
    fn overlapping_disks_are_separated() {
        let mask = two_disks();
        assert_eq!(label_components(&mask).components.len(), 1);
        let split = split_touching(&mask, 0.6).expect("two markers");
        let lab = label_components(&split);
        assert_eq!(lab.components.len(), 2);
        assert!(mask.count() - split.count() < 40);
    }

    #[test]
    fn single_disk_has_one_marker() {
        let mask = BinaryMask::from_fn(30, 30, |x, y| {
            (x as f32 - 15.0).powi(2) + (y as f32 - 15.0).powi(2) <= 100.0
        });
        assert!(split_touching(&mask, 0.6).is_none());
    }
}
