//! Two-pass chamfer (3-4) distance transform.
//!
//! Values are in thirds of a pixel: an axial step costs 3, a diagonal one 4.
//! Pixels outside the image count as background.
use crate::image::BinaryMask;

const AXIAL: u32 = 3;
const DIAGONAL: u32 = 4;

/// Chamfer distance from each foreground pixel to the nearest background.
/// Background pixels hold 0.
pub fn chamfer_distance(mask: &BinaryMask) -> Vec<u32> {
    let (w, h) = (mask.w, mask.h);
    let inf = u32::MAX / 2;
    let mut d: Vec<u32> = mask
        .data
        .iter()
        .map(|&v| if v != 0 { inf } else { 0 })
        .collect();

    let at = |d: &Vec<u32>, x: isize, y: isize| -> u32 {
        if x < 0 || y < 0 || x >= w as isize || y >= h as isize {
            0
        } else {
            d[y as usize * w + x as usize]
        }
    };

    for y in 0..h as isize {
        for x in 0..w as isize {
            let i = y as usize * w + x as usize;
            if d[i] == 0 {
                continue;
            }
            let best = [
                at(&d, x - 1, y) + AXIAL,
                at(&d, x, y - 1) + AXIAL,
                at(&d, x - 1, y - 1) + DIAGONAL,
                at(&d, x + 1, y - 1) + DIAGONAL,
            ]
            .into_iter()
            .min()
            .unwrap_or(inf);
            d[i] = d[i].min(best);
        }
    }
    for y in (0..h as isize).rev() {
        for x in (0..w as isize).rev() {
            let i = y as usize * w + x as usize;
            if d[i] == 0 {
                continue;
            }
            let best = [
                at(&d, x + 1, y) + AXIAL,
                at(&d, x, y + 1) + AXIAL,
                at(&d, x + 1, y + 1) + DIAGONAL,
                at(&d, x - 1, y + 1) + DIAGONAL,
            ]
            .into_iter()
            .min()
            .unwrap_or(inf);
            d[i] = d[i].min(best);
        }
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances_grow_towards_the_centre() {
        let mask = BinaryMask::full(7, 7);
        let d = chamfer_distance(&mask);
        assert_eq!(d[0], AXIAL);
        assert_eq!(d[3 * 7 + 3], 4 * AXIAL);
        assert_eq!(d[3 * 7 + 1], 2 * AXIAL);
    }

    #[test]
    fn background_is_zero() {
        let mask = BinaryMask::from_fn(5, 5, |x, _| x > 2);
        let d = chamfer_distance(&mask);
        assert_eq!(d[2], 0);
        assert_eq!(d[3], AXIAL);
    }
}
