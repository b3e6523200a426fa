//! Box blur over a clipped square window.
//!
//! Each pixel's R, G, B become the mean of the `(2r+1) x (2r+1)` window
//! centered on it. Near the edges the window is clipped to the buffer
//! and the divisor is the number of in-bounds samples, so border pixels
//! average fewer neighbors instead of mixing in synthetic ones.
//!
//! Reads come from a snapshot taken before the pass; cost is
//! `O(width * height * radius^2)`.

use crate::buffer::{PixelBuffer, div_round_ties_even, rewrite_rows};
use crate::types::CHANNELS;

/// Blur R, G, and B with a box window of the given `radius`.
///
/// Alpha is left untouched. Means round to nearest, halves to even
/// (255 / 6 = 42.5 is stored as 42). A radius of 0 is a one-pixel
/// window and leaves the buffer unchanged; the operation layer rejects
/// it before it gets here.
pub fn apply_blur(buffer: &mut PixelBuffer, radius: u32) {
    if radius == 0 {
        return;
    }
    let (width, height) = (buffer.width() as usize, buffer.height() as usize);
    let stride = width * CHANNELS;
    let r = radius as usize;

    rewrite_rows(buffer, |y, snapshot, row| {
        let rows = y.saturating_sub(r)..=y.saturating_add(r).min(height - 1);
        for x in 0..width {
            let cols = x.saturating_sub(r)..=x.saturating_add(r).min(width - 1);
            let mut sums = [0u64; 3];
            let mut count = 0u64;
            for ny in rows.clone() {
                let line = &snapshot[ny * stride..(ny + 1) * stride];
                for nx in cols.clone() {
                    let px = &line[nx * CHANNELS..nx * CHANNELS + 3];
                    for (sum, &c) in sums.iter_mut().zip(px) {
                        *sum += u64::from(c);
                    }
                    count += 1;
                }
            }
            for (c, sum) in sums.into_iter().enumerate() {
                row[x * CHANNELS + c] = rounded_mean(sum, count);
            }
        }
    });
}

#[allow(clippy::cast_possible_truncation)]
const fn rounded_mean(sum: u64, count: u64) -> u8 {
    // Mean of u8 samples always fits in a u8.
    div_round_ties_even(sum, count) as u8
}
