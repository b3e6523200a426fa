//! Per-pixel filters: contrast, threshold, inversion, grayscale.
//!
//! Each output pixel depends only on the same input pixel, so these
//! filters need no snapshot and have no border handling. All of them
//! leave the alpha channel untouched and cannot fail.

use crate::buffer::{LUMA_SCALE, PixelBuffer, clamp_channel, luma_channel, luma_milli};
use crate::types::CHANNELS;

/// Shift R, G, and B by `(factor - 1) * 255`, clamped to `0..=255`.
///
/// This is a linear offset rather than a stretch around mid-gray:
/// `factor > 1` brightens, `factor < 1` darkens, and `factor == 1`
/// leaves the buffer unchanged. Fractional results round to nearest,
/// halves to even, so with the default offset of 127.5 an input of 11
/// becomes 138 and 13 becomes 140.
pub fn adjust_contrast(buffer: &mut PixelBuffer, factor: f64) {
    let offset = (factor - 1.0) * 255.0;
    for_each_rgb(buffer, |rgb| {
        for c in rgb {
            *c = clamp_channel(f64::from(*c) + offset);
        }
    });
}

/// Binarize by luma: R, G, B become 255 where `luma >= threshold`,
/// otherwise 0.
///
/// A pixel whose luma equals `threshold` exactly becomes white.
pub fn apply_threshold(buffer: &mut PixelBuffer, threshold: f64) {
    let cutoff = threshold * f64::from(LUMA_SCALE);
    for_each_rgb(buffer, |rgb| {
        let value = if f64::from(luma_milli(rgb[0], rgb[1], rgb[2])) >= cutoff {
            255
        } else {
            0
        };
        rgb.fill(value);
    });
}

/// Replace each of R, G, B with `255 - value`.
pub fn invert_colors(buffer: &mut PixelBuffer) {
    for_each_rgb(buffer, |rgb| {
        for c in rgb {
            *c = !*c;
        }
    });
}

/// Set R, G, and B to the rounded luma of the pixel (halves to even).
pub fn convert_to_grayscale(buffer: &mut PixelBuffer) {
    for_each_rgb(buffer, |rgb| {
        rgb.fill(luma_channel(rgb[0], rgb[1], rgb[2]));
    });
}

fn for_each_rgb(buffer: &mut PixelBuffer, mut f: impl FnMut(&mut [u8])) {
    for pixel in buffer.data_mut().chunks_exact_mut(CHANNELS) {
        f(&mut pixel[..3]);
    }
}
