//! Sobel edge detection over luma.
//!
//! For every interior pixel, the horizontal and vertical Sobel responses
//! are computed from the luma of each of the nine neighbors (not from a
//! pre-converted grayscale copy), and the gradient magnitude
//! `sqrt(gx^2 + gy^2)`, capped at 255, is written to R, G, and B.
//!
//! The border policy matches [`apply_sharpen`](crate::sharpen::apply_sharpen):
//! the outermost ring keeps its original values.

use crate::buffer::{LUMA_SCALE, PixelBuffer, clamp_channel, luma_milli};
use crate::kernel::{Neighborhood, SOBEL_X, SOBEL_Y, map_interior};

/// Replace R, G, B of interior pixels with the Sobel gradient magnitude.
pub fn detect_edges(buffer: &mut PixelBuffer) {
    map_interior(buffer, |hood| {
        let magnitude = gradient_magnitude(hood);
        [magnitude; 3]
    });
}

/// Sobel magnitude at the center of `hood`, rounded and capped at 255.
fn gradient_magnitude(hood: &Neighborhood<'_>) -> u8 {
    let luma_at = |row, col| {
        let px = hood.at(row, col);
        i64::from(luma_milli(px[0], px[1], px[2]))
    };
    // Fixed-point gradients, still in thousandths of a luma unit.
    let gx: i64 = SOBEL_X.apply(luma_at);
    let gy: i64 = SOBEL_Y.apply(luma_at);
    #[allow(clippy::cast_precision_loss)]
    let squared = (gx * gx + gy * gy) as f64;
    clamp_channel(squared.sqrt() / f64::from(LUMA_SCALE))
}
