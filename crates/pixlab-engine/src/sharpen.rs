//! 3x3 sharpen convolution.

use crate::buffer::PixelBuffer;
use crate::kernel::{SHARPEN, map_interior};

/// Convolve R, G, B with the [`SHARPEN`] kernel, clamping to `0..=255`.
///
/// The outermost one-pixel ring is left unmodified, so images smaller
/// than 3x3 come back unchanged. Alpha is never touched.
pub fn apply_sharpen(buffer: &mut PixelBuffer) {
    map_interior(buffer, |hood| {
        std::array::from_fn(|c| {
            clamp_i32(SHARPEN.apply(|row, col| i32::from(hood.at(row, col)[c])))
        })
    });
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const fn clamp_i32(v: i32) -> u8 {
    if v < 0 {
        0
    } else if v > 255 {
        255
    } else {
        v as u8
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn uniform_buffer_is_unchanged() {
        let original = PixelBuffer::filled(6, 6, [90, 120, 30, 200]).unwrap();
        let mut buffer = original.clone();
        apply_sharpen(&mut buffer);
        assert_eq!(buffer, original);
    }

    #[test]
    fn single_pixel_is_unchanged() {
        let original = PixelBuffer::filled(1, 1, [1, 2, 3, 4]).unwrap();
        let mut buffer = original.clone();
        apply_sharpen(&mut buffer);
        assert_eq!(buffer, original);
    }

    #[test]
    fn bright_center_saturates_and_darkens_neighbors() {
        let mut buffer = PixelBuffer::from_fn(5, 5, |x, y| {
            if (x, y) == (2, 2) {
                [100, 100, 100, 255]
            } else {
                [50, 50, 50, 255]
            }
        })
        .unwrap();
        apply_sharpen(&mut buffer);
        // Center: 5 * 100 - 4 * 50 = 300 -> 255.
        assert_eq!(buffer.get_pixel(2, 2), Some([255, 255, 255, 255]));
        // Direct neighbor: 5 * 50 - 3 * 50 - 100 = 0.
        assert_eq!(buffer.get_pixel(1, 2), Some([0, 0, 0, 255]));
        // Diagonal neighbor sees only 50s: 5 * 50 - 4 * 50 = 50.
        assert_eq!(buffer.get_pixel(1, 1), Some([50, 50, 50, 255]));
    }

    #[test]
    fn border_ring_is_untouched() {
        #[allow(clippy::cast_possible_truncation)]
        let original =
            PixelBuffer::from_fn(5, 4, |x, y| [(x * 40) as u8, (y * 60) as u8, 7, 255]).unwrap();
        let mut buffer = original.clone();
        apply_sharpen(&mut buffer);
        for y in 0..4 {
            for x in 0..5 {
                if x == 0 || y == 0 || x == 4 || y == 3 {
                    assert_eq!(buffer.get_pixel(x, y), original.get_pixel(x, y), "at ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn reads_unmodified_neighbors() {
        // Horizontal ramp: the linear interior is a fixed point of the
        // Laplacian, so every interior pixel must keep its value. Reading
        // already-sharpened neighbors would break that.
        #[allow(clippy::cast_possible_truncation)]
        let original = PixelBuffer::from_fn(6, 3, |x, _| [(x * 20) as u8, 0, 0, 255]).unwrap();
        let mut buffer = original.clone();
        apply_sharpen(&mut buffer);
        assert_eq!(buffer, original);
    }
}
