//! The owned RGBA pixel buffer every operation works on.
//!
//! A [`PixelBuffer`] is a row-major sequence of RGBA quadruplets whose
//! length is always exactly `width * height * 4`, with both dimensions
//! positive. The invariant is checked once at construction so that no
//! operation has to re-validate it before touching pixels.

use crate::types::{CHANNELS, Dimensions, EngineError, RgbaImage};

/// Red weight of the luma formula, in thousandths.
pub const LUMA_RED: u32 = 299;
/// Green weight of the luma formula, in thousandths.
pub const LUMA_GREEN: u32 = 587;
/// Blue weight of the luma formula, in thousandths.
pub const LUMA_BLUE: u32 = 114;
/// Scale of the fixed-point luma weights.
pub const LUMA_SCALE: u32 = 1000;

/// Luma in thousandths: `299*R + 587*G + 114*B`, in `0..=255_000`.
///
/// This is the one luma function of the engine. Threshold, grayscale,
/// histogram, and edge detection all go through it so their results
/// agree bit for bit. Integer weights keep mid-gray inputs exact
/// (`luma_milli(128, 128, 128) == 128_000`).
#[must_use]
pub const fn luma_milli(r: u8, g: u8, b: u8) -> u32 {
    LUMA_RED * r as u32 + LUMA_GREEN * g as u32 + LUMA_BLUE * b as u32
}

/// Luma rounded to the nearest integer, halves up.
///
/// Used where luma is a bucket index rather than a stored sample.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    // At most (255_000 + 500) / 1000 = 255.
    ((luma_milli(r, g, b) + LUMA_SCALE / 2) / LUMA_SCALE) as u8
}

/// Luma as a stored channel value: nearest integer, halves to even.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_lossless)]
pub const fn luma_channel(r: u8, g: u8, b: u8) -> u8 {
    div_round_ties_even(luma_milli(r, g, b) as u64, LUMA_SCALE as u64) as u8
}

/// `numerator / denominator` rounded to nearest, halves to even.
///
/// `denominator` must be non-zero.
pub(crate) const fn div_round_ties_even(numerator: u64, denominator: u64) -> u64 {
    let quotient = numerator / denominator;
    let twice_remainder = 2 * (numerator % denominator);
    if twice_remainder > denominator || (twice_remainder == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

/// Round a float sample to the nearest integer, halves to even, and
/// clamp it into `0..=255`.
///
/// Every float result that is stored as a channel goes through here.
/// NaN maps to 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_channel(value: f64) -> u8 {
    value.round_ties_even().clamp(0.0, 255.0) as u8
}

/// An owned RGBA image buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidDimensions`] if either dimension is
    /// zero or `data.len() != width * height * 4`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, EngineError> {
        let expected = expected_len(width, height);
        if width == 0 || height == 0 || expected != Some(data.len()) {
            return Err(EngineError::InvalidDimensions {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A buffer where every pixel is `rgba`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidDimensions`] if either dimension is
    /// zero or the buffer size overflows `usize`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, EngineError> {
        let invalid = EngineError::InvalidDimensions {
            width,
            height,
            len: 0,
        };
        let len = expected_len(width, height).ok_or_else(|| invalid.clone())?;
        if len == 0 {
            return Err(invalid);
        }
        let data = rgba.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel.
    ///
    /// # Errors
    ///
    /// Same conditions as [`PixelBuffer::filled`].
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> [u8; 4],
    ) -> Result<Self, EngineError> {
        let mut buffer = Self::filled(width, height, [0; 4])?;
        for y in 0..height {
            for x in 0..width {
                buffer.set_pixel(x, y, f(x, y));
            }
        }
        Ok(buffer)
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Width and height together.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Number of pixels (`width * height`).
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        self.data.len() / CHANNELS
    }

    /// Length of the raw byte buffer (`width * height * 4`).
    #[must_use]
    pub const fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Raw RGBA bytes in row-major order.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer and return its raw bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Iterate over pixels as `[r, g, b, a]` slices in row-major order.
    pub fn pixels(&self) -> impl ExactSizeIterator<Item = &[u8]> {
        self.data.chunks_exact(CHANNELS)
    }

    /// The RGBA value at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Overwrite the pixel at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.index(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&rgba);
    }

    /// Convert into an `image` crate buffer for encoding.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidDimensions`] if `image` rejects the
    /// raw layout.
    pub fn into_rgba_image(self) -> Result<RgbaImage, EngineError> {
        let (width, height, len) = (self.width, self.height, self.data.len());
        RgbaImage::from_raw(width, height, self.data).ok_or(EngineError::InvalidDimensions {
            width,
            height,
            len,
        })
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Byte offset of pixel `(x, y)`.
    const fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }
}

impl TryFrom<RgbaImage> for PixelBuffer {
    type Error = EngineError;

    fn try_from(image: RgbaImage) -> Result<Self, Self::Error> {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }
}

fn expected_len(width: u32, height: u32) -> Option<usize> {
    usize::try_from(width)
        .ok()?
        .checked_mul(usize::try_from(height).ok()?)?
        .checked_mul(CHANNELS)
}

/// Rewrite every row of `buffer` from a read-only snapshot of itself.
///
/// `f(y, snapshot, row)` receives the row index, the full pre-pass
/// contents, and the mutable bytes of row `y`. Rows never read each
/// other's output, so with the `parallel` feature they are processed
/// on the rayon pool and the result is identical to the sequential pass.
pub(crate) fn rewrite_rows<F>(buffer: &mut PixelBuffer, f: F)
where
    F: Fn(usize, &[u8], &mut [u8]) + Send + Sync,
{
    let stride = buffer.width as usize * CHANNELS;
    let snapshot = buffer.data.clone();

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        buffer
            .data
            .par_chunks_exact_mut(stride)
            .enumerate()
            .for_each(|(y, row)| f(y, &snapshot, row));
    }

    #[cfg(not(feature = "parallel"))]
    buffer
        .data
        .chunks_exact_mut(stride)
        .enumerate()
        .for_each(|(y, row)| f(y, &snapshot, row));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_matching_length() {
        let buffer = PixelBuffer::new(2, 3, vec![0; 24]).unwrap();
        assert_eq!(buffer.width(), 2);
        assert_eq!(buffer.height(), 3);
        assert_eq!(buffer.pixel_count(), 6);
        assert_eq!(buffer.byte_len(), 24);
    }

    #[test]
    fn new_rejects_zero_width() {
        let result = PixelBuffer::new(0, 3, Vec::new());
        assert!(matches!(
            result,
            Err(EngineError::InvalidDimensions {
                width: 0,
                height: 3,
                len: 0
            })
        ));
    }

    #[test]
    fn new_rejects_zero_height() {
        let result = PixelBuffer::new(3, 0, Vec::new());
        assert!(matches!(result, Err(EngineError::InvalidDimensions { .. })));
    }

    #[test]
    fn new_rejects_length_mismatch() {
        let result = PixelBuffer::new(2, 2, vec![0; 15]);
        assert!(matches!(
            result,
            Err(EngineError::InvalidDimensions { len: 15, .. })
        ));
    }

    #[test]
    fn new_rejects_length_not_multiple_of_four() {
        let result = PixelBuffer::new(1, 1, vec![0; 3]);
        assert!(matches!(result, Err(EngineError::InvalidDimensions { .. })));
    }

    #[test]
    fn filled_repeats_color() {
        let buffer = PixelBuffer::filled(3, 2, [1, 2, 3, 4]).unwrap();
        assert_eq!(buffer.byte_len(), 24);
        for pixel in buffer.pixels() {
            assert_eq!(pixel, [1, 2, 3, 4]);
        }
    }

    #[test]
    fn from_fn_is_row_major() {
        #[allow(clippy::cast_possible_truncation)]
        let buffer = PixelBuffer::from_fn(3, 2, |x, y| [x as u8, y as u8, 0, 255]).unwrap();
        // Second pixel of the first row.
        assert_eq!(&buffer.as_bytes()[4..8], &[1, 0, 0, 255]);
        // First pixel of the second row.
        assert_eq!(&buffer.as_bytes()[12..16], &[0, 1, 0, 255]);
    }

    #[test]
    fn get_and_set_pixel() {
        let mut buffer = PixelBuffer::filled(4, 4, [0, 0, 0, 255]).unwrap();
        buffer.set_pixel(2, 3, [9, 8, 7, 6]);
        assert_eq!(buffer.get_pixel(2, 3), Some([9, 8, 7, 6]));
        assert_eq!(buffer.get_pixel(4, 0), None);
        assert_eq!(buffer.get_pixel(0, 4), None);
    }

    #[test]
    fn set_pixel_out_of_bounds_is_ignored() {
        let mut buffer = PixelBuffer::filled(2, 2, [5; 4]).unwrap();
        let before = buffer.clone();
        buffer.set_pixel(2, 0, [0; 4]);
        assert_eq!(buffer, before);
    }

    #[test]
    fn rgba_image_round_trip() {
        let img = RgbaImage::from_fn(5, 3, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            image::Rgba([x as u8, y as u8, 100, 200])
        });
        let buffer = PixelBuffer::try_from(img.clone()).unwrap();
        assert_eq!(buffer.dimensions(), Dimensions::new(5, 3));
        assert_eq!(buffer.into_rgba_image().unwrap(), img);
    }

    #[test]
    fn empty_rgba_image_is_rejected() {
        let img = RgbaImage::new(0, 0);
        assert!(matches!(
            PixelBuffer::try_from(img),
            Err(EngineError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn luma_weights_sum_to_white() {
        assert_eq!(luma_milli(255, 255, 255), 255_000);
        assert_eq!(luma_u8(255, 255, 255), 255);
        assert_eq!(luma_u8(0, 0, 0), 0);
    }

    #[test]
    fn luma_of_gray_is_exact() {
        for v in 0..=255u8 {
            assert_eq!(luma_milli(v, v, v), u32::from(v) * 1000);
            assert_eq!(luma_u8(v, v, v), v);
            assert_eq!(luma_channel(v, v, v), v);
        }
    }

    #[test]
    fn luma_u8_rounds_half_up() {
        // 0.299 * 5 = 1.495 -> 1
        assert_eq!(luma_u8(5, 0, 0), 1);
        // 0.114 * 22 = 2.508 -> 3
        assert_eq!(luma_u8(0, 0, 22), 3);
        // 0.299 + 0.587 * 123 = 72.5 -> 73
        assert_eq!(luma_u8(1, 123, 0), 73);
    }

    #[test]
    fn luma_channel_rounds_half_to_even() {
        // 72.5 -> 72
        assert_eq!(luma_channel(1, 123, 0), 72);
        assert_eq!(luma_channel(5, 0, 0), 1);
        assert_eq!(luma_channel(0, 0, 22), 3);
    }

    #[test]
    fn luma_orders_primaries() {
        let r = luma_milli(255, 0, 0);
        let g = luma_milli(0, 255, 0);
        let b = luma_milli(0, 0, 255);
        assert!(g > r && r > b, "expected green > red > blue, got {r} {g} {b}");
    }

    #[test]
    fn div_round_ties_even_cases() {
        assert_eq!(div_round_ties_even(255, 9), 28);
        assert_eq!(div_round_ties_even(255, 4), 64);
        // 42.5 -> 42, 43.5 -> 44
        assert_eq!(div_round_ties_even(255, 6), 42);
        assert_eq!(div_round_ties_even(87, 2), 44);
        assert_eq!(div_round_ties_even(0, 7), 0);
    }

    #[test]
    fn clamp_channel_saturates_and_rounds() {
        assert_eq!(clamp_channel(-12.0), 0);
        assert_eq!(clamp_channel(300.0), 255);
        assert_eq!(clamp_channel(27.4), 27);
        assert_eq!(clamp_channel(27.6), 28);
        assert_eq!(clamp_channel(f64::NAN), 0);
    }

    #[test]
    fn clamp_channel_rounds_half_to_even() {
        assert_eq!(clamp_channel(26.5), 26);
        assert_eq!(clamp_channel(27.5), 28);
        assert_eq!(clamp_channel(138.5), 138);
        assert_eq!(clamp_channel(254.5), 254);
        assert_eq!(clamp_channel(-0.5), 0);
    }

    #[test]
    fn rewrite_rows_reads_from_snapshot() {
        // Each row copies the row above it. Reading from the snapshot
        // means row 2 gets the original row 1, not the rewritten one.
        #[allow(clippy::cast_possible_truncation)]
        let mut buffer = PixelBuffer::from_fn(1, 3, |_, y| [y as u8 * 10, 0, 0, 255]).unwrap();
        rewrite_rows(&mut buffer, |y, snapshot, row| {
            if y > 0 {
                let above = (y - 1) * CHANNELS;
                row.copy_from_slice(&snapshot[above..above + CHANNELS]);
            }
        });
        assert_eq!(buffer.get_pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(buffer.get_pixel(0, 1), Some([0, 0, 0, 255]));
        assert_eq!(buffer.get_pixel(0, 2), Some([10, 0, 0, 255]));
    }
}
