//! Geometric transforms: rotation and mirroring.
//!
//! Rotation is clockwise on screen (y grows downward). Multiples of 90°
//! are exact index remaps; any other angle is resampled into a new
//! buffer sized to the rotated bounding box, with uncovered corners left
//! transparent black.
//!
//! # Strategy pattern
//!
//! Arbitrary-angle rotation samples the source at fractional positions.
//! [`Sampling`] selects the strategy at runtime and implements
//! [`Sampler`], the same way other pluggable steps in this crate pair a
//! trait with a selector enum.

use serde::{Deserialize, Serialize};

use crate::buffer::{PixelBuffer, clamp_channel};
use crate::operation::OperationKind;
use crate::types::{CHANNELS, EngineError};

/// Value written where the rotated image does not cover the output.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Slack subtracted before rounding bounding-box sizes up, so that
/// `cos(90°) ≈ 6e-17` does not add a spurious row or column.
const BOUNDS_EPSILON: f64 = 1e-6;

/// Selects how arbitrary-angle rotation reads between source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sampling {
    /// Take the source pixel containing the sample point.
    #[default]
    Nearest,
    /// Blend the four source pixels around the sample point.
    Bilinear,
}

/// Reads a color at a continuous position of a source buffer.
///
/// `x` and `y` are in pixel-edge coordinates: pixel `(i, j)` covers
/// `[i, i + 1) x [j, j + 1)`. Positions outside the buffer yield
/// [`TRANSPARENT`].
pub trait Sampler {
    /// Sample `source` at `(x, y)`.
    fn sample(&self, source: &PixelBuffer, x: f64, y: f64) -> [u8; 4];
}

impl Sampler for Sampling {
    fn sample(&self, source: &PixelBuffer, x: f64, y: f64) -> [u8; 4] {
        match *self {
            Self::Nearest => sample_nearest(source, x, y),
            Self::Bilinear => sample_bilinear(source, x, y),
        }
    }
}

/// Whether `(x, y)` lies inside the source rectangle; returns the
/// integer cell when it does.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn cell(source: &PixelBuffer, x: f64, y: f64) -> Option<(u32, u32)> {
    let (w, h) = (f64::from(source.width()), f64::from(source.height()));
    if !(0.0..w).contains(&x) || !(0.0..h).contains(&y) {
        return None;
    }
    Some((x.floor() as u32, y.floor() as u32))
}

fn sample_nearest(source: &PixelBuffer, x: f64, y: f64) -> [u8; 4] {
    cell(source, x, y)
        .and_then(|(ix, iy)| source.get_pixel(ix, iy))
        .unwrap_or(TRANSPARENT)
}

/// Bilinear interpolation between pixel centers. Taps beyond the edge
/// reuse the edge pixel, so a uniform image stays uniform right up to
/// its boundary.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sample_bilinear(source: &PixelBuffer, x: f64, y: f64) -> [u8; 4] {
    if cell(source, x, y).is_none() {
        return TRANSPARENT;
    }
    let max_x = f64::from(source.width() - 1);
    let max_y = f64::from(source.height() - 1);
    let fx = (x - 0.5).clamp(0.0, max_x);
    let fy = (y - 0.5).clamp(0.0, max_y);
    let (x0, y0) = (fx.floor(), fy.floor());
    let (tx, ty) = (fx - x0, fy - y0);
    let (x0, y0) = (x0 as u32, y0 as u32);
    let x1 = (x0 + 1).min(source.width() - 1);
    let y1 = (y0 + 1).min(source.height() - 1);

    let tap = |ix, iy| source.get_pixel(ix, iy).unwrap_or(TRANSPARENT);
    let (p00, p10, p01, p11) = (tap(x0, y0), tap(x1, y0), tap(x0, y1), tap(x1, y1));
    std::array::from_fn(|c| {
        let top = f64::from(p00[c]).mul_add(1.0 - tx, f64::from(p10[c]) * tx);
        let bottom = f64::from(p01[c]).mul_add(1.0 - tx, f64::from(p11[c]) * tx);
        clamp_channel(top.mul_add(1.0 - ty, bottom * ty))
    })
}

/// Rotate `buffer` clockwise by `angle_degrees`.
///
/// Angles are taken modulo 360. For 90° and 270° the width and height
/// swap; 0° and 180° keep them. These four cases are exact pixel
/// permutations regardless of `sampling`. Any other angle produces a
/// buffer sized to the rotated bounding box.
///
/// # Errors
///
/// Returns [`EngineError::UnsupportedParameter`] if the angle is not
/// finite, or [`EngineError::InvalidDimensions`] if the rotated bounding
/// box cannot be represented. The buffer is unchanged on error.
#[allow(clippy::float_cmp)]
pub fn rotate(
    buffer: &mut PixelBuffer,
    angle_degrees: f64,
    sampling: Sampling,
) -> Result<(), EngineError> {
    if !angle_degrees.is_finite() {
        return Err(EngineError::unsupported(
            OperationKind::Rotate,
            "angle",
            format!("must be finite, got {angle_degrees}"),
        ));
    }
    let turn = angle_degrees.rem_euclid(360.0);
    let rotated = if turn == 0.0 {
        return Ok(());
    } else if turn == 90.0 {
        rotate_quarter(buffer, Quarter::Clockwise)?
    } else if turn == 180.0 {
        rotate_quarter(buffer, Quarter::Half)?
    } else if turn == 270.0 {
        rotate_quarter(buffer, Quarter::CounterClockwise)?
    } else {
        rotate_resampled(buffer, turn.to_radians(), sampling)?
    };
    *buffer = rotated;
    Ok(())
}

#[derive(Clone, Copy)]
enum Quarter {
    Clockwise,
    Half,
    CounterClockwise,
}

fn rotate_quarter(source: &PixelBuffer, quarter: Quarter) -> Result<PixelBuffer, EngineError> {
    let (w, h) = (source.width(), source.height());
    let (out_w, out_h) = match quarter {
        Quarter::Half => (w, h),
        Quarter::Clockwise | Quarter::CounterClockwise => (h, w),
    };
    PixelBuffer::from_fn(out_w, out_h, |x, y| {
        let (sx, sy) = match quarter {
            Quarter::Clockwise => (y, h - 1 - x),
            Quarter::Half => (w - 1 - x, h - 1 - y),
            Quarter::CounterClockwise => (w - 1 - y, x),
        };
        source.get_pixel(sx, sy).unwrap_or(TRANSPARENT)
    })
}

fn rotate_resampled(
    source: &PixelBuffer,
    radians: f64,
    sampler: impl Sampler,
) -> Result<PixelBuffer, EngineError> {
    let (sin, cos) = radians.sin_cos();
    let (w, h) = (f64::from(source.width()), f64::from(source.height()));
    let out_w = bounding_extent(w.mul_add(cos.abs(), h * sin.abs()), source)?;
    let out_h = bounding_extent(w.mul_add(sin.abs(), h * cos.abs()), source)?;
    let (half_out_w, half_out_h) = (f64::from(out_w) / 2.0, f64::from(out_h) / 2.0);

    // Inverse-map each output pixel center back into the source.
    PixelBuffer::from_fn(out_w, out_h, |x, y| {
        let px = f64::from(x) + 0.5 - half_out_w;
        let py = f64::from(y) + 0.5 - half_out_h;
        let sx = px.mul_add(cos, py * sin) + w / 2.0;
        let sy = py.mul_add(cos, -px * sin) + h / 2.0;
        sampler.sample(source, sx, sy)
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bounding_extent(extent: f64, source: &PixelBuffer) -> Result<u32, EngineError> {
    let rounded = (extent - BOUNDS_EPSILON).ceil().max(1.0);
    if rounded > f64::from(u32::MAX) {
        return Err(EngineError::InvalidDimensions {
            width: source.width(),
            height: source.height(),
            len: source.byte_len(),
        });
    }
    Ok(rounded as u32)
}

/// Mirror the buffer left to right.
pub fn flip_horizontal(buffer: &mut PixelBuffer) {
    let width = buffer.width() as usize;
    let stride = width * CHANNELS;
    for row in buffer.data_mut().chunks_exact_mut(stride) {
        for x in 0..width / 2 {
            let (left, right) = (x * CHANNELS, (width - 1 - x) * CHANNELS);
            for c in 0..CHANNELS {
                row.swap(left + c, right + c);
            }
        }
    }
}

/// Mirror the buffer top to bottom.
pub fn flip_vertical(buffer: &mut PixelBuffer) {
    let height = buffer.height() as usize;
    let stride = buffer.width() as usize * CHANNELS;
    let data = buffer.data_mut();
    for y in 0..height / 2 {
        let (top, bottom) = data.split_at_mut((height - 1 - y) * stride);
        top[y * stride..(y + 1) * stride].swap_with_slice(&mut bottom[..stride]);
    }
}
