//! Derived statistics: channel means, memory footprint, luma histogram,
//! and a small pixel matrix sampled around the image center.
//!
//! Everything here is computed fresh from the buffer it is given and
//! holds no reference back to it.

use serde::{Deserialize, Serialize};

use crate::buffer::{PixelBuffer, luma_u8};
use crate::geometry::TRANSPARENT;

/// Number of histogram buckets, one per luma value.
pub const HISTOGRAM_BUCKETS: usize = 256;

/// Default side length of [`sample_matrix`].
pub const DEFAULT_MATRIX_SIZE: u32 = 5;

const BYTES_PER_MEGABYTE: f64 = 1_048_576.0;

/// Summary statistics for one buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageStatistics {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height`.
    pub total_pixels: u64,
    /// Mean red value, rounded to nearest.
    pub avg_red: u8,
    /// Mean green value, rounded to nearest.
    pub avg_green: u8,
    /// Mean blue value, rounded to nearest.
    pub avg_blue: u8,
    /// Raw RGBA size in bytes (`width * height * 4`).
    pub memory_bytes: u64,
    /// `memory_bytes` in mebibytes with two decimals, e.g. `"1.17 MB"`.
    pub memory_usage: String,
}

/// Compute channel means and memory footprint in a single pass.
#[must_use]
pub fn compute_statistics(buffer: &PixelBuffer) -> ImageStatistics {
    let mut totals = [0u64; 3];
    for pixel in buffer.pixels() {
        for (total, &c) in totals.iter_mut().zip(pixel) {
            *total += u64::from(c);
        }
    }
    let dims = buffer.dimensions();
    let total_pixels = dims.pixel_count();
    let [avg_red, avg_green, avg_blue] = totals.map(|t| rounded_mean(t, total_pixels));
    let memory_bytes = dims.byte_len();

    ImageStatistics {
        width: dims.width,
        height: dims.height,
        total_pixels,
        avg_red,
        avg_green,
        avg_blue,
        memory_bytes,
        memory_usage: format_megabytes(memory_bytes),
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn rounded_mean(total: u64, count: u64) -> u8 {
    // A mean of u8 samples always fits; the buffer is never empty.
    ((total + count / 2) / count) as u8
}

#[allow(clippy::cast_precision_loss)]
fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MEGABYTE)
}

/// Pixel counts per rounded luma value.
///
/// Always exactly [`HISTOGRAM_BUCKETS`] long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct Histogram {
    counts: Vec<u64>,
}

impl Histogram {
    /// All bucket counts, index = luma.
    #[must_use]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Count for one luma value.
    #[must_use]
    pub fn get(&self, luma: u8) -> u64 {
        self.counts[usize::from(luma)]
    }

    /// Sum of all buckets; equals the pixel count of the source buffer.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Largest bucket count, useful for scaling a plot.
    #[must_use]
    pub fn peak(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

impl TryFrom<Vec<u64>> for Histogram {
    type Error = String;

    fn try_from(counts: Vec<u64>) -> Result<Self, Self::Error> {
        if counts.len() != HISTOGRAM_BUCKETS {
            return Err(format!(
                "histogram must have {HISTOGRAM_BUCKETS} buckets, got {}",
                counts.len()
            ));
        }
        Ok(Self { counts })
    }
}

impl From<Histogram> for Vec<u64> {
    fn from(histogram: Histogram) -> Self {
        histogram.counts
    }
}

/// Count pixels per rounded luma value in a single pass.
#[must_use]
pub fn generate_histogram(buffer: &PixelBuffer) -> Histogram {
    let mut counts = vec![0u64; HISTOGRAM_BUCKETS];
    for pixel in buffer.pixels() {
        counts[usize::from(luma_u8(pixel[0], pixel[1], pixel[2]))] += 1;
    }
    Histogram { counts }
}

/// A `size` x `size` grid of RGBA samples centered on the image.
///
/// The top-left sample is at `(width/2 - size/2, height/2 - size/2)`.
/// Positions outside the buffer read as transparent black, so the grid
/// is always full even for images smaller than `size`.
#[must_use]
pub fn sample_matrix(buffer: &PixelBuffer, size: u32) -> Vec<Vec<[u8; 4]>> {
    let origin_x = i64::from(buffer.width() / 2) - i64::from(size / 2);
    let origin_y = i64::from(buffer.height() / 2) - i64::from(size / 2);
    let at = |x: i64, y: i64| {
        u32::try_from(x)
            .ok()
            .zip(u32::try_from(y).ok())
            .and_then(|(x, y)| buffer.get_pixel(x, y))
            .unwrap_or(TRANSPARENT)
    };
    (0..i64::from(size))
        .map(|dy| {
            (0..i64::from(size))
                .map(|dx| at(origin_x + dx, origin_y + dy))
                .collect()
        })
        .collect()
}
