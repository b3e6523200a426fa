//! 3x3 convolution kernels and interior-only neighborhood passes.
//!
//! Convolution filters in this crate leave the outermost one-pixel ring
//! of the image untouched: a pixel is only rewritten when its whole 3x3
//! neighborhood lies inside the buffer. There is no padding, reflection,
//! or wrapping.

use crate::buffer::{PixelBuffer, rewrite_rows};
use crate::types::CHANNELS;

/// An immutable 3x3 matrix of integer weights, indexed `[row][col]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel {
    weights: [[i32; 3]; 3],
}

impl Kernel {
    /// Build a kernel from rows of weights.
    #[must_use]
    pub const fn new(weights: [[i32; 3]; 3]) -> Self {
        Self { weights }
    }

    /// Weight at `row`, `col` (both `0..3`).
    #[must_use]
    pub const fn weight(&self, row: usize, col: usize) -> i32 {
        self.weights[row][col]
    }

    /// Sum of all weights.
    #[must_use]
    pub fn sum(&self) -> i32 {
        self.weights.iter().flatten().sum()
    }

    /// Weighted sum of `value(row, col)` over the 3x3 window.
    pub(crate) fn apply<T>(&self, mut value: impl FnMut(usize, usize) -> T) -> T
    where
        T: Default + std::ops::AddAssign + std::ops::Mul<Output = T> + From<i32>,
    {
        let mut acc = T::default();
        for (row, weights) in self.weights.iter().enumerate() {
            for (col, &w) in weights.iter().enumerate() {
                if w != 0 {
                    acc += value(row, col) * T::from(w);
                }
            }
        }
        acc
    }
}

/// Sharpen kernel: center weight 5, four direct neighbors -1.
pub const SHARPEN: Kernel = Kernel::new([[0, -1, 0], [-1, 5, -1], [0, -1, 0]]);

/// Sobel kernel for the horizontal gradient.
pub const SOBEL_X: Kernel = Kernel::new([[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]]);

/// Sobel kernel for the vertical gradient.
pub const SOBEL_Y: Kernel = Kernel::new([[-1, -2, -1], [0, 0, 0], [1, 2, 1]]);

/// Read access to the 3x3 neighborhood around an interior pixel of the
/// pre-pass snapshot.
pub(crate) struct Neighborhood<'a> {
    snapshot: &'a [u8],
    stride: usize,
    x: usize,
    y: usize,
}

impl Neighborhood<'_> {
    /// The RGBA sample at `row`, `col` of the window (`(1, 1)` is the
    /// center pixel).
    pub(crate) fn at(&self, row: usize, col: usize) -> &[u8] {
        let i = (self.y + row - 1) * self.stride + (self.x + col - 1) * CHANNELS;
        &self.snapshot[i..i + CHANNELS]
    }
}

/// Rewrite the R, G, B channels of every interior pixel with
/// `f(neighborhood)`. Border pixels and all alpha values are left as-is.
///
/// Buffers narrower or shorter than 3 pixels have no interior and are
/// returned unchanged.
pub(crate) fn map_interior<F>(buffer: &mut PixelBuffer, f: F)
where
    F: Fn(&Neighborhood<'_>) -> [u8; 3] + Send + Sync,
{
    let (width, height) = (buffer.width() as usize, buffer.height() as usize);
    if width < 3 || height < 3 {
        return;
    }
    let stride = width * CHANNELS;

    rewrite_rows(buffer, |y, snapshot, row| {
        if y == 0 || y == height - 1 {
            return;
        }
        for x in 1..width - 1 {
            let hood = Neighborhood {
                snapshot,
                stride,
                x,
                y,
            };
            let rgb = f(&hood);
            row[x * CHANNELS..x * CHANNELS + 3].copy_from_slice(&rgb);
        }
    });
}
