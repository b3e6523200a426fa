//! pixlab-engine: Pure RGBA pixel-buffer transformations (sans-IO).
//!
//! Every operation takes a [`PixelBuffer`] (row-major, four bytes per
//! pixel, alpha last) and rewrites it in place:
//!
//! - pointwise: contrast, threshold, invert, grayscale
//! - convolution: box blur, sharpen, Sobel edge detection
//! - geometric: rotation by any angle, horizontal and vertical flips
//!
//! plus read-only statistics (channel means, luma histogram, a sampled
//! pixel matrix).
//!
//! This crate has **no I/O**. Decoding and encoding image files lives
//! in the caller, which hands the engine an [`RgbaImage`] or raw bytes.
//! Timing goes through the [`Clock`] and [`TelemetrySink`] traits so the
//! engine never reads a platform clock itself.
//!
//! # Example
//!
//! ```
//! use pixlab_engine::{Operation, OperationKind, PixelBuffer};
//!
//! let mut buffer = PixelBuffer::filled(4, 4, [200, 100, 50, 255])?;
//! Operation::with_defaults(OperationKind::Invert).apply(&mut buffer)?;
//! assert_eq!(buffer.get_pixel(0, 0), Some([55, 155, 205, 255]));
//! # Ok::<(), pixlab_engine::EngineError>(())
//! ```

pub mod blur;
pub mod buffer;
pub mod diagnostics;
pub mod edge;
pub mod geometry;
pub mod kernel;
pub mod operation;
pub mod pointwise;
pub mod session;
pub mod sharpen;
pub mod stats;
pub mod types;

pub use blur::apply_blur;
pub use buffer::{PixelBuffer, luma_channel, luma_milli, luma_u8};
pub use diagnostics::{Clock, MemorySink, NullSink, OperationRecord, TelemetrySink};
pub use edge::detect_edges;
pub use geometry::{Sampler, Sampling, flip_horizontal, flip_vertical, rotate};
pub use operation::{
    BlurParams, ContrastParams, Operation, OperationKind, RotateParams, ThresholdParams,
};
pub use pointwise::{adjust_contrast, apply_threshold, convert_to_grayscale, invert_colors};
pub use session::Session;
pub use sharpen::apply_sharpen;
pub use stats::{
    Histogram, ImageStatistics, compute_statistics, generate_histogram, sample_matrix,
};
pub use types::{Dimensions, EngineError, RgbaImage};
