//! Shared types for the pixlab engine.

use serde::{Deserialize, Serialize};

use crate::operation::OperationKind;

/// Re-export `RgbaImage` so the CLI and other Buffer Sources can hand
/// decoded images to the engine without depending on `image` directly.
pub use image::RgbaImage;

/// Number of channel samples per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create a new dimensions value.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count (`width * height`).
    #[must_use]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Size in bytes of an RGBA buffer with these dimensions.
    #[must_use]
    pub const fn byte_len(self) -> u64 {
        self.pixel_count() * CHANNELS as u64
    }

    /// The same dimensions with width and height exchanged.
    #[must_use]
    pub const fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Errors surfaced by the engine.
///
/// Every variant is a deterministic function of the caller's input, so
/// retrying with the same input fails the same way.
///
/// Parameter policy: out-of-range or non-finite parameters are
/// rejected with [`EngineError::UnsupportedParameter`], never clamped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum EngineError {
    /// Width or height is zero, or the byte buffer length is not
    /// `width * height * 4`.
    #[error("invalid dimensions {width}x{height} for a buffer of {len} bytes")]
    InvalidDimensions {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
        /// Actual buffer length in bytes.
        len: usize,
    },

    /// A parameter is outside the accepted range, not finite, or not
    /// recognised by the operation.
    #[error("unsupported parameter `{parameter}` for {operation}: {reason}")]
    UnsupportedParameter {
        /// The operation the parameter was passed to.
        operation: OperationKind,
        /// Parameter name.
        parameter: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The dispatcher asked for an operation name the engine does not know.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
}

impl EngineError {
    pub(crate) fn unsupported(
        operation: OperationKind,
        parameter: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnsupportedParameter {
            operation,
            parameter: parameter.to_owned(),
            reason: reason.into(),
        }
    }
}
