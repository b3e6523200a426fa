//! Typed operations and their parameters.
//!
//! [`Operation`] has one variant per engine operation, each carrying its
//! own strongly typed parameters. It serializes as an internally tagged
//! object keyed by the operation name, with omitted parameters taking
//! their documented defaults:
//!
//! ```text
//! {"operation": "blur", "radius": 3}
//! {"operation": "contrast"}            // factor = 1.5
//! {"operation": "flip-horizontal"}
//! ```
//!
//! Dispatchers that only have a name and a bag of numbers use
//! [`Operation::from_parts`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::blur::apply_blur;
use crate::buffer::PixelBuffer;
use crate::edge::detect_edges;
use crate::geometry::{Sampling, flip_horizontal, flip_vertical, rotate};
use crate::pointwise::{adjust_contrast, apply_threshold, convert_to_grayscale, invert_colors};
use crate::sharpen::apply_sharpen;
use crate::types::EngineError;

/// Names the ten engine operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    /// Linear brightness offset.
    Contrast,
    /// Luma binarization.
    Threshold,
    /// Box blur.
    Blur,
    /// 3x3 sharpen convolution.
    Sharpen,
    /// Color inversion.
    Invert,
    /// Clockwise rotation.
    Rotate,
    /// Left-right mirror.
    FlipHorizontal,
    /// Top-bottom mirror.
    FlipVertical,
    /// Sobel gradient magnitude.
    EdgeDetection,
    /// Luma grayscale.
    Grayscale,
}

impl OperationKind {
    /// Every operation, in menu order.
    pub const ALL: [Self; 10] = [
        Self::Contrast,
        Self::Threshold,
        Self::Blur,
        Self::Sharpen,
        Self::Invert,
        Self::Rotate,
        Self::FlipHorizontal,
        Self::FlipVertical,
        Self::EdgeDetection,
        Self::Grayscale,
    ];

    /// The canonical dispatcher name, e.g. `"edge-detection"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Contrast => "contrast",
            Self::Threshold => "threshold",
            Self::Blur => "blur",
            Self::Sharpen => "sharpen",
            Self::Invert => "invert",
            Self::Rotate => "rotate",
            Self::FlipHorizontal => "flip-horizontal",
            Self::FlipVertical => "flip-vertical",
            Self::EdgeDetection => "edge-detection",
            Self::Grayscale => "grayscale",
        }
    }

    /// Names of the numeric parameters this operation accepts.
    #[must_use]
    pub const fn parameter_names(self) -> &'static [&'static str] {
        match self {
            Self::Contrast => &["factor"],
            Self::Threshold => &["threshold"],
            Self::Blur => &["radius"],
            Self::Rotate => &["angle"],
            Self::Sharpen
            | Self::Invert
            | Self::FlipHorizontal
            | Self::FlipVertical
            | Self::EdgeDetection
            | Self::Grayscale => &[],
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OperationKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| EngineError::UnknownOperation(s.to_owned()))
    }
}

/// Parameters for [`Operation::Contrast`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContrastParams {
    /// Offset multiplier; R, G, B shift by `(factor - 1) * 255`.
    pub factor: f64,
}

impl ContrastParams {
    /// Default `factor`.
    pub const DEFAULT_FACTOR: f64 = 1.5;
}

impl Default for ContrastParams {
    fn default() -> Self {
        Self {
            factor: Self::DEFAULT_FACTOR,
        }
    }
}

/// Parameters for [`Operation::Threshold`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdParams {
    /// Luma cutoff; pixels at or above it become white.
    pub threshold: f64,
}

impl ThresholdParams {
    /// Default `threshold`.
    pub const DEFAULT_THRESHOLD: f64 = 128.0;
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}

/// Parameters for [`Operation::Blur`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlurParams {
    /// Half-width of the box window; must be at least 1.
    pub radius: u32,
}

impl BlurParams {
    /// Default `radius`.
    pub const DEFAULT_RADIUS: u32 = 2;
}

impl Default for BlurParams {
    fn default() -> Self {
        Self {
            radius: Self::DEFAULT_RADIUS,
        }
    }
}

/// Parameters for [`Operation::Rotate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RotateParams {
    /// Clockwise angle in degrees.
    pub angle: f64,
    /// Sampling strategy for angles that are not multiples of 90°.
    pub sampling: Sampling,
}

impl RotateParams {
    /// Default `angle`.
    pub const DEFAULT_ANGLE: f64 = 90.0;
}

impl Default for RotateParams {
    fn default() -> Self {
        Self {
            angle: Self::DEFAULT_ANGLE,
            sampling: Sampling::default(),
        }
    }
}

/// One engine operation together with its parameters.
///
/// Deserialization rejects keys the operation does not accept and
/// values that fail [`Operation::validate`], the same as
/// [`Operation::from_parts`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OperationRepr", into = "OperationRepr")]
pub enum Operation {
    /// See [`adjust_contrast`].
    Contrast(ContrastParams),
    /// See [`apply_threshold`].
    Threshold(ThresholdParams),
    /// See [`apply_blur`].
    Blur(BlurParams),
    /// See [`apply_sharpen`].
    Sharpen,
    /// See [`invert_colors`].
    Invert,
    /// See [`rotate`].
    Rotate(RotateParams),
    /// See [`flip_horizontal`].
    FlipHorizontal,
    /// See [`flip_vertical`].
    FlipVertical,
    /// See [`detect_edges`].
    EdgeDetection,
    /// See [`convert_to_grayscale`].
    Grayscale,
}

/// Wire form of [`Operation`]. Parameterless operations carry an empty
/// struct so that stray keys are rejected for them too.
#[derive(Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "kebab-case")]
enum OperationRepr {
    Contrast(ContrastParams),
    Threshold(ThresholdParams),
    Blur(BlurParams),
    Sharpen(NoParams),
    Invert(NoParams),
    Rotate(RotateParams),
    FlipHorizontal(NoParams),
    FlipVertical(NoParams),
    EdgeDetection(NoParams),
    Grayscale(NoParams),
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoParams {}

impl TryFrom<OperationRepr> for Operation {
    type Error = EngineError;

    fn try_from(repr: OperationRepr) -> Result<Self, Self::Error> {
        let op = match repr {
            OperationRepr::Contrast(p) => Self::Contrast(p),
            OperationRepr::Threshold(p) => Self::Threshold(p),
            OperationRepr::Blur(p) => Self::Blur(p),
            OperationRepr::Sharpen(NoParams {}) => Self::Sharpen,
            OperationRepr::Invert(NoParams {}) => Self::Invert,
            OperationRepr::Rotate(p) => Self::Rotate(p),
            OperationRepr::FlipHorizontal(NoParams {}) => Self::FlipHorizontal,
            OperationRepr::FlipVertical(NoParams {}) => Self::FlipVertical,
            OperationRepr::EdgeDetection(NoParams {}) => Self::EdgeDetection,
            OperationRepr::Grayscale(NoParams {}) => Self::Grayscale,
        };
        op.validate()?;
        Ok(op)
    }
}

impl From<Operation> for OperationRepr {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Contrast(p) => Self::Contrast(p),
            Operation::Threshold(p) => Self::Threshold(p),
            Operation::Blur(p) => Self::Blur(p),
            Operation::Sharpen => Self::Sharpen(NoParams {}),
            Operation::Invert => Self::Invert(NoParams {}),
            Operation::Rotate(p) => Self::Rotate(p),
            Operation::FlipHorizontal => Self::FlipHorizontal(NoParams {}),
            Operation::FlipVertical => Self::FlipVertical(NoParams {}),
            Operation::EdgeDetection => Self::EdgeDetection(NoParams {}),
            Operation::Grayscale => Self::Grayscale(NoParams {}),
        }
    }
}

impl Operation {
    /// The operation with all parameters at their defaults.
    #[must_use]
    pub fn with_defaults(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Contrast => Self::Contrast(ContrastParams::default()),
            OperationKind::Threshold => Self::Threshold(ThresholdParams::default()),
            OperationKind::Blur => Self::Blur(BlurParams::default()),
            OperationKind::Sharpen => Self::Sharpen,
            OperationKind::Invert => Self::Invert,
            OperationKind::Rotate => Self::Rotate(RotateParams::default()),
            OperationKind::FlipHorizontal => Self::FlipHorizontal,
            OperationKind::FlipVertical => Self::FlipVertical,
            OperationKind::EdgeDetection => Self::EdgeDetection,
            OperationKind::Grayscale => Self::Grayscale,
        }
    }

    /// Build a typed operation from a name and an untyped parameter map.
    ///
    /// Missing parameters take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownOperation`] for an unrecognized
    /// name, and [`EngineError::UnsupportedParameter`] for a key the
    /// operation does not accept or a value that fails
    /// [`Operation::validate`].
    pub fn from_parts(name: &str, params: &BTreeMap<String, f64>) -> Result<Self, EngineError> {
        let kind: OperationKind = name.parse()?;
        if let Some(key) = params
            .keys()
            .find(|key| !kind.parameter_names().contains(&key.as_str()))
        {
            return Err(EngineError::unsupported(
                kind,
                key,
                format!(
                    "not accepted by {kind} (expected one of: {})",
                    display_names(kind.parameter_names())
                ),
            ));
        }

        let mut op = Self::with_defaults(kind);
        match &mut op {
            Self::Contrast(p) => {
                if let Some(&factor) = params.get("factor") {
                    p.factor = factor;
                }
            }
            Self::Threshold(p) => {
                if let Some(&threshold) = params.get("threshold") {
                    p.threshold = threshold;
                }
            }
            Self::Blur(p) => {
                if let Some(&radius) = params.get("radius") {
                    p.radius = radius_from_f64(radius)?;
                }
            }
            Self::Rotate(p) => {
                if let Some(&angle) = params.get("angle") {
                    p.angle = angle;
                }
            }
            Self::Sharpen
            | Self::Invert
            | Self::FlipHorizontal
            | Self::FlipVertical
            | Self::EdgeDetection
            | Self::Grayscale => {}
        }
        op.validate()?;
        Ok(op)
    }

    /// Which operation this is.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Contrast(_) => OperationKind::Contrast,
            Self::Threshold(_) => OperationKind::Threshold,
            Self::Blur(_) => OperationKind::Blur,
            Self::Sharpen => OperationKind::Sharpen,
            Self::Invert => OperationKind::Invert,
            Self::Rotate(_) => OperationKind::Rotate,
            Self::FlipHorizontal => OperationKind::FlipHorizontal,
            Self::FlipVertical => OperationKind::FlipVertical,
            Self::EdgeDetection => OperationKind::EdgeDetection,
            Self::Grayscale => OperationKind::Grayscale,
        }
    }

    /// Whether this operation can change the buffer's dimensions.
    #[must_use]
    pub const fn is_geometric(&self) -> bool {
        matches!(
            self,
            Self::Rotate(_) | Self::FlipHorizontal | Self::FlipVertical
        )
    }

    /// Check every parameter against its accepted range.
    ///
    /// Floats must be finite and the blur radius at least 1. Values are
    /// never clamped.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnsupportedParameter`] naming the first
    /// offending parameter.
    pub fn validate(&self) -> Result<(), EngineError> {
        let kind = self.kind();
        match *self {
            Self::Contrast(ContrastParams { factor }) => require_finite(kind, "factor", factor),
            Self::Threshold(ThresholdParams { threshold }) => {
                require_finite(kind, "threshold", threshold)
            }
            Self::Blur(BlurParams { radius }) => {
                if radius == 0 {
                    Err(EngineError::unsupported(kind, "radius", "must be at least 1"))
                } else {
                    Ok(())
                }
            }
            Self::Rotate(RotateParams { angle, .. }) => require_finite(kind, "angle", angle),
            Self::Sharpen
            | Self::Invert
            | Self::FlipHorizontal
            | Self::FlipVertical
            | Self::EdgeDetection
            | Self::Grayscale => Ok(()),
        }
    }

    /// Validate, then run the operation on `buffer` in place.
    ///
    /// # Errors
    ///
    /// Returns the error from [`Operation::validate`] or from the
    /// operation itself. The buffer is not modified on error.
    pub fn apply(&self, buffer: &mut PixelBuffer) -> Result<(), EngineError> {
        self.validate()?;
        match *self {
            Self::Contrast(p) => adjust_contrast(buffer, p.factor),
            Self::Threshold(p) => apply_threshold(buffer, p.threshold),
            Self::Blur(p) => apply_blur(buffer, p.radius),
            Self::Sharpen => apply_sharpen(buffer),
            Self::Invert => invert_colors(buffer),
            Self::Rotate(p) => rotate(buffer, p.angle, p.sampling)?,
            Self::FlipHorizontal => flip_horizontal(buffer),
            Self::FlipVertical => flip_vertical(buffer),
            Self::EdgeDetection => detect_edges(buffer),
            Self::Grayscale => convert_to_grayscale(buffer),
        }
        Ok(())
    }

    /// The numeric parameters as a name/value map, the inverse of
    /// [`Operation::from_parts`].
    #[must_use]
    pub fn parameters(&self) -> BTreeMap<String, f64> {
        let pair = |name: &str, value: f64| BTreeMap::from([(name.to_owned(), value)]);
        match *self {
            Self::Contrast(p) => pair("factor", p.factor),
            Self::Threshold(p) => pair("threshold", p.threshold),
            Self::Blur(p) => pair("radius", f64::from(p.radius)),
            Self::Rotate(p) => pair("angle", p.angle),
            Self::Sharpen
            | Self::Invert
            | Self::FlipHorizontal
            | Self::FlipVertical
            | Self::EdgeDetection
            | Self::Grayscale => BTreeMap::new(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())?;
        let params = self.parameters();
        if !params.is_empty() {
            let joined: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
            write!(f, "({})", joined.join(", "))?;
        }
        Ok(())
    }
}

fn require_finite(kind: OperationKind, name: &str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::unsupported(
            kind,
            name,
            format!("must be finite, got {value}"),
        ))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn radius_from_f64(value: f64) -> Result<u32, EngineError> {
    let reject = |reason: String| EngineError::unsupported(OperationKind::Blur, "radius", reason);
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(reject(format!("must be a whole number, got {value}")));
    }
    if value < 1.0 {
        return Err(reject(format!("must be at least 1, got {value}")));
    }
    if value > f64::from(u32::MAX) {
        return Err(reject(format!("must be at most {}, got {value}", u32::MAX)));
    }
    Ok(value as u32)
}

fn display_names(names: &[&str]) -> String {
    if names.is_empty() {
        "none".to_owned()
    } else {
        names.join(", ")
    }
}
