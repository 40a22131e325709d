//! # Display Transforms
//!
//! Pure mappings between raw event values and display coordinates. Each
//! variant of [`Transform`] carries its own parameters and evaluation logic;
//! parameters are validated once at construction and never change afterwards.
//!
//! | Variant | Display value |
//! |---------|---------------|
//! | [`Transform::Bounded`] | raw value clipped to `[min, max]` |
//! | [`Transform::Logarithmic`] | `log10` of the raw value clipped to `[min, max]` (`min > 0`) |
//! | [`Transform::Logicle`] | biexponential scale position in `[0, 1]` |

mod error;
mod logicle;

pub use error::TransformError;
pub use logicle::{Logicle, LogicleParams};

/// Type tag of a transform, used by the persisted frame format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    /// Linear, clipped to a raw range
    Bounded,
    /// Base-10 logarithm over a positive raw range
    Logarithmic,
    /// Parks-Roederer-Moore biexponential
    Logicle,
}

impl TransformKind {
    /// Wire tag
    pub fn tag(self) -> u8 {
        match self {
            TransformKind::Bounded => 1,
            TransformKind::Logarithmic => 2,
            TransformKind::Logicle => 3,
        }
    }

    /// Parse a wire tag
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(TransformKind::Bounded),
            2 => Some(TransformKind::Logarithmic),
            3 => Some(TransformKind::Logicle),
            _ => None,
        }
    }
}

/// A raw-to-display value mapping
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Identity mapping clipped to `[min, max]`
    Bounded {
        /// Lower raw bound
        min: f64,
        /// Upper raw bound
        max: f64,
    },
    /// `log10` mapping over a strictly positive raw range
    Logarithmic {
        /// Lower raw bound, strictly positive
        min: f64,
        /// Upper raw bound
        max: f64,
    },
    /// Biexponential scale
    Logicle(Logicle),
}

impl Transform {
    /// Linear transform clipped to `[min, max]`
    pub fn bounded(min: f64, max: f64) -> Result<Self, TransformError> {
        if !(min.is_finite() && max.is_finite()) || min >= max {
            return Err(TransformError::InvalidParameter(format!(
                "bounded range must satisfy min < max, got [{min}, {max}]"
            )));
        }
        Ok(Transform::Bounded { min, max })
    }

    /// Logarithmic transform over `[min, max]`
    pub fn logarithmic(min: f64, max: f64) -> Result<Self, TransformError> {
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 || min >= max {
            return Err(TransformError::InvalidParameter(format!(
                "logarithmic range must satisfy 0 < min < max, got [{min}, {max}]"
            )));
        }
        Ok(Transform::Logarithmic { min, max })
    }

    /// Logicle transform with explicit parameters
    pub fn logicle(t: f64, w: f64, m: f64, a: f64) -> Result<Self, TransformError> {
        Logicle::new(LogicleParams { t, w, m, a }).map(Transform::Logicle)
    }

    /// Type tag of this transform
    pub fn kind(&self) -> TransformKind {
        match self {
            Transform::Bounded { .. } => TransformKind::Bounded,
            Transform::Logarithmic { .. } => TransformKind::Logarithmic,
            Transform::Logicle(_) => TransformKind::Logicle,
        }
    }

    /// Map a raw value into display space
    pub fn to_display(&self, raw: f64) -> f64 {
        match self {
            Transform::Bounded { min, max } => raw.clamp(*min, *max),
            Transform::Logarithmic { min, max } => raw.clamp(*min, *max).log10(),
            Transform::Logicle(logicle) => logicle.scale(raw),
        }
    }

    /// Map a display value back into raw space
    pub fn to_raw(&self, display: f64) -> f64 {
        match self {
            Transform::Bounded { min, max } => display.clamp(*min, *max),
            Transform::Logarithmic { min, max } => 10f64.powf(display).clamp(*min, *max),
            Transform::Logicle(logicle) => logicle.inverse(display),
        }
    }

    /// Map a whole column into display space
    pub fn to_display_all(&self, raw: &[f64]) -> Vec<f64> {
        raw.iter().map(|&v| self.to_display(v)).collect()
    }

    /// Numeric parameters in wire order: `[min, max]` or `[T, W, M, A]`
    pub fn parameters(&self) -> Vec<f64> {
        match self {
            Transform::Bounded { min, max } | Transform::Logarithmic { min, max } => {
                vec![*min, *max]
            }
            Transform::Logicle(logicle) => {
                let p = logicle.params();
                vec![p.t, p.w, p.m, p.a]
            }
        }
    }

    /// Rebuild a transform from its tag and numeric parameters
    pub fn from_parameters(kind: TransformKind, params: &[f64]) -> Result<Self, TransformError> {
        match (kind, params) {
            (TransformKind::Bounded, [min, max]) => Self::bounded(*min, *max),
            (TransformKind::Logarithmic, [min, max]) => Self::logarithmic(*min, *max),
            (TransformKind::Logicle, [t, w, m, a]) => Self::logicle(*t, *w, *m, *a),
            (kind, params) => Err(TransformError::InvalidParameter(format!(
                "{kind:?} transform does not take {} parameters",
                params.len()
            ))),
        }
    }
}
