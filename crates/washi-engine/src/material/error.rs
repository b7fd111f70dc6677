use std::fmt;

/// Configuration error raised by a material factory.
///
/// Factories validate eagerly so a bad option fails at construction instead of
/// rendering garbage tiles.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialError {
    /// A size-like option that must be strictly positive was not.
    NonPositive { field: &'static str, value: f32 },
    /// An option that must be zero or greater was negative.
    Negative { field: &'static str, value: f32 },
    /// An option was NaN or infinite.
    NonFinite { field: &'static str },
    /// More clipping planes than the uniform block holds.
    TooManyClipPlanes { count: usize, max: usize },
    /// A distance-field factory was given the wrong number of layers.
    LayerCount { expected: usize, found: usize },
}

impl fmt::Display for MaterialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositive { field, value } => {
                write!(f, "material option `{field}` must be > 0 (got {value})")
            }
            Self::Negative { field, value } => {
                write!(f, "material option `{field}` must be >= 0 (got {value})")
            }
            Self::NonFinite { field } => write!(f, "material option `{field}` is not finite"),
            Self::TooManyClipPlanes { count, max } => {
                write!(f, "{count} clipping planes given, at most {max} supported")
            }
            Self::LayerCount { expected, found } => {
                write!(f, "expected {expected} distance-field layer(s), got {found}")
            }
        }
    }
}

impl std::error::Error for MaterialError {}

pub(crate) fn positive(field: &'static str, value: f32) -> Result<f32, MaterialError> {
    if !value.is_finite() {
        return Err(MaterialError::NonFinite { field });
    }
    if value <= 0.0 {
        return Err(MaterialError::NonPositive { field, value });
    }
    Ok(value)
}

pub(crate) fn non_negative(field: &'static str, value: f32) -> Result<f32, MaterialError> {
    if !value.is_finite() {
        return Err(MaterialError::NonFinite { field });
    }
    if value < 0.0 {
        return Err(MaterialError::Negative { field, value });
    }
    Ok(value)
}
