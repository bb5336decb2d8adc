use crate::dtype::DType;

/// All errors that can occur while building or using images and lookup tables.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Constructor arguments that cannot be combined, or are missing a partner.
    #[error("invalid combination of arguments: {0}")]
    BadArguments(String),
    /// An image-like operand does not have the receiver's shape (`(nrow, ncol)`).
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// The operation is only defined for some element kinds.
    #[error("operation `{op}` is not supported for dtype {dtype}")]
    UnsupportedDtype { op: &'static str, dtype: DType },
    /// A pixel, region, or 2D table coordinate lies outside the valid extent.
    #[error("out of bounds: {0}")]
    OutOfBounds(String),
    /// A 1D table argument lies outside the tabulated range.
    #[error("value {value} is outside the table range [{min}, {max}]")]
    Range { value: f64, min: f64, max: f64 },
    /// Paired inputs (x/f, x/y/f, x/y query arrays) do not agree in length or shape.
    #[error("incompatible values: {0}")]
    IncompatibleValues(String),
    /// A single argument has an unusable value.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// A scalar pixel scale was requested but the WCS is not a simple pixel scale.
    #[error("WCS is not a simple pixel scale; scale is undefined")]
    NotPixelScale,
    /// The image has no pixel storage (undefined bounds).
    #[error("image has no pixel storage")]
    Undefined,
    /// A line of tabulated text could not be parsed.
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    /// An I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
