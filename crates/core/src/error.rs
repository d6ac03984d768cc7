//! Error types for Ridgeline

use thiserror::Error;

/// Main error type for Ridgeline operations
///
/// Algorithmic degradations (an empty classification, a contour fallback)
/// are not errors; they produce a well-defined, possibly empty, layer.
/// Everything here aborts the current single-region run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("CRS mismatch: {0} vs {1}")]
    CrsMismatch(String, String),

    #[error("Area requested in geographic CRS {0}; reproject to a metric CRS first")]
    GeographicCrs(String),

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Elevation grid has no finite values")]
    NoFiniteData,

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a rejected numeric parameter
    pub fn invalid_parameter(name: &'static str, value: f64, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error comes from run configuration rather than data
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

/// Result type alias for Ridgeline operations
pub type Result<T> = std::result::Result<T, Error>;
