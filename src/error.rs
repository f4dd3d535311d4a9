//! Error types for the generation pipeline
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Generate Error Enum ==
/// Unified error type for the generation pipeline and artifact cache.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// Payload is empty or an option value is out of range
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The base encoder rejected the payload (e.g. over capacity)
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// Requested output format string is not recognized
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// The overlay image could not be loaded or decoded
    #[error("Overlay load failed: {0}")]
    OverlayLoad(String),

    /// A cache-internal failure; never fatal for generation
    #[error("Cache failure: {0}")]
    Cache(String),

    /// Internal pipeline error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == Error Kind ==
/// Machine-checkable discriminant of a [`GenerateError`].
///
/// Callers branch on the kind instead of matching the display message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidData,
    Encoding,
    UnsupportedFormat,
    OverlayLoad,
    Cache,
    Internal,
}

impl GenerateError {
    /// Returns the machine-checkable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerateError::InvalidData(_) => ErrorKind::InvalidData,
            GenerateError::Encoding(_) => ErrorKind::Encoding,
            GenerateError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            GenerateError::OverlayLoad(_) => ErrorKind::OverlayLoad,
            GenerateError::Cache(_) => ErrorKind::Cache,
            GenerateError::Internal(_) => ErrorKind::Internal,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the generation pipeline.
pub type Result<T> = std::result::Result<T, GenerateError>;
