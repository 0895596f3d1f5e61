//! Error types for waveform and log parsing.

use thiserror::Error;

/// Errors that can occur while reading LTspice output files.
#[derive(Debug, Error)]
pub enum Error {
    /// The header ended before a `Binary:` or `Values:` marker.
    #[error("rawfile header has no Binary:/Values: marker")]
    MissingDataMarker,

    /// A header field could not be parsed.
    #[error("invalid rawfile header field {field}: {value}")]
    InvalidHeader { field: &'static str, value: String },

    /// The variable table disagrees with `No. Variables`.
    #[error("rawfile declares {declared} variables but lists {listed}")]
    VariableCountMismatch { declared: usize, listed: usize },

    /// Rawfile layout this reader does not handle.
    #[error("unsupported rawfile format: {0}")]
    UnsupportedRawfile(String),

    /// The data section is shorter than the header promises.
    #[error("rawfile data truncated: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },

    /// The ASCII data section ends before the declared point count.
    #[error("rawfile data truncated: expected {expected} points, found {actual}")]
    MissingPoints { expected: usize, actual: usize },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An ASCII data value could not be parsed.
    #[error("invalid value at point {point}: {value}")]
    InvalidValue { point: usize, value: String },
}

/// Result type for rawfile operations.
pub type Result<T> = std::result::Result<T, Error>;
