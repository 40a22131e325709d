use crate::frame::FrameError;

/// Errors that can occur while reading or writing FCS files
#[derive(Debug, thiserror::Error)]
pub enum FcsError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The fixed-width header is malformed
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The TEXT segment cannot be split into keyword/value pairs
    #[error("Invalid TEXT segment: {0}")]
    InvalidText(String),

    /// A required keyword is absent
    #[error("Missing required keyword: {0}")]
    MissingKeyword(String),

    /// A keyword value cannot be interpreted
    #[error("Invalid value for {key}: {value:?}")]
    InvalidKeyword {
        /// Keyword name
        key: String,
        /// Offending value
        value: String,
    },

    /// `$DATATYPE` is not one of I, F or D
    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    /// `$BYTEORD` is neither little nor big endian
    #[error("Unsupported byte order: {0}")]
    UnsupportedByteOrder(String),

    /// `$MODE` is not list mode
    #[error("Unsupported acquisition mode: {0}")]
    UnsupportedMode(String),

    /// Bit widths do not agree with the data type
    #[error("Inconsistent data layout: {0}")]
    InconsistentLayout(String),

    /// The DATA segment is shorter than the declared events require
    #[error("Truncated DATA segment: expected {expected} bytes, found {actual}")]
    TruncatedData {
        /// Bytes needed for `$TOT` events
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Frame assembly failed
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),
}
