use crate::frame::FrameError;
use crate::transform::TransformError;

/// Errors that can occur while saving or loading a persisted frame
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The message does not start with the frame magic bytes
    #[error("Not a persisted frame (bad magic)")]
    BadMagic,

    /// The message was written by an unknown format version
    #[error("Unsupported frame format version {0}")]
    UnsupportedVersion(u16),

    /// The message ends before a field is complete
    #[error("Truncated frame message while reading {0}")]
    Truncated(&'static str),

    /// A string field is not valid UTF-8
    #[error("Invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),

    /// A transform record carries an unknown type tag
    #[error("Unknown transform tag {0}")]
    InvalidTransformTag(u8),

    /// Fields disagree with each other
    #[error("Inconsistent frame message: {0}")]
    Inconsistent(String),

    /// A stored transform fails validation
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Rebuilding the frame failed
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),
}
