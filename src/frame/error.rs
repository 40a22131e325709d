use crate::ident::Id;

/// Errors raised while building or editing a [`Frame`](super::Frame)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    /// A dimension's value count does not match the frame's row count
    #[error("Dimension '{name}' has {actual} values but the frame has {expected} rows")]
    RowCountMismatch {
        /// Dimension short name
        name: String,
        /// Frame row count
        expected: usize,
        /// Values supplied
        actual: usize,
    },

    /// A dimension with the same name already exists
    #[error("Duplicate dimension name: {0}")]
    DuplicateDimension(String),

    /// No dimension matches the given name
    #[error("Dimension not found: {0}")]
    UnknownDimension(String),

    /// No subset with the given id is attached to the frame
    #[error("Subset not found: {0}")]
    UnknownSubset(Id),

    /// A subset cannot be removed while other subsets name it as parent
    #[error("Subset {0} still has child subsets")]
    SubsetInUse(Id),

    /// A subset with the same id is already attached
    #[error("Subset already exists: {0}")]
    DuplicateSubset(Id),
}
