use crate::gating::GateError;
use crate::ident::Id;

/// Errors raised while evaluating a statistic
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatError {
    /// Statistic argument is out of range or missing
    #[error("Invalid statistic argument: {0}")]
    InvalidArgument(String),

    /// Target dimension does not exist in the frame
    #[error("Statistic references unknown dimension: {0}")]
    UnknownDimension(String),

    /// Target subset does not exist in the frame
    #[error("Statistic references unknown subset: {0}")]
    UnknownSubset(Id),

    /// Frequency parent is not an ancestor of the child
    #[error("Subset {parent} is not an ancestor of {child}")]
    NotAncestor {
        /// Child subset
        child: Id,
        /// Declared parent subset
        parent: Id,
    },

    /// Frequency parent selects no events
    #[error("Parent subset {0} selects no events")]
    EmptyParent(Id),

    /// No events to summarise
    #[error("No events selected")]
    EmptySelection,

    /// Subset evaluation failed
    #[error("Gate error: {0}")]
    Gate(#[from] GateError),
}
