/// Errors raised while parsing or applying a spillover matrix
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompensationError {
    /// None of the spillover keywords is present
    #[error("No spillover keyword found")]
    MissingSpillover,

    /// The spillover keyword text is malformed
    #[error("Invalid spillover specification: {0}")]
    InvalidSpillover(String),

    /// The spillover matrix has no inverse
    #[error("Spillover matrix is singular")]
    SingularMatrix,

    /// A basis parameter has no matching dimension in the frame
    #[error("Spillover parameter not found in frame: {0}")]
    UnknownDimension(String),
}
