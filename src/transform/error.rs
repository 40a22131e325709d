/// Errors raised while constructing a display transform
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    /// A construction parameter is outside its valid domain
    #[error("Invalid transform parameter: {0}")]
    InvalidParameter(String),

    /// The Logicle width solver failed to converge
    #[error("Logicle solver did not converge for W={width}")]
    DidNotConverge {
        /// Width (W) that was being solved for
        width: f64,
    },
}
