use crate::ident::Id;

/// Errors raised while building or evaluating subsets
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GateError {
    /// Geometry violates its invariants (degenerate rectangle, too few vertices, NaN)
    #[error("Invalid gate geometry: {0}")]
    InvalidGeometry(String),

    /// The subset was drawn on different axes than the ones requested
    #[error("Gate axes ({gate_domain}, {gate_range}) do not match chart axes ({chart_domain}, {chart_range})")]
    AxisMismatch {
        /// Domain dimension of the gate
        gate_domain: String,
        /// Range dimension of the gate
        gate_range: String,
        /// Domain dimension of the chart
        chart_domain: String,
        /// Range dimension of the chart
        chart_range: String,
    },

    /// A referenced dimension does not exist in the frame
    #[error("Gate references unknown dimension: {0}")]
    UnknownDimension(String),

    /// A referenced subset does not exist in the frame
    #[error("Subset not found: {0}")]
    UnknownSubset(Id),

    /// Following parent links from this subset never reaches a root
    #[error("Cyclic parent chain detected at subset {0}")]
    CyclicAncestry(Id),
}
