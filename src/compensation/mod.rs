//! # Spillover Compensation
//!
//! Fluorochromes emit into neighbouring detectors. Instruments record the
//! crosstalk as a spillover matrix `S` in the TEXT segment, and an event's
//! observed detector vector is its true signal vector times `S`:
//!
//! ```text
//! observed = true · S      =>      true = observed · S⁻¹
//! ```
//!
//! The keyword value is a comma separated list: the basis size `N`, `N`
//! parameter names, then `N²` row-major coefficients.
//!
//! A [`Compensator`] inverts the matrix once and applies it either to a copy
//! of a frame (new identity, source untouched) or in place (same frame and
//! dimension identities). Both paths compute every new column before writing
//! anything, so a failure leaves the frame exactly as it was.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::frame::Frame;
use crate::ident::Id;

mod error;
mod matrix;


pub use error::CompensationError;
pub use matrix::SquareMatrix;

/// Keywords that may carry a spillover matrix, in lookup order
pub const SPILLOVER_KEYWORDS: [&str; 4] = ["$SPILLOVER", "SPILL", "$SPILL", "SPILLOVER"];

/// Parsed spillover specification
#[derive(Debug, Clone, PartialEq)]
pub struct SpilloverMatrix {
    id: Id,
    parameters: Vec<String>,
    matrix: SquareMatrix,
}

impl SpilloverMatrix {
    /// Parse a spillover keyword value
    pub fn parse(text: &str) -> Result<Self, CompensationError> {
        let mut tokens: Vec<&str> = text.split(',').map(str::trim).collect();
        while tokens.last() == Some(&"") {
            tokens.pop();
        }
        let n: usize = tokens
            .first()
            .and_then(|t| t.parse().ok())
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                CompensationError::InvalidSpillover(format!(
                    "basis size is not a positive integer: {:?}",
                    tokens.first().unwrap_or(&"")
                ))
            })?;

        let expected = 1 + n + n * n;
        if tokens.len() != expected {
            return Err(CompensationError::InvalidSpillover(format!(
                "expected {} tokens for a {n}x{n} matrix, found {}",
                expected,
                tokens.len()
            )));
        }

        let parameters: Vec<String> = tokens[1..=n].iter().map(|s| s.to_string()).collect();
        let coefficients = tokens[n + 1..]
            .iter()
            .map(|t| {
                t.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| CompensationError::InvalidSpillover(format!("bad coefficient: {t}")))
            })
            .collect::<Result<Vec<f64>, _>>()?;

        let matrix = SquareMatrix::from_row_major(n, coefficients).ok_or_else(|| {
            CompensationError::InvalidSpillover("coefficient count mismatch".to_string())
        })?;
        for i in 0..n {
            if matrix.get(i, i) != 1.0 {
                warn!(
                    "Spillover diagonal for {} is {} (expected 1.0)",
                    parameters[i],
                    matrix.get(i, i)
                );
            }
        }

        Ok(Self {
            id: Id::new(),
            parameters,
            matrix,
        })
    }

    /// Find and parse the spillover keyword in a keyword map
    pub fn from_keywords(keywords: &BTreeMap<String, String>) -> Result<Self, CompensationError> {
        for key in SPILLOVER_KEYWORDS {
            let value = keywords.get(key).or_else(|| {
                keywords
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v)
            });
            if let Some(value) = value {
                debug!("Reading spillover matrix from {}", key);
                return Self::parse(value);
            }
        }
        Err(CompensationError::MissingSpillover)
    }

    /// Stable identity, recorded on compensated dimensions
    pub fn id(&self) -> Id {
        self.id
    }

    /// Basis parameter names in declared order
    pub fn parameter_names(&self) -> &[String] {
        &self.parameters
    }

    /// Coefficient matrix
    pub fn matrix(&self) -> &SquareMatrix {
        &self.matrix
    }

    /// Basis size
    pub fn size(&self) -> usize {
        self.parameters.len()
    }
}

/// Applies (or undoes) one spillover matrix
#[derive(Debug, Clone)]
pub struct Compensator {
    spillover: SpilloverMatrix,
    inverse: SquareMatrix,
}

impl Compensator {
    /// Invert the spillover matrix
    pub fn new(spillover: SpilloverMatrix) -> Result<Self, CompensationError> {
        let inverse = spillover
            .matrix
            .inverse()
            .ok_or(CompensationError::SingularMatrix)?;
        Ok(Self { spillover, inverse })
    }

    /// Compensator for the matrix declared in a frame's keywords
    pub fn for_frame(frame: &Frame) -> Result<Self, CompensationError> {
        let spillover = frame
            .spillover()
            .cloned()
            .ok_or(CompensationError::MissingSpillover)?;
        Self::new(spillover)
    }

    /// The spillover matrix being applied
    pub fn spillover(&self) -> &SpilloverMatrix {
        &self.spillover
    }

    /// Unmixing matrix `S⁻¹`
    pub fn inverse(&self) -> &SquareMatrix {
        &self.inverse
    }

    /// Compensated copy of `frame` under a new identity; the source is untouched
    pub fn compensate(&self, frame: &Frame) -> Result<Frame, CompensationError> {
        let mut copy = frame.duplicate();
        self.compensate_in_place(&mut copy)?;
        Ok(copy)
    }

    /// Compensate the basis dimensions of `frame` in place, keeping identities
    pub fn compensate_in_place(&self, frame: &mut Frame) -> Result<(), CompensationError> {
        let id = self.spillover.id();
        self.apply(frame, &self.inverse, Some(id))?;
        frame.set_compensation_id(Some(id));
        info!(
            "Compensated {} parameters of {}",
            self.spillover.size(),
            frame.preferred_name()
        );
        Ok(())
    }

    /// Copy of `frame` with the spillover re-applied (observed values restored)
    pub fn decompensate(&self, frame: &Frame) -> Result<Frame, CompensationError> {
        let mut copy = frame.duplicate();
        self.decompensate_in_place(&mut copy)?;
        Ok(copy)
    }

    /// Re-apply the spillover in place
    pub fn decompensate_in_place(&self, frame: &mut Frame) -> Result<(), CompensationError> {
        self.apply(frame, &self.spillover.matrix, None)?;
        frame.set_compensation_id(None);
        Ok(())
    }

    fn apply(
        &self,
        frame: &mut Frame,
        matrix: &SquareMatrix,
        compensation_ref: Option<Id>,
    ) -> Result<(), CompensationError> {
        let positions = self.resolve(frame)?;
        let n = positions.len();
        let rows = frame.row_count();

        let mut columns: Vec<Vec<f64>> = (0..n).map(|_| Vec::with_capacity(rows)).collect();
        let mut observed = vec![0.0; n];
        let mut unmixed = vec![0.0; n];
        {
            let dims = frame.dimensions();
            for event in 0..rows {
                for (slot, &p) in observed.iter_mut().zip(&positions) {
                    *slot = dims[p].values()[event];
                }
                matrix.left_multiply(&observed, &mut unmixed);
                for (column, &value) in columns.iter_mut().zip(&unmixed) {
                    column.push(value);
                }
            }
        }

        for (&p, column) in positions.iter().zip(columns) {
            frame.dimension_at_mut(p).replace_values(column, compensation_ref);
        }
        Ok(())
    }

    /// Frame positions of the basis parameters, matched by relaxed name
    fn resolve(&self, frame: &Frame) -> Result<Vec<usize>, CompensationError> {
        let mut positions = Vec::with_capacity(self.spillover.size());
        for name in self.spillover.parameter_names() {
            let p = frame
                .position_of(name)
                .map_err(|_| CompensationError::UnknownDimension(name.clone()))?;
            if positions.contains(&p) {
                return Err(CompensationError::InvalidSpillover(format!(
                    "parameter {name} matches a dimension already in the basis"
                )));
            }
            positions.push(p);
        }
        Ok(positions)
    }
}

/// Compensate with the spillover matrix declared in the frame's own keywords
pub fn compensate(frame: &Frame) -> Result<Frame, CompensationError> {
    Compensator::for_frame(frame)?.compensate(frame)
}

/// In-place variant of [`compensate`]; identities are kept
pub fn compensate_in_place(frame: &mut Frame) -> Result<(), CompensationError> {
    Compensator::for_frame(frame)?.compensate_in_place(frame)
}
