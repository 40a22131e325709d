//! # Gating
//!
//! A [`Subset`] selects events by testing their `(domain, range)` coordinate
//! against a [`Geometry`]. Subsets form a hierarchy through parent ids; the
//! *effective* membership of a subset is the intersection of its own mask
//! with the masks of every ancestor, so a child never selects an event its
//! parent excluded.
//!
//! Gates are evaluated on raw dimension values. Masks are [`EventMask`]
//! bit vectors with one bit per event.

use bitvec::vec::BitVec;
use log::debug;

use crate::frame::Frame;
use crate::ident::Id;

mod error;
mod geometry;
mod hierarchy;


pub use error::GateError;
pub use geometry::{Geometry, Polygon, Rectangle};
pub use hierarchy::{ancestors, effective_mask, is_ancestor};

/// One bit per event; set bits are members
pub type EventMask = BitVec;

/// Row count above which per-event evaluation is split across threads
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 65_536;

/// The pair of dimensions a chart plots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartAxes {
    /// Horizontal axis dimension name
    pub domain: String,
    /// Vertical axis dimension name
    pub range: String,
}

impl ChartAxes {
    /// Axes for a domain/range dimension pair
    pub fn new(domain: impl Into<String>, range: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            range: range.into(),
        }
    }
}

/// A labelled gate in a subset hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct Subset {
    id: Id,
    label: String,
    domain: String,
    range: String,
    geometry: Geometry,
    parent: Option<Id>,
}

impl Subset {
    /// Create a root subset with a fresh identity
    pub fn new(
        label: impl Into<String>,
        domain: impl Into<String>,
        range: impl Into<String>,
        geometry: Geometry,
    ) -> Self {
        Self {
            id: Id::new(),
            label: label.into(),
            domain: domain.into(),
            range: range.into(),
            geometry,
            parent: None,
        }
    }

    /// Keep a prior identity (used when restoring saved subsets)
    pub fn with_id(mut self, id: Id) -> Self {
        self.id = id;
        self
    }

    /// Set the parent subset
    pub fn with_parent(mut self, parent: Option<Id>) -> Self {
        self.parent = parent;
        self
    }

    /// Edited copy with new geometry; id, label, axes and parent are kept.
    /// The geometry kind may change.
    pub fn with_geometry(&self, geometry: Geometry) -> Self {
        Self {
            geometry,
            ..self.clone()
        }
    }

    /// Edited copy with a new label
    pub fn with_label(&self, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..self.clone()
        }
    }

    /// Stable identity
    pub fn id(&self) -> Id {
        self.id
    }

    /// Human label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Horizontal dimension name
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Vertical dimension name
    pub fn range(&self) -> &str {
        &self.range
    }

    /// Gate shape
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Parent subset id; `None` for roots
    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    /// True when the gate was drawn on exactly these axes
    pub fn is_compatible_with(&self, axes: &ChartAxes) -> bool {
        self.domain == axes.domain && self.range == axes.range
    }

    /// Reject evaluation against a chart with other axes
    pub fn check_axes(&self, axes: &ChartAxes) -> Result<(), GateError> {
        if self.is_compatible_with(axes) {
            Ok(())
        } else {
            Err(GateError::AxisMismatch {
                gate_domain: self.domain.clone(),
                gate_range: self.range.clone(),
                chart_domain: axes.domain.clone(),
                chart_range: axes.range.clone(),
            })
        }
    }
}

/// Own (non-hierarchical) membership of every event in `frame`
pub fn evaluate(subset: &Subset, frame: &Frame) -> Result<EventMask, GateError> {
    let xs = frame
        .find_dimension(subset.domain())
        .ok_or_else(|| GateError::UnknownDimension(subset.domain().to_string()))?
        .values();
    let ys = frame
        .find_dimension(subset.range())
        .ok_or_else(|| GateError::UnknownDimension(subset.range().to_string()))?
        .values();

    let mask = membership(subset.geometry(), xs, ys);
    debug!(
        "Subset '{}' selects {} of {} events",
        subset.label(),
        mask.count_ones(),
        mask.len()
    );
    Ok(mask)
}

/// Evaluate only if the subset was drawn on `axes`
pub fn evaluate_for_axes(
    subset: &Subset,
    frame: &Frame,
    axes: &ChartAxes,
) -> Result<EventMask, GateError> {
    subset.check_axes(axes)?;
    evaluate(subset, frame)
}

fn membership(geometry: &Geometry, xs: &[f64], ys: &[f64]) -> EventMask {
    #[cfg(feature = "parallel")]
    if xs.len() >= PARALLEL_THRESHOLD {
        use rayon::prelude::*;
        let flags: Vec<bool> = xs
            .par_iter()
            .zip(ys.par_iter())
            .map(|(&x, &y)| geometry.contains(x, y))
            .collect();
        return flags.into_iter().collect();
    }

    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| geometry.contains(x, y))
        .collect()
}
