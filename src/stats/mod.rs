//! # Statistics
//!
//! A [`StatSpec`] names one summary to compute against a [`Frame`]: a
//! [`Statistic`] kind, the dimension it reads and optionally the subset whose
//! effective membership restricts the events.
//!
//! ## Kinds
//!
//! | Kind | Needs | Result |
//! |---|---|---|
//! | `Mean`, `Median`, `Stdev`, `Cv`, `Percentile(p)` | dimension | summary of raw values |
//! | `Count` | nothing | events in the subset, or the frame row count |
//! | `Frequency { child, parent }` | two subsets | child count / parent count |
//!
//! Single evaluation reports a typed [`StatError`]. Batch evaluation never
//! aborts on one bad spec: failing specs yield `None` and a warning.

use log::warn;

use crate::frame::Frame;
use crate::gating::{effective_mask, is_ancestor, EventMask};
use crate::ident::Id;

mod descriptive;
mod error;


pub use descriptive::{cv, mean, median, percentile, percentile_sorted, stdev};
pub use error::StatError;

/// Kind of summary, with kind-specific arguments
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statistic {
    /// Arithmetic mean
    Mean,
    /// 50th percentile
    Median,
    /// Sample standard deviation
    Stdev,
    /// Coefficient of variation
    Cv,
    /// Percentile in `[0, 100]`
    Percentile(f64),
    /// Share of the parent's events that are also in the child
    Frequency {
        /// Child subset
        child: Id,
        /// Parent subset, which must be an ancestor of the child
        parent: Id,
    },
    /// Number of events
    Count,
}

impl Statistic {
    /// Short upper-case name used in labels
    pub fn name(&self) -> String {
        match self {
            Statistic::Mean => "MEAN".to_string(),
            Statistic::Median => "MEDIAN".to_string(),
            Statistic::Stdev => "STDEV".to_string(),
            Statistic::Cv => "CV".to_string(),
            Statistic::Percentile(p) => format!("PERCENTILE{p}"),
            Statistic::Frequency { .. } => "FREQUENCY".to_string(),
            Statistic::Count => "COUNT".to_string(),
        }
    }

    /// True for kinds that summarise a dimension's values
    pub fn needs_dimension(&self) -> bool {
        !matches!(self, Statistic::Frequency { .. } | Statistic::Count)
    }
}

/// One statistic request
#[derive(Debug, Clone, PartialEq)]
pub struct StatSpec {
    id: Id,
    statistic: Statistic,
    dimension: Option<String>,
    subset: Option<Id>,
}

impl StatSpec {
    /// Spec over all events with a fresh identity
    pub fn new(statistic: Statistic) -> Self {
        Self {
            id: Id::new(),
            statistic,
            dimension: None,
            subset: None,
        }
    }

    /// Keep a prior identity
    pub fn with_id(mut self, id: Id) -> Self {
        self.id = id;
        self
    }

    /// Target dimension
    pub fn dimension(mut self, name: impl Into<String>) -> Self {
        self.dimension = Some(name.into());
        self
    }

    /// Restrict to the effective members of a subset
    pub fn subset(mut self, id: Id) -> Self {
        self.subset = Some(id);
        self
    }

    /// Stable identity
    pub fn id(&self) -> Id {
        self.id
    }

    /// Statistic kind
    pub fn statistic(&self) -> Statistic {
        self.statistic
    }

    /// Target dimension name
    pub fn dimension_name(&self) -> Option<&str> {
        self.dimension.as_deref()
    }

    /// Restricting subset
    pub fn subset_id(&self) -> Option<Id> {
        self.subset
    }

    /// Presentation label, e.g. `"Lymphocytes - MEDIAN: FL1-A"`.
    ///
    /// Subsets are named by label; a missing subset falls back to its id and
    /// an unrestricted spec to the frame's preferred name. Frequency specs are
    /// named by their reference subset, or by the child when none is set.
    pub fn label(&self, frame: &Frame) -> String {
        let subset_label = |id: Id| {
            frame
                .subset(id)
                .map(|s| s.label().to_string())
                .unwrap_or_else(|| id.to_string())
        };
        match self.statistic {
            Statistic::Frequency { child, .. } => {
                let target = subset_label(self.subset.unwrap_or(child));
                format!("{target} Frequency of Parent")
            }
            Statistic::Count => {
                let target = self
                    .subset
                    .map(subset_label)
                    .unwrap_or_else(|| frame.preferred_name());
                format!("Count: {target}")
            }
            kind => {
                let target = self
                    .subset
                    .map(subset_label)
                    .unwrap_or_else(|| frame.preferred_name());
                format!(
                    "{} - {}: {}",
                    target,
                    kind.name(),
                    self.dimension.as_deref().unwrap_or("?")
                )
            }
        }
    }
}

/// Evaluate one spec against `frame`
pub fn evaluate(spec: &StatSpec, frame: &Frame) -> Result<f64, StatError> {
    match spec.statistic {
        Statistic::Count => Ok(match spec.subset {
            Some(id) => mask_for(frame, id)?.count_ones() as f64,
            None => frame.row_count() as f64,
        }),
        Statistic::Frequency { child, parent } => frequency(frame, child, parent),
        Statistic::Mean => describe(spec, frame, mean),
        Statistic::Median => describe(spec, frame, median),
        Statistic::Stdev => describe(spec, frame, stdev),
        Statistic::Cv => describe(spec, frame, cv),
        Statistic::Percentile(p) => {
            if !(0.0..=100.0).contains(&p) {
                return Err(StatError::InvalidArgument(format!(
                    "percentile {p} outside [0, 100]"
                )));
            }
            describe(spec, frame, |values| percentile(values, p))
        }
    }
}

/// Evaluate many specs against one frame; failures become `None`
pub fn evaluate_batch(specs: &[StatSpec], frame: &Frame) -> Vec<Option<f64>> {
    let one = |spec: &StatSpec| match evaluate(spec, frame) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Statistic '{}' failed: {}", spec.label(frame), e);
            None
        }
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        specs.par_iter().map(one).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        specs.iter().map(one).collect()
    }
}

fn frequency(frame: &Frame, child: Id, parent: Id) -> Result<f64, StatError> {
    if frame.subset(child).is_none() {
        return Err(StatError::UnknownSubset(child));
    }
    if frame.subset(parent).is_none() {
        return Err(StatError::UnknownSubset(parent));
    }
    if !is_ancestor(frame.subsets(), parent, child)? {
        return Err(StatError::NotAncestor { child, parent });
    }
    let parent_count = mask_for(frame, parent)?.count_ones();
    if parent_count == 0 {
        return Err(StatError::EmptyParent(parent));
    }
    let child_count = mask_for(frame, child)?.count_ones();
    Ok(child_count as f64 / parent_count as f64)
}

fn describe(
    spec: &StatSpec,
    frame: &Frame,
    kernel: impl Fn(&[f64]) -> f64,
) -> Result<f64, StatError> {
    let values = selected_values(spec, frame)?;
    if values.is_empty() {
        return Err(StatError::EmptySelection);
    }
    Ok(kernel(&values))
}

fn mask_for(frame: &Frame, id: Id) -> Result<EventMask, StatError> {
    if frame.subset(id).is_none() {
        return Err(StatError::UnknownSubset(id));
    }
    Ok(effective_mask(frame, id)?)
}

fn selected_values(spec: &StatSpec, frame: &Frame) -> Result<Vec<f64>, StatError> {
    let name = spec.dimension.as_deref().ok_or_else(|| {
        StatError::InvalidArgument(format!("{} needs a dimension", spec.statistic.name()))
    })?;
    let values = frame
        .find_dimension(name)
        .ok_or_else(|| StatError::UnknownDimension(name.to_string()))?
        .values();

    match spec.subset {
        None => Ok(values.to_vec()),
        Some(id) => {
            let mask = mask_for(frame, id)?;
            Ok(mask.iter_ones().map(|i| values[i]).collect())
        }
    }
}
