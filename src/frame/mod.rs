//! # Event Frame
//!
//! A [`Frame`] is the in-memory form of one acquisition: an ordered set of
//! [`Dimension`] columns that all hold exactly `row_count` raw values, the
//! keyword metadata from the source file, and the [`Subset`] hierarchy drawn
//! on it by the gating layer.
//!
//! Dimensions are kept in parameter order (the order they were declared in
//! the file) and indexed by short name for lookup; names are unique within a
//! frame. Column values are read-only to callers. The only mutations are
//! transform re-assignment, subset edits and in-place compensation, all of
//! which take `&mut Frame` and so cannot overlap with readers.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use log::warn;

use crate::compensation::SpilloverMatrix;
use crate::gating::Subset;
use crate::ident::Id;
use crate::transform::Transform;

mod dimension;
mod error;
mod lookup;


pub use dimension::{default_transform, Amplification, Dimension};
pub use error::FrameError;
pub use lookup::find_compatible;

/// Keyword whose value names a frame for display
pub const PREFERRED_NAME_KEYWORD: &str = "$FIL";

/// Columnar event table with keyword metadata and subsets
#[derive(Debug, Clone)]
pub struct Frame {
    id: Id,
    row_count: usize,
    dimensions: Vec<Dimension>,
    by_name: BTreeMap<String, usize>,
    keywords: BTreeMap<String, String>,
    subsets: Vec<Subset>,
    compensation_ref: Option<Id>,
    spillover: OnceLock<Option<SpilloverMatrix>>,
}

impl Frame {
    /// Create an empty frame with a fresh identity
    pub fn new(keywords: BTreeMap<String, String>, row_count: usize) -> Self {
        Self::with_id(Id::new(), keywords, row_count)
    }

    /// Create an empty frame that keeps a prior identity
    pub fn with_id(id: Id, keywords: BTreeMap<String, String>, row_count: usize) -> Self {
        Self {
            id,
            row_count,
            dimensions: Vec::new(),
            by_name: BTreeMap::new(),
            keywords,
            subsets: Vec::new(),
            compensation_ref: None,
            spillover: OnceLock::new(),
        }
    }

    /// Stable identity
    pub fn id(&self) -> Id {
        self.id
    }

    /// Number of events
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of dimensions
    pub fn column_count(&self) -> usize {
        self.dimensions.len()
    }

    /// All keywords, keyed as stored
    pub fn keywords(&self) -> &BTreeMap<String, String> {
        &self.keywords
    }

    /// Look up a keyword case-insensitively; the value is trimmed
    pub fn keyword(&self, key: &str) -> Option<&str> {
        let value = self.keywords.get(key).or_else(|| {
            self.keywords
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })?;
        Some(value.trim())
    }

    /// Display name from `$FIL`, falling back to the frame id
    pub fn preferred_name(&self) -> String {
        match self.keyword(PREFERRED_NAME_KEYWORD) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.id.to_string(),
        }
    }

    /// Append a dimension, checking its length and name uniqueness
    pub fn add_dimension(&mut self, dimension: Dimension) -> Result<(), FrameError> {
        if dimension.len() != self.row_count {
            return Err(FrameError::RowCountMismatch {
                name: dimension.short_name().to_string(),
                expected: self.row_count,
                actual: dimension.len(),
            });
        }
        if self.by_name.contains_key(dimension.short_name()) {
            return Err(FrameError::DuplicateDimension(dimension.short_name().to_string()));
        }
        self.by_name
            .insert(dimension.short_name().to_string(), self.dimensions.len());
        self.dimensions.push(dimension);
        Ok(())
    }

    /// Dimensions in parameter order
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Short names in parameter order
    pub fn dimension_names(&self) -> Vec<&str> {
        self.dimensions.iter().map(Dimension::short_name).collect()
    }

    /// Exact lookup by short name
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.by_name.get(name).map(|&i| &self.dimensions[i])
    }

    /// Relaxed lookup by short, display or stain name
    pub fn find_dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimension(name)
            .or_else(|| find_compatible(self.dimensions.iter(), name))
    }

    /// Relaxed lookup that reports a dangling reference as an error
    pub fn require_dimension(&self, name: &str) -> Result<&Dimension, FrameError> {
        self.find_dimension(name)
            .ok_or_else(|| FrameError::UnknownDimension(name.to_string()))
    }

    /// One event across all dimensions, in parameter order
    pub fn row(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.row_count {
            return None;
        }
        Some(self.dimensions.iter().map(|d| d.values()[index]).collect())
    }

    /// Assign (or clear) the preferred transform of a dimension
    pub fn set_transform(
        &mut self,
        name: &str,
        transform: Option<Transform>,
    ) -> Result<(), FrameError> {
        let position = self.position_of(name)?;
        self.dimensions[position].set_transform(transform);
        Ok(())
    }

    /// Id of the spillover matrix applied to this frame, if any
    pub fn compensation_id(&self) -> Option<Id> {
        self.compensation_ref
    }

    /// Spillover matrix declared in the keywords, parsed on first use
    pub fn spillover(&self) -> Option<&SpilloverMatrix> {
        self.spillover
            .get_or_init(|| match SpilloverMatrix::from_keywords(&self.keywords) {
                Ok(matrix) => Some(matrix),
                Err(crate::compensation::CompensationError::MissingSpillover) => None,
                Err(e) => {
                    warn!("Ignoring spillover keyword on {}: {}", self.preferred_name(), e);
                    None
                }
            })
            .as_ref()
    }

    /// Subsets attached to this frame
    pub fn subsets(&self) -> &[Subset] {
        &self.subsets
    }

    /// Subset by id
    pub fn subset(&self, id: Id) -> Option<&Subset> {
        self.subsets.iter().find(|s| s.id() == id)
    }

    /// Attach a subset; its parent, if any, must already be attached
    pub fn add_subset(&mut self, subset: Subset) -> Result<(), FrameError> {
        if self.subset(subset.id()).is_some() {
            return Err(FrameError::DuplicateSubset(subset.id()));
        }
        if let Some(parent) = subset.parent() {
            if self.subset(parent).is_none() {
                return Err(FrameError::UnknownSubset(parent));
            }
        }
        self.subsets.push(subset);
        Ok(())
    }

    /// Swap in an edited subset with the same id, returning the previous value
    ///
    /// Children keep pointing at the edited subset since its id is unchanged.
    pub fn replace_subset(&mut self, subset: Subset) -> Result<Subset, FrameError> {
        let position = self
            .subsets
            .iter()
            .position(|s| s.id() == subset.id())
            .ok_or(FrameError::UnknownSubset(subset.id()))?;
        if let Some(parent) = subset.parent() {
            if parent == subset.id() || self.subset(parent).is_none() {
                return Err(FrameError::UnknownSubset(parent));
            }
        }
        Ok(std::mem::replace(&mut self.subsets[position], subset))
    }

    /// Detach a subset that no other subset uses as parent
    pub fn remove_subset(&mut self, id: Id) -> Result<Subset, FrameError> {
        let position = self
            .subsets
            .iter()
            .position(|s| s.id() == id)
            .ok_or(FrameError::UnknownSubset(id))?;
        if self.subsets.iter().any(|s| s.parent() == Some(id)) {
            return Err(FrameError::SubsetInUse(id));
        }
        Ok(self.subsets.remove(position))
    }

    pub(crate) fn position_of(&self, name: &str) -> Result<usize, FrameError> {
        if let Some(&i) = self.by_name.get(name) {
            return Ok(i);
        }
        let dim = self.require_dimension(name)?;
        let short = dim.short_name().to_string();
        self.by_name
            .get(&short)
            .copied()
            .ok_or(FrameError::UnknownDimension(short))
    }

    pub(crate) fn dimension_at_mut(&mut self, position: usize) -> &mut Dimension {
        &mut self.dimensions[position]
    }

    pub(crate) fn set_compensation_id(&mut self, id: Option<Id>) {
        self.compensation_ref = id;
    }

    /// Copy of this frame under a fresh identity
    pub(crate) fn duplicate(&self) -> Frame {
        let mut copy = self.clone();
        copy.id = Id::new();
        copy
    }
}
