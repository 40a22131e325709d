use crate::frame::Frame;
use crate::ident::Id;

use super::{evaluate, EventMask, GateError, Subset};

/// Ancestors of `id`, nearest parent first, ending at a root.
///
/// The walk is bounded by the number of subsets so a corrupted parent chain
/// fails with [`GateError::CyclicAncestry`] instead of looping.
pub fn ancestors(subsets: &[Subset], id: Id) -> Result<Vec<&Subset>, GateError> {
    let start = find(subsets, id)?;
    let mut chain = Vec::new();
    let mut next = start.parent();

    while let Some(parent_id) = next {
        if chain.len() >= subsets.len() || parent_id == id {
            return Err(GateError::CyclicAncestry(id));
        }
        let parent = find(subsets, parent_id)?;
        chain.push(parent);
        next = parent.parent();
    }
    Ok(chain)
}

/// True when `ancestor` appears in the parent chain of `descendant`
pub fn is_ancestor(subsets: &[Subset], ancestor: Id, descendant: Id) -> Result<bool, GateError> {
    Ok(ancestors(subsets, descendant)?
        .iter()
        .any(|s| s.id() == ancestor))
}

/// Membership of `id` intersected with every ancestor's membership
pub fn effective_mask(frame: &Frame, id: Id) -> Result<EventMask, GateError> {
    let subsets = frame.subsets();
    let subset = find(subsets, id)?;
    let mut mask = evaluate(subset, frame)?;
    for ancestor in ancestors(subsets, id)? {
        let ancestor_mask = evaluate(ancestor, frame)?;
        mask &= ancestor_mask.as_bitslice();
    }
    Ok(mask)
}

fn find(subsets: &[Subset], id: Id) -> Result<&Subset, GateError> {
    subsets
        .iter()
        .find(|s| s.id() == id)
        .ok_or(GateError::UnknownSubset(id))
}
