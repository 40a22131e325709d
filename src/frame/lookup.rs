//! Relaxed dimension name matching.
//!
//! Spillover keywords, saved gates and statistic specs refer to dimensions
//! by whatever label the author saw: the detector name (`$PnN`), the stain
//! name (`$PnS`) or the combined display name. Matching falls through
//! progressively looser rules and returns the first hit.

use super::Dimension;

/// Find the dimension best matching `name`.
///
/// Tiers, first match wins:
/// 1. exact short name
/// 2. exact display name
/// 3. exact stain name
/// 4. short or stain name equal after case folding and dropping non-alphanumerics
pub fn find_compatible<'a, I>(dimensions: I, name: &str) -> Option<&'a Dimension>
where
    I: IntoIterator<Item = &'a Dimension>,
    I::IntoIter: Clone,
{
    let dims = dimensions.into_iter();
    let name = name.trim();

    if let Some(dim) = dims.clone().find(|d| d.short_name() == name) {
        return Some(dim);
    }
    if let Some(dim) = dims.clone().find(|d| d.display_name() == name) {
        return Some(dim);
    }
    if let Some(dim) = dims.clone().find(|d| d.stain_name() == Some(name)) {
        return Some(dim);
    }

    let wanted = normalize(name);
    if wanted.is_empty() {
        return None;
    }
    dims.into_iter().find(|d| {
        normalize(d.short_name()) == wanted || d.stain_name().map(normalize).as_deref() == Some(wanted.as_str())
    })
}

fn normalize(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
