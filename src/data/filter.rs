use std::collections::{BTreeMap, BTreeSet};

use super::model::{Dataset, Dimension};

// ---------------------------------------------------------------------------
// Filter selection: which values are selected per dimension
// ---------------------------------------------------------------------------

/// Per-dimension selection state: maps dimension → set of selected values.
///
/// A value object passed into pure functions; the UI owns the current
/// instance and every change triggers a full recompute downstream.
pub type FilterSelection = BTreeMap<Dimension, BTreeSet<String>>;

/// Initialise a [`FilterSelection`] with all observed values selected
/// (i.e., show everything).
pub fn init_selection(dataset: &Dataset) -> FilterSelection {
    dataset
        .unique_values
        .iter()
        .map(|(dim, vals)| (*dim, vals.clone()))
        .collect()
}

/// Return indices of records that pass all active filters, in record order.
///
/// A record passes a dimension filter when:
/// * The dimension is not present in `selection` → passes (no constraint)
/// * The selected set for that dimension is empty → nothing selected → fails
/// * The record's value on that dimension is in the selected set → passes
///
/// Dimensions combine with logical AND.
pub fn filtered_indices(dataset: &Dataset, selection: &FilterSelection) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            for (dim, selected) in selection {
                if selected.is_empty() {
                    // Nothing selected for this dimension → hide everything
                    return false;
                }
                if !selected.contains(rec.dimension_value(*dim).as_ref()) {
                    return false;
                }
            }
            true
        })
        .map(|(i, _)| i)
        .collect()
}
