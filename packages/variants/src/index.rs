//! # Variant Index
//!
//! Resolves variants by attribute-value tuple.
//!
//! The index stores list positions, so it is only valid for the variant list
//! it was built from. Callers rebuild it after any change to that list.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use stonecat_model::{Assignment, Variant, VariantKey};
use tracing::debug;

/// Map-based lookup over a variant list
#[derive(Debug, Clone, Default)]
pub struct VariantIndex {
    /// Full tuple → first position with that tuple
    by_key: HashMap<VariantKey, usize>,

    /// Axis slugs the cell map was built for
    axes: Option<(String, String)>,

    /// (row value, column value) → first matching position
    by_cell: HashMap<(String, String), usize>,

    /// Tuples that occur more than once, in list order
    duplicates: Vec<VariantKey>,

    len: usize,
}

impl VariantIndex {
    /// Index full tuples only
    pub fn build(variants: &[Variant]) -> Self {
        let mut by_key = HashMap::with_capacity(variants.len());
        let mut duplicates = Vec::new();

        for (position, variant) in variants.iter().enumerate() {
            match by_key.entry(variant.key()) {
                Entry::Vacant(slot) => {
                    slot.insert(position);
                }
                Entry::Occupied(slot) => {
                    debug!(key = %slot.key(), position, "Duplicate variant tuple");
                    if !duplicates.contains(slot.key()) {
                        duplicates.push(slot.key().clone());
                    }
                }
            }
        }

        Self {
            by_key,
            axes: None,
            by_cell: HashMap::new(),
            duplicates,
            len: variants.len(),
        }
    }

    /// Index full tuples and the (row, column) cells of a matrix
    pub fn with_axes(variants: &[Variant], row_slug: &str, col_slug: &str) -> Self {
        let mut index = Self::build(variants);
        let mut by_cell = HashMap::new();

        for (position, variant) in variants.iter().enumerate() {
            if let (Some(row), Some(col)) = (variant.value_of(row_slug), variant.value_of(col_slug)) {
                by_cell
                    .entry((row.to_string(), col.to_string()))
                    .or_insert(position);
            }
        }

        index.axes = Some((row_slug.to_string(), col_slug.to_string()));
        index.by_cell = by_cell;
        index
    }

    /// Position of the first variant with exactly this tuple
    pub fn get(&self, key: &VariantKey) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    /// Position of the first variant bound to a matrix cell.
    ///
    /// `None` means the cell is unbound. Always `None` when the index was
    /// built without axes.
    pub fn find(&self, row_value: &str, col_value: &str) -> Option<usize> {
        self.by_cell
            .get(&(row_value.to_string(), col_value.to_string()))
            .copied()
    }

    /// First variant agreeing with every pair of a partial assignment
    pub fn resolve(variants: &[Variant], partial: &Assignment) -> Option<usize> {
        variants.iter().position(|v| v.matches(partial))
    }

    pub fn axes(&self) -> Option<(&str, &str)> {
        self.axes
            .as_ref()
            .map(|(row, col)| (row.as_str(), col.as_str()))
    }

    pub fn duplicates(&self) -> &[VariantKey] {
        &self.duplicates
    }

    /// Length of the variant list the index was built from
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
