//! # Undo/Redo Stack
//!
//! Tracks mutation history and enables undo/redo operations.
//!
//! ## Design
//!
//! - Each mutation records its inverse before being applied
//! - Undo applies the inverse and moves mutation to redo stack
//! - Redo reapplies the original mutation
//! - New mutations clear the redo stack
//! - Supports batched operations (group multiple mutations as one undo step)
//!
//! Destructive mutations (regeneration, template application, attribute
//! removal) record a `Restore` snapshot as their inverse, so undoing them
//! brings back the previous attribute set and variant data.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! let mut doc = Document::new(form);
//!
//! stack.apply(&Mutation::Regenerate, &mut doc)?;
//! stack.undo(&mut doc)?;
//! stack.redo(&mut doc)?;
//! ```

use crate::{Document, EditorError, Mutation, MutationResult};

/// A group of mutations that should be undone/redone together
#[derive(Debug, Clone)]
pub struct MutationBatch {
    /// The mutations in this batch (in application order)
    pub mutations: Vec<Mutation>,

    /// The inverse mutations (in reverse order for undo)
    pub inverses: Vec<Mutation>,

    /// Optional description of this batch
    pub description: Option<String>,
}

impl MutationBatch {
    /// Create a single-mutation batch
    pub fn single(mutation: Mutation, inverse: Mutation) -> Self {
        Self {
            mutations: vec![mutation],
            inverses: vec![inverse],
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of applied mutations (most recent last)
    undo_stack: Vec<MutationBatch>,

    /// Stack of undone mutations (most recent last)
    redo_stack: Vec<MutationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<MutationBatch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Apply a mutation and record it for undo
    pub fn apply(&mut self, mutation: &Mutation, doc: &mut Document) -> Result<MutationResult, EditorError> {
        // Generate inverse before applying
        let inverse = doc.inverse_of(mutation)?;

        let result = doc.apply(mutation.clone())?;

        if let Some(batch) = &mut self.current_batch {
            batch.mutations.push(mutation.clone());
            batch.inverses.insert(0, inverse); // Inverses go in reverse order
        } else {
            let batch = MutationBatch::single(mutation.clone(), inverse)
                .with_description(mutation.name());
            self.push_batch(batch);
        }

        Ok(result)
    }

    /// Start a batch of mutations (will be undone/redone together)
    pub fn begin_batch(&mut self, description: impl Into<String>) {
        self.current_batch = Some(MutationBatch {
            mutations: Vec::new(),
            inverses: Vec::new(),
            description: Some(description.into()),
        });
    }

    /// End the current batch and push to undo stack
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.mutations.is_empty() {
                self.push_batch(batch);
            }
        }
    }

    fn push_batch(&mut self, batch: MutationBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New action invalidates future
        self.redo_stack.clear();
    }

    /// Undo the most recent mutation/batch
    pub fn undo(&mut self, doc: &mut Document) -> Result<bool, EditorError> {
        if let Some(batch) = self.undo_stack.pop() {
            for inverse in &batch.inverses {
                doc.apply(inverse.clone())?;
            }

            self.redo_stack.push(batch);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Redo the most recently undone mutation/batch
    pub fn redo(&mut self, doc: &mut Document) -> Result<bool, EditorError> {
        if let Some(batch) = self.redo_stack.pop() {
            for mutation in &batch.mutations {
                doc.apply(mutation.clone())?;
            }

            self.undo_stack.push(batch);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProductForm;
    use rust_decimal::Decimal;
    use stonecat_model::{Attribute, AttributeSet, VariantField, VariantKey};

    fn document() -> Document {
        let attributes = AttributeSet::from_attributes(vec![
            Attribute::new("Size", "size").with_value("A", "A").with_value("B", "B"),
            Attribute::new("Grade", "grade").with_value("1", "1").with_value("2", "2"),
        ]);
        let mut doc = Document::new(ProductForm {
            attributes,
            ..ProductForm::default()
        });
        doc.apply(Mutation::Regenerate).unwrap();
        doc
    }

    fn set_price(key: &VariantKey, price: i64) -> Mutation {
        Mutation::SetVariantField {
            key: key.clone(),
            field: VariantField::Price,
            value: Some(Decimal::from(price)),
        }
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_apply_undo_redo_price() {
        let mut doc = document();
        let mut stack = UndoStack::new();
        let key = doc.variants()[3].key();

        stack.apply(&set_price(&key, 500), &mut doc).unwrap();
        assert_eq!(doc.variants()[3].price, Decimal::from(500));
        assert_eq!(stack.undo_description(), Some("set_variant_field"));

        assert!(stack.undo(&mut doc).unwrap());
        assert_eq!(doc.variants()[3].price, Decimal::ZERO);
        assert!(stack.can_redo());

        assert!(stack.redo(&mut doc).unwrap());
        assert_eq!(doc.variants()[3].price, Decimal::from(500));
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_undo_regenerate_restores_prices() {
        let mut doc = document();
        let mut stack = UndoStack::new();
        let key = doc.variants()[1].key();

        stack.apply(&set_price(&key, 120), &mut doc).unwrap();
        stack.apply(&Mutation::Regenerate, &mut doc).unwrap();
        assert!(doc.variants().iter().all(|v| v.price.is_zero()));

        stack.undo(&mut doc).unwrap();
        assert_eq!(doc.variants()[1].price, Decimal::from(120));
    }

    #[test]
    fn test_batched_mutations() {
        let mut doc = document();
        let mut stack = UndoStack::new();
        let a = doc.variants()[0].key();
        let b = doc.variants()[1].key();

        stack.begin_batch("Fill first row");
        stack.apply(&set_price(&a, 100), &mut doc).unwrap();
        stack.apply(&set_price(&b, 200), &mut doc).unwrap();
        stack.end_batch();

        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("Fill first row"));

        stack.undo(&mut doc).unwrap();
        assert!(doc.variants().iter().all(|v| v.price.is_zero()));
    }

    #[test]
    fn test_new_mutation_clears_redo() {
        let mut doc = document();
        let mut stack = UndoStack::new();
        let key = doc.variants()[0].key();

        stack.apply(&set_price(&key, 1), &mut doc).unwrap();
        stack.undo(&mut doc).unwrap();
        assert_eq!(stack.redo_levels(), 1);

        stack.apply(&set_price(&key, 2), &mut doc).unwrap();
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut doc = document();
        let mut stack = UndoStack::with_max_levels(2);
        let key = doc.variants()[0].key();

        for price in 0..3 {
            stack.apply(&set_price(&key, price), &mut doc).unwrap();
        }

        assert_eq!(stack.undo_levels(), 2);
    }

    #[test]
    fn test_rejected_mutation_is_not_recorded() {
        let mut doc = document();
        let mut stack = UndoStack::new();

        let result = stack.apply(
            &Mutation::RemoveAttribute {
                slug: "finish".to_string(),
            },
            &mut doc,
        );

        assert!(result.is_err());
        assert!(!stack.can_undo());
    }
}
