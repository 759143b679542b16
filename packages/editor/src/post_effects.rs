//! # Post-Effect System
//!
//! Structural mutations trigger cascading effects that keep variant
//! assignments consistent with the attribute set.
//!
//! ## Design
//!
//! Attribute edits never regenerate variants, so the assignments they leave
//! behind have to be rewritten explicitly:
//! - Removing an attribute → drop its slug from every assignment
//! - Re-slugging an attribute → rename the key in every assignment
//! - Changing a value's machine key → rename it in every assignment
//!
//! Post-effects are deterministic: the secondary mutations depend only on
//! the primary mutation and the form it was applied to.

use stonecat_variants::VariantIndex;

use crate::document::ProductForm;
use crate::mutations::{Mutation, MutationError};

/// Post-effect that can be triggered by a mutation
pub trait PostEffect: std::fmt::Debug {
    /// Analyze the applied mutation and generate secondary mutations if needed
    fn analyze(&self, mutation: &Mutation, form: &ProductForm) -> Vec<Mutation>;
}

/// Strip a removed attribute's slug from all assignments
#[derive(Debug)]
pub struct PruneRemovedAttribute;

impl PostEffect for PruneRemovedAttribute {
    fn analyze(&self, mutation: &Mutation, form: &ProductForm) -> Vec<Mutation> {
        match mutation {
            Mutation::RemoveAttribute { slug } if references_slug(form, slug) => {
                vec![Mutation::RekeyAssignments {
                    from: slug.clone(),
                    to: None,
                }]
            }
            _ => vec![],
        }
    }
}

/// Follow an attribute's slug change in all assignments
#[derive(Debug)]
pub struct RenameAssignmentKeys;

impl PostEffect for RenameAssignmentKeys {
    fn analyze(&self, mutation: &Mutation, form: &ProductForm) -> Vec<Mutation> {
        match mutation {
            Mutation::UpdateAttribute {
                slug,
                new_slug: Some(new_slug),
                ..
            } if new_slug != slug && references_slug(form, slug) => {
                vec![Mutation::RekeyAssignments {
                    from: slug.clone(),
                    to: Some(new_slug.clone()),
                }]
            }
            _ => vec![],
        }
    }
}

/// Follow a value's key change in all assignments of its attribute
#[derive(Debug)]
pub struct RenameAssignmentValues;

impl PostEffect for RenameAssignmentValues {
    fn analyze(&self, mutation: &Mutation, form: &ProductForm) -> Vec<Mutation> {
        match mutation {
            Mutation::UpdateValue {
                slug,
                value,
                new_value: Some(new_value),
                ..
            } if new_value != value
                && form
                    .variants
                    .iter()
                    .any(|v| v.value_of(slug) == Some(value.as_str())) =>
            {
                vec![Mutation::RenameAssignmentValue {
                    slug: slug.clone(),
                    from: value.clone(),
                    to: new_value.clone(),
                }]
            }
            _ => vec![],
        }
    }
}

fn references_slug(form: &ProductForm, slug: &str) -> bool {
    form.variants.iter().any(|v| v.assignment.contains_key(slug))
}

/// Post-effect engine that applies all registered effects
#[derive(Debug)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect>>,
}

impl PostEffectEngine {
    /// Create engine with default effects
    pub fn new() -> Self {
        Self {
            effects: vec![
                Box::new(PruneRemovedAttribute),
                Box::new(RenameAssignmentKeys),
                Box::new(RenameAssignmentValues),
            ],
        }
    }

    /// Analyze a mutation and generate all secondary mutations
    pub fn analyze(&self, mutation: &Mutation, form: &ProductForm) -> Vec<Mutation> {
        let mut secondary_mutations = Vec::new();

        for effect in &self.effects {
            let mut effect_mutations = effect.analyze(mutation, form);
            secondary_mutations.append(&mut effect_mutations);
        }

        secondary_mutations
    }

    /// Apply a mutation followed by its secondary mutations.
    ///
    /// `index`, when given, must describe `form.variants` before the primary
    /// mutation; secondary mutations never use it. Returns the secondary
    /// mutations that were applied.
    pub fn apply_with_effects(
        &self,
        mutation: &Mutation,
        form: &mut ProductForm,
        index: Option<&VariantIndex>,
    ) -> Result<Vec<Mutation>, MutationError> {
        match index {
            Some(index) => mutation.apply_indexed(form, index)?,
            None => mutation.apply(form)?,
        }

        let secondary = self.analyze(mutation, form);
        for secondary_mutation in &secondary {
            secondary_mutation.apply(form)?;
        }

        Ok(secondary)
    }
}

impl Default for PostEffectEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stonecat_model::{Attribute, AttributeSet, ProductMeta};
    use stonecat_variants::generate;

    fn form() -> ProductForm {
        let attributes = AttributeSet::from_attributes(vec![
            Attribute::new("Size", "size").with_value("A", "A").with_value("B", "B"),
            Attribute::new("Grade", "grade").with_value("1", "1").with_value("2", "2"),
        ]);
        let variants = generate(&attributes).unwrap();
        ProductForm {
            meta: ProductMeta::default(),
            attributes,
            variants,
        }
    }

    #[test]
    fn test_post_effect_engine_creation() {
        let engine = PostEffectEngine::new();
        assert_eq!(engine.effects.len(), 3);
    }

    #[test]
    fn test_field_edits_have_no_effects() {
        let form = form();
        let engine = PostEffectEngine::new();
        let mutation = Mutation::SetVariantName {
            key: form.variants[0].key(),
            name: "Small, first grade".to_string(),
        };
        assert!(engine.analyze(&mutation, &form).is_empty());
    }

    #[test]
    fn test_remove_attribute_strips_assignments() {
        let mut form = form();
        let engine = PostEffectEngine::new();
        let mutation = Mutation::RemoveAttribute {
            slug: "grade".to_string(),
        };

        let applied = engine.apply_with_effects(&mutation, &mut form, None).unwrap();

        assert_eq!(applied.len(), 1);
        assert!(form.variants.iter().all(|v| !v.assignment.contains_key("grade")));
        assert_eq!(form.variants.len(), 4, "variants are kept, only their tuples shrink");
    }

    #[test]
    fn test_reslug_renames_keys() {
        let mut form = form();
        let engine = PostEffectEngine::new();
        let mutation = Mutation::UpdateAttribute {
            slug: "grade".to_string(),
            name: None,
            new_slug: Some("sort".to_string()),
        };

        engine.apply_with_effects(&mutation, &mut form, None).unwrap();

        assert!(form.attributes.contains("sort"));
        assert!(form.variants.iter().all(|v| v.value_of("sort").is_some()));
        assert!(form.variants.iter().all(|v| v.value_of("grade").is_none()));
    }

    #[test]
    fn test_value_key_change_follows_into_assignments() {
        let mut form = form();
        let engine = PostEffectEngine::new();
        let mutation = Mutation::UpdateValue {
            slug: "size".to_string(),
            value: "B".to_string(),
            display_name: Some("Big".to_string()),
            new_value: Some("big".to_string()),
        };

        engine.apply_with_effects(&mutation, &mut form, None).unwrap();

        let big = form.variants.iter().filter(|v| v.value_of("size") == Some("big")).count();
        assert_eq!(big, 2);
    }
}
