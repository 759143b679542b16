//! # Document Handle
//!
//! Core document abstraction for product editing.
//!
//! A Document owns one product form (meta fields, attribute set and variant
//! list) and its editing state. All changes go through [`Document::apply`],
//! which validates the mutation, applies it with its post-effects and bumps
//! the version.
//!
//! ## Lifecycle
//!
//! ```text
//! Hydrate → Edit → Save payload → Mark saved
//!    ↓        ↓          ↓             ↓
//!  JSON   Mutations   Snapshot     Clean doc
//! ```

use std::path::Path;

use stonecat_common::{CommonError, CommonResult};
use stonecat_model::{AttributeSet, ProductMeta, Variant};
use stonecat_variants::VariantIndex;
use tracing::{debug, warn};

use crate::post_effects::PostEffectEngine;
use crate::{EditorError, Mutation, MutationError, MutationResult};

/// Plain form state, free of any editing bookkeeping
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductForm {
    pub meta: ProductMeta,
    pub attributes: AttributeSet,
    pub variants: Vec<Variant>,
}

/// Editable product document
#[derive(Debug)]
pub struct Document {
    /// Current version number (increments on each successful mutation)
    pub version: u64,

    /// Version last handed to a successful save
    saved_version: u64,

    form: ProductForm,

    /// Lazily rebuilt lookup over `form.variants`
    index: Option<VariantIndex>,

    effects: PostEffectEngine,
}

impl Document {
    pub fn new(form: ProductForm) -> Self {
        Self {
            version: 0,
            saved_version: 0,
            form,
            index: None,
            effects: PostEffectEngine::new(),
        }
    }

    /// Load a product from a catalog JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let source = read_source(path.as_ref())?;
        let form = crate::hydrate::form_from_json(&source)?;
        let mut doc = Self::new(form);

        let duplicates = doc.index().duplicates().len();
        if duplicates > 0 {
            warn!(duplicates, "Product has variants sharing one attribute tuple; edits hit the first");
        }
        Ok(doc)
    }

    pub fn form(&self) -> &ProductForm {
        &self.form
    }

    pub fn meta(&self) -> &ProductMeta {
        &self.form.meta
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.form.attributes
    }

    pub fn variants(&self) -> &[Variant] {
        &self.form.variants
    }

    /// Full-tuple index over the current variant list (cheap if cached)
    pub fn index(&mut self) -> &VariantIndex {
        let variants = &self.form.variants;
        self.index.get_or_insert_with(|| VariantIndex::build(variants))
    }

    /// Apply a mutation and its post-effects.
    ///
    /// The version only moves when the mutation succeeds; a rejected
    /// mutation leaves the form untouched.
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        let variants = &self.form.variants;
        let index = self.index.get_or_insert_with(|| VariantIndex::build(variants));
        let effects = self
            .effects
            .apply_with_effects(&mutation, &mut self.form, Some(&*index))?;

        self.version += 1;
        self.index = None;

        debug!(
            mutation = mutation.name(),
            version = self.version,
            effects = effects.len(),
            variants = self.form.variants.len(),
            "Mutation applied"
        );

        Ok(MutationResult {
            version: self.version,
            effects,
            variant_count: self.form.variants.len(),
        })
    }

    /// Inverse of `mutation` against the current form, for the undo history
    pub fn inverse_of(&mut self, mutation: &Mutation) -> Result<Mutation, MutationError> {
        let variants = &self.form.variants;
        let index = self.index.get_or_insert_with(|| VariantIndex::build(variants));
        mutation.to_inverse_indexed(&self.form, index)
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.version != self.saved_version
    }

    /// Record that `version` reached the server
    pub fn mark_saved(&mut self, version: u64) {
        self.saved_version = version;
    }
}

fn read_source(path: &Path) -> CommonResult<String> {
    std::fs::read_to_string(path)
        .map_err(|source| CommonError::Io {
            path: path.display().to_string(),
            source,
        })
}
