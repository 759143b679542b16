//! # Form Mutations
//!
//! Field-scoped semantic operations on a product form.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: each mutation names one operator action
//! 2. **Validated**: structural constraints are checked before anything changes
//! 3. **Addressed by key**: variants are located by their `VariantKey`, never by
//!    list position
//! 4. **Invertible**: every mutation can produce its inverse for undo
//!
//! ## Mutation Semantics
//!
//! ### Structure
//! - Attribute and value edits never regenerate variants
//! - Removing an attribute or changing a slug rewrites assignments through
//!   post-effects (see `post_effects`)
//! - Removing a value leaves variants holding it in place; they stop being
//!   bound to a matrix cell until the next regeneration
//!
//! ### Regenerate / ApplyTemplate
//! - Destructive: the variant list is rebuilt with default price and stock
//! - `ApplyTemplate` replaces the attribute set wholesale (no merge)
//!
//! ### Variant fields
//! - Atomic replacement of a single field of a single variant
//! - Never touches the attribute set

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stonecat_model::{
    Attribute, AttributeSet, AttributeValue, ProductMeta, ProductType, UnitType, Variant, VariantField,
    VariantKey,
};
use stonecat_variants::{generate, GenerateError, TemplateId, VariantIndex};
use thiserror::Error;
use tracing::{debug, info};

use crate::document::ProductForm;

/// Semantic mutations (intent-preserving operations)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mutation {
    /// Set one product-level form field
    SetMeta { field: MetaField },

    /// Insert an attribute at index (clamped to the end)
    AddAttribute { index: usize, attribute: Attribute },

    RemoveAttribute { slug: String },

    /// Rename an attribute and/or change its slug
    UpdateAttribute {
        slug: String,
        name: Option<String>,
        new_slug: Option<String>,
    },

    AddValue {
        slug: String,
        index: usize,
        value: AttributeValue,
    },

    RemoveValue { slug: String, value: String },

    /// Change a value's label and/or machine key
    UpdateValue {
        slug: String,
        value: String,
        display_name: Option<String>,
        new_value: Option<String>,
    },

    MoveValue {
        slug: String,
        value: String,
        index: usize,
    },

    /// Discard all variants and rebuild them from the attribute set
    Regenerate,

    /// Replace the attribute set with a template's
    ApplyTemplate { template: TemplateId },

    /// Set a numeric field; `None` clears the weight
    SetVariantField {
        key: VariantKey,
        field: VariantField,
        value: Option<Decimal>,
    },

    SetVariantName { key: VariantKey, name: String },

    SetVariantSku { key: VariantKey, sku: Option<String> },

    AddVariant { index: usize, variant: Variant },

    RemoveVariant { key: VariantKey },

    /// Rename (or drop, when `to` is `None`) an assignment key in every variant
    RekeyAssignments { from: String, to: Option<String> },

    /// Rename a value inside every assignment of one attribute
    RenameAssignmentValue { slug: String, from: String, to: String },

    /// Put back a previous attribute set and variant list
    Restore {
        attributes: AttributeSet,
        variants: Vec<Variant>,
    },
}

/// Product-level form field with its new value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "name", content = "value", rename_all = "camelCase")]
pub enum MetaField {
    Slug(String),
    Name(String),
    Description(Option<String>),
    CategoryId(u64),
    ProductType(ProductType),
    BasePrice(Option<Decimal>),
    Unit(Option<UnitType>),
    IsActive(bool),
}

impl MetaField {
    /// Current value of the same field in `meta`
    fn read(&self, meta: &ProductMeta) -> MetaField {
        match self {
            MetaField::Slug(_) => MetaField::Slug(meta.slug.clone()),
            MetaField::Name(_) => MetaField::Name(meta.name.clone()),
            MetaField::Description(_) => MetaField::Description(meta.description.clone()),
            MetaField::CategoryId(_) => MetaField::CategoryId(meta.category_id),
            MetaField::ProductType(_) => MetaField::ProductType(meta.product_type),
            MetaField::BasePrice(_) => MetaField::BasePrice(meta.base_price),
            MetaField::Unit(_) => MetaField::Unit(meta.unit),
            MetaField::IsActive(_) => MetaField::IsActive(meta.is_active),
        }
    }

    fn write(&self, meta: &mut ProductMeta) {
        match self {
            MetaField::Slug(v) => meta.slug = v.clone(),
            MetaField::Name(v) => meta.name = v.clone(),
            MetaField::Description(v) => meta.description = v.clone(),
            MetaField::CategoryId(v) => meta.category_id = *v,
            MetaField::ProductType(v) => meta.product_type = *v,
            MetaField::BasePrice(v) => meta.base_price = *v,
            MetaField::Unit(v) => meta.unit = *v,
            MetaField::IsActive(v) => meta.is_active = *v,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("Attribute slug already in use: {0}")]
    DuplicateSlug(String),

    #[error("Attribute slug must not be empty")]
    EmptySlug,

    #[error("Value '{value}' not found in attribute {slug}")]
    ValueNotFound { slug: String, value: String },

    #[error("Value '{value}' already exists in attribute {slug}")]
    DuplicateValue { slug: String, value: String },

    #[error("Attribute value must not be empty")]
    EmptyValue,

    #[error("Variant not found: {0}")]
    VariantNotFound(String),

    #[error("Variant refers to unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("{0} must not be negative")]
    NegativeValue(VariantField),

    #[error("Stock must be a whole number between 0 and {max}, got {0}", max = u32::MAX)]
    InvalidStock(Decimal),

    #[error("{0} cannot be cleared")]
    FieldNotClearable(VariantField),

    #[error(transparent)]
    Generate(#[from] GenerateError),
}

impl Mutation {
    /// Apply mutation to the form with validation
    pub fn apply(&self, form: &mut ProductForm) -> Result<(), MutationError> {
        self.apply_with(form, Lookup::Scan)
    }

    /// Like [`Mutation::apply`], resolving variant keys through `index`.
    ///
    /// `index` must have been built from `form.variants` as they are now.
    pub fn apply_indexed(&self, form: &mut ProductForm, index: &VariantIndex) -> Result<(), MutationError> {
        self.apply_with(form, Lookup::Index(index))
    }

    fn apply_with(&self, form: &mut ProductForm, lookup: Lookup<'_>) -> Result<(), MutationError> {
        // Validate first
        self.validate_with(form, lookup)?;

        match self {
            Mutation::SetMeta { field } => {
                field.write(&mut form.meta);
                Ok(())
            }

            Mutation::AddAttribute { index, attribute } => {
                form.attributes.insert(*index, attribute.clone());
                Ok(())
            }

            Mutation::RemoveAttribute { slug } => {
                form.attributes.remove(slug);
                Ok(())
            }

            Mutation::UpdateAttribute { slug, name, new_slug } => {
                let attribute = Self::attribute_mut(form, slug)?;
                if let Some(name) = name {
                    attribute.name = name.clone();
                }
                if let Some(new_slug) = new_slug {
                    attribute.slug = new_slug.clone();
                }
                Ok(())
            }

            Mutation::AddValue { slug, index, value } => {
                let attribute = Self::attribute_mut(form, slug)?;
                let index = (*index).min(attribute.values.len());
                attribute.values.insert(index, value.clone());
                attribute.renumber();
                Ok(())
            }

            Mutation::RemoveValue { slug, value } => {
                let attribute = Self::attribute_mut(form, slug)?;
                let position = Self::value_position(attribute, value)?;
                attribute.values.remove(position);
                attribute.renumber();
                Ok(())
            }

            Mutation::UpdateValue { slug, value, display_name, new_value } => {
                let attribute = Self::attribute_mut(form, slug)?;
                let position = Self::value_position(attribute, value)?;
                let target = &mut attribute.values[position];
                if let Some(display_name) = display_name {
                    target.display_name = display_name.clone();
                }
                if let Some(new_value) = new_value {
                    target.value = new_value.clone();
                }
                Ok(())
            }

            Mutation::MoveValue { slug, value, index } => {
                let attribute = Self::attribute_mut(form, slug)?;
                let position = Self::value_position(attribute, value)?;
                let moved = attribute.values.remove(position);
                let index = (*index).min(attribute.values.len());
                attribute.values.insert(index, moved);
                attribute.renumber();
                Ok(())
            }

            Mutation::Regenerate => {
                form.variants = generate(&form.attributes)?;
                Ok(())
            }

            Mutation::ApplyTemplate { template } => Self::apply_template(form, *template),

            Mutation::SetVariantField { key, field, value } => {
                let variant = Self::variant_mut(form, key, lookup)?;
                match (field, value) {
                    (VariantField::Price, Some(v)) => variant.price = *v,
                    (VariantField::Stock, Some(v)) => {
                        variant.stock = v.to_u32().ok_or(MutationError::InvalidStock(*v))?
                    }
                    (VariantField::Weight, v) => variant.weight = *v,
                    (field, None) => return Err(MutationError::FieldNotClearable(*field)),
                }
                Ok(())
            }

            Mutation::SetVariantName { key, name } => {
                Self::variant_mut(form, key, lookup)?.name = name.clone();
                Ok(())
            }

            Mutation::SetVariantSku { key, sku } => {
                Self::variant_mut(form, key, lookup)?.sku = sku.clone();
                Ok(())
            }

            Mutation::AddVariant { index, variant } => {
                let index = (*index).min(form.variants.len());
                form.variants.insert(index, variant.clone());
                Ok(())
            }

            Mutation::RemoveVariant { key } => {
                let position = Self::variant_position(form, key, lookup)?;
                form.variants.remove(position);
                Ok(())
            }

            Mutation::RekeyAssignments { from, to } => {
                for variant in &mut form.variants {
                    if let Some(value) = variant.assignment.remove(from) {
                        if let Some(to) = to {
                            variant.assignment.insert(to.clone(), value);
                        }
                    }
                }
                Ok(())
            }

            Mutation::RenameAssignmentValue { slug, from, to } => {
                for variant in &mut form.variants {
                    if let Some(value) = variant.assignment.get_mut(slug) {
                        if value == from {
                            *value = to.clone();
                        }
                    }
                }
                Ok(())
            }

            Mutation::Restore { attributes, variants } => {
                form.attributes = attributes.clone();
                form.variants = variants.clone();
                Ok(())
            }
        }
    }

    fn apply_template(form: &mut ProductForm, template: TemplateId) -> Result<(), MutationError> {
        form.attributes = template.attribute_set();

        let dimensions = form.attributes.with_values().count();
        if form.meta.product_type == ProductType::Matrix && dimensions >= 2 {
            form.variants = generate(&form.attributes)?;
        } else {
            debug!(
                template = %template,
                product_type = %form.meta.product_type,
                "Template applied without matrix pricing - clearing variants"
            );
            form.variants.clear();
        }

        info!(
            template = %template,
            attributes = form.attributes.len(),
            variants = form.variants.len(),
            "Template applied"
        );
        Ok(())
    }

    /// Validate without applying
    pub fn validate(&self, form: &ProductForm) -> Result<(), MutationError> {
        self.validate_with(form, Lookup::Scan)
    }

    fn validate_with(&self, form: &ProductForm, lookup: Lookup<'_>) -> Result<(), MutationError> {
        match self {
            Mutation::SetMeta { .. } => Ok(()),

            Mutation::AddAttribute { attribute, .. } => {
                if attribute.slug.trim().is_empty() {
                    return Err(MutationError::EmptySlug);
                }
                if form.attributes.contains(&attribute.slug) {
                    return Err(MutationError::DuplicateSlug(attribute.slug.clone()));
                }
                for (i, value) in attribute.values.iter().enumerate() {
                    if value.value.is_empty() {
                        return Err(MutationError::EmptyValue);
                    }
                    if attribute.values[..i].iter().any(|v| v.value == value.value) {
                        return Err(MutationError::DuplicateValue {
                            slug: attribute.slug.clone(),
                            value: value.value.clone(),
                        });
                    }
                }
                Ok(())
            }

            Mutation::RemoveAttribute { slug } => {
                Self::attribute(form, slug)?;
                Ok(())
            }

            Mutation::UpdateAttribute { slug, new_slug, .. } => {
                Self::attribute(form, slug)?;
                if let Some(new_slug) = new_slug {
                    if new_slug.trim().is_empty() {
                        return Err(MutationError::EmptySlug);
                    }
                    if new_slug != slug && form.attributes.contains(new_slug) {
                        return Err(MutationError::DuplicateSlug(new_slug.clone()));
                    }
                }
                Ok(())
            }

            Mutation::AddValue { slug, value, .. } => {
                let attribute = Self::attribute(form, slug)?;
                if value.value.is_empty() {
                    return Err(MutationError::EmptyValue);
                }
                if attribute.value(&value.value).is_some() {
                    return Err(MutationError::DuplicateValue {
                        slug: slug.clone(),
                        value: value.value.clone(),
                    });
                }
                Ok(())
            }

            Mutation::RemoveValue { slug, value } | Mutation::MoveValue { slug, value, .. } => {
                let attribute = Self::attribute(form, slug)?;
                Self::value_position(attribute, value)?;
                Ok(())
            }

            Mutation::UpdateValue { slug, value, new_value, .. } => {
                let attribute = Self::attribute(form, slug)?;
                Self::value_position(attribute, value)?;
                if let Some(new_value) = new_value {
                    if new_value.is_empty() {
                        return Err(MutationError::EmptyValue);
                    }
                    if new_value != value && attribute.value(new_value).is_some() {
                        return Err(MutationError::DuplicateValue {
                            slug: slug.clone(),
                            value: new_value.clone(),
                        });
                    }
                }
                Ok(())
            }

            Mutation::Regenerate => {
                if form.attributes.is_empty() {
                    return Err(GenerateError::EmptyAttributeSet.into());
                }
                if form.attributes.with_values().next().is_none() {
                    return Err(GenerateError::NoAttributeValues.into());
                }
                Ok(())
            }

            Mutation::ApplyTemplate { .. } => Ok(()),

            Mutation::SetVariantField { key, field, value } => {
                Self::variant_position(form, key, lookup)?;
                match (field, value) {
                    (VariantField::Weight, None) => Ok(()),
                    (field, None) => Err(MutationError::FieldNotClearable(*field)),
                    (field, Some(v)) if v.is_sign_negative() && !v.is_zero() => {
                        Err(MutationError::NegativeValue(*field))
                    }
                    (VariantField::Stock, Some(v)) if !v.fract().is_zero() || v.to_u32().is_none() => {
                        Err(MutationError::InvalidStock(*v))
                    }
                    _ => Ok(()),
                }
            }

            Mutation::SetVariantName { key, .. }
            | Mutation::SetVariantSku { key, .. }
            | Mutation::RemoveVariant { key } => {
                Self::variant_position(form, key, lookup)?;
                Ok(())
            }

            Mutation::AddVariant { variant, .. } => {
                for slug in variant.assignment.keys() {
                    if !form.attributes.contains(slug) {
                        return Err(MutationError::UnknownAttribute(slug.clone()));
                    }
                }
                Ok(())
            }

            Mutation::RekeyAssignments { .. }
            | Mutation::RenameAssignmentValue { .. }
            | Mutation::Restore { .. } => Ok(()),
        }
    }

    /// Create the mutation that undoes this one, given the form before it runs
    pub fn to_inverse(&self, form: &ProductForm) -> Result<Mutation, MutationError> {
        self.to_inverse_with(form, Lookup::Scan)
    }

    /// Like [`Mutation::to_inverse`], resolving variant keys through `index`
    pub fn to_inverse_indexed(&self, form: &ProductForm, index: &VariantIndex) -> Result<Mutation, MutationError> {
        self.to_inverse_with(form, Lookup::Index(index))
    }

    fn to_inverse_with(&self, form: &ProductForm, lookup: Lookup<'_>) -> Result<Mutation, MutationError> {
        self.validate_with(form, lookup)?;

        let inverse = match self {
            Mutation::SetMeta { field } => Mutation::SetMeta {
                field: field.read(&form.meta),
            },

            Mutation::AddAttribute { attribute, .. } => Mutation::RemoveAttribute {
                slug: attribute.slug.clone(),
            },

            Mutation::UpdateAttribute { slug, name, new_slug: None } => {
                let attribute = Self::attribute(form, slug)?;
                Mutation::UpdateAttribute {
                    slug: slug.clone(),
                    name: name.as_ref().map(|_| attribute.name.clone()),
                    new_slug: None,
                }
            }

            Mutation::AddValue { slug, value, .. } => Mutation::RemoveValue {
                slug: slug.clone(),
                value: value.value.clone(),
            },

            Mutation::RemoveValue { slug, value } => {
                let attribute = Self::attribute(form, slug)?;
                let position = Self::value_position(attribute, value)?;
                Mutation::AddValue {
                    slug: slug.clone(),
                    index: position,
                    value: attribute.values[position].clone(),
                }
            }

            Mutation::UpdateValue { slug, value, display_name, new_value: None } => {
                let attribute = Self::attribute(form, slug)?;
                let position = Self::value_position(attribute, value)?;
                Mutation::UpdateValue {
                    slug: slug.clone(),
                    value: value.clone(),
                    display_name: display_name
                        .as_ref()
                        .map(|_| attribute.values[position].display_name.clone()),
                    new_value: None,
                }
            }

            Mutation::MoveValue { slug, value, .. } => {
                let attribute = Self::attribute(form, slug)?;
                let position = Self::value_position(attribute, value)?;
                Mutation::MoveValue {
                    slug: slug.clone(),
                    value: value.clone(),
                    index: position,
                }
            }

            Mutation::SetVariantField { key, field, .. } => {
                let variant = &form.variants[Self::variant_position(form, key, lookup)?];
                let value = match field {
                    VariantField::Price => Some(variant.price),
                    VariantField::Stock => Some(Decimal::from(variant.stock)),
                    VariantField::Weight => variant.weight,
                };
                Mutation::SetVariantField {
                    key: key.clone(),
                    field: *field,
                    value,
                }
            }

            Mutation::SetVariantName { key, .. } => Mutation::SetVariantName {
                key: key.clone(),
                name: form.variants[Self::variant_position(form, key, lookup)?].name.clone(),
            },

            Mutation::SetVariantSku { key, .. } => Mutation::SetVariantSku {
                key: key.clone(),
                sku: form.variants[Self::variant_position(form, key, lookup)?].sku.clone(),
            },

            // Everything else rewrites variants wholesale or through
            // post-effects; restore a snapshot
            _ => Mutation::Restore {
                attributes: form.attributes.clone(),
                variants: form.variants.clone(),
            },
        };

        Ok(inverse)
    }

    /// Whether this mutation changes the attribute set or the variant list shape
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            Mutation::SetMeta { .. }
                | Mutation::SetVariantField { .. }
                | Mutation::SetVariantName { .. }
                | Mutation::SetVariantSku { .. }
        )
    }

    /// Debug name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::SetMeta { .. } => "set_meta",
            Mutation::AddAttribute { .. } => "add_attribute",
            Mutation::RemoveAttribute { .. } => "remove_attribute",
            Mutation::UpdateAttribute { .. } => "update_attribute",
            Mutation::AddValue { .. } => "add_value",
            Mutation::RemoveValue { .. } => "remove_value",
            Mutation::UpdateValue { .. } => "update_value",
            Mutation::MoveValue { .. } => "move_value",
            Mutation::Regenerate => "regenerate",
            Mutation::ApplyTemplate { .. } => "apply_template",
            Mutation::SetVariantField { .. } => "set_variant_field",
            Mutation::SetVariantName { .. } => "set_variant_name",
            Mutation::SetVariantSku { .. } => "set_variant_sku",
            Mutation::AddVariant { .. } => "add_variant",
            Mutation::RemoveVariant { .. } => "remove_variant",
            Mutation::RekeyAssignments { .. } => "rekey_assignments",
            Mutation::RenameAssignmentValue { .. } => "rename_assignment_value",
            Mutation::Restore { .. } => "restore",
        }
    }

    fn attribute<'a>(form: &'a ProductForm, slug: &str) -> Result<&'a Attribute, MutationError> {
        form.attributes
            .get(slug)
            .ok_or_else(|| MutationError::AttributeNotFound(slug.to_string()))
    }

    fn attribute_mut<'a>(form: &'a mut ProductForm, slug: &str) -> Result<&'a mut Attribute, MutationError> {
        form.attributes
            .get_mut(slug)
            .ok_or_else(|| MutationError::AttributeNotFound(slug.to_string()))
    }

    fn value_position(attribute: &Attribute, value: &str) -> Result<usize, MutationError> {
        attribute
            .value_position(value)
            .ok_or_else(|| MutationError::ValueNotFound {
                slug: attribute.slug.clone(),
                value: value.to_string(),
            })
    }

    fn variant_position(form: &ProductForm, key: &VariantKey, lookup: Lookup<'_>) -> Result<usize, MutationError> {
        let position = match lookup {
            Lookup::Index(index) if index.len() == form.variants.len() => index.get(key),
            _ => form.variants.iter().position(|v| key.is_key_of(&v.assignment)),
        };
        position.ok_or_else(|| MutationError::VariantNotFound(key.to_string()))
    }

    fn variant_mut<'a>(
        form: &'a mut ProductForm,
        key: &VariantKey,
        lookup: Lookup<'_>,
    ) -> Result<&'a mut Variant, MutationError> {
        let position = Self::variant_position(form, key, lookup)?;
        Ok(&mut form.variants[position])
    }
}

/// How key-addressed mutations find their variant
#[derive(Debug, Clone, Copy)]
enum Lookup<'a> {
    /// First variant in list order whose tuple equals the key
    Scan,
    /// Map lookup; first occurrence wins, same as the scan
    Index(&'a VariantIndex),
}

/// Result of applying a mutation
#[derive(Debug, Clone)]
pub struct MutationResult {
    /// New version number
    pub version: u64,

    /// Secondary mutations applied by post-effects
    pub effects: Vec<Mutation>,

    /// Variant count after the mutation
    pub variant_count: usize,
}
