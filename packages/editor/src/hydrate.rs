//! # Hydration and Save Payload
//!
//! Converts product JSON as the catalog API returns it into a `ProductForm`,
//! and a `ProductForm` back into the stripped payload the API accepts.
//!
//! Incoming data is loose: a variant's `attributes` may be an object or a
//! JSON-encoded string of one, numbers may arrive as numeric strings, and
//! server bookkeeping (`id`, `productId`, `createdAt`, ...) is ignored.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stonecat_model::{
    Assignment, Attribute, AttributeKind, AttributeSet, AttributeValue, ProductMeta, ProductType, UnitType,
    Variant,
};
use stonecat_variants::variant_name;
use thiserror::Error;
use tracing::{debug, warn};

use crate::document::ProductForm;

#[derive(Error, Debug)]
pub enum HydrateError {
    #[error("Invalid product JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Variant {index} has malformed attributes: {message}")]
    Assignment { index: usize, message: String },

    #[error("Variant {index} has invalid stock {value}")]
    InvalidStock { index: usize, value: Decimal },

    #[error("Attribute '{name}' has an empty slug")]
    EmptySlug { name: String },

    #[error("Attribute slug '{0}' is used more than once")]
    DuplicateSlug(String),
}

/// Product as read from the catalog API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(flatten)]
    pub meta: ProductMeta,
    #[serde(default)]
    pub attributes: Vec<AttributeInput>,
    #[serde(default)]
    pub variants: Vec<VariantInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttributeInput {
    #[serde(flatten)]
    pub attribute: Attribute,
    #[serde(default)]
    pub order: Option<u32>,
}

/// A variant's assignment, either inline or double-encoded as a string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AssignmentRepr {
    Map(BTreeMap<String, Value>),
    Encoded(String),
}

impl Default for AssignmentRepr {
    fn default() -> Self {
        AssignmentRepr::Map(BTreeMap::new())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInput {
    #[serde(default)]
    pub attributes: AssignmentRepr,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub stock: Option<Decimal>,
    #[serde(default)]
    pub weight: Option<Decimal>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit: Option<UnitType>,
}

impl ProductInput {
    pub fn from_json(json: &str) -> Result<Self, HydrateError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Normalize into an editable form
    pub fn into_form(self) -> Result<ProductForm, HydrateError> {
        let mut attributes = self.attributes;
        // Stable: attributes without an explicit order keep their position
        attributes.sort_by_key(|a| a.order.unwrap_or(u32::MAX));

        let mut set = AttributeSet::new();
        for input in attributes {
            let mut attribute = input.attribute;
            if attribute.slug.trim().is_empty() {
                return Err(HydrateError::EmptySlug { name: attribute.name });
            }
            if set.contains(&attribute.slug) {
                return Err(HydrateError::DuplicateSlug(attribute.slug));
            }
            attribute.values.sort_by_key(|v| v.order);
            attribute.renumber();
            set.push(attribute);
        }
        let attributes = set;

        let mut variants = Vec::with_capacity(self.variants.len());
        for (index, input) in self.variants.into_iter().enumerate() {
            variants.push(hydrate_variant(index, input, &attributes)?);
        }

        debug!(
            slug = %self.meta.slug,
            attributes = attributes.len(),
            variants = variants.len(),
            "Hydrated product form"
        );

        Ok(ProductForm {
            meta: self.meta,
            attributes,
            variants,
        })
    }
}

/// Parse catalog JSON straight into a form
pub fn form_from_json(json: &str) -> Result<ProductForm, HydrateError> {
    ProductInput::from_json(json)?.into_form()
}

fn hydrate_variant(index: usize, input: VariantInput, attributes: &AttributeSet) -> Result<Variant, HydrateError> {
    let raw = match input.attributes {
        AssignmentRepr::Map(map) => map,
        AssignmentRepr::Encoded(text) => {
            serde_json::from_str(&text).map_err(|e| HydrateError::Assignment {
                index,
                message: e.to_string(),
            })?
        }
    };

    let mut assignment = Assignment::new();
    for (slug, value) in raw {
        let value = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return Err(HydrateError::Assignment {
                    index,
                    message: format!("value of '{}' is not a scalar: {}", slug, other),
                })
            }
        };

        if !attributes.contains(&slug) {
            warn!(variant = index, attribute = %slug, "Dropping assignment to unknown attribute");
            continue;
        }
        assignment.insert(slug, value);
    }

    let stock = match input.stock {
        None => 0,
        Some(value) if value.fract().is_zero() && !value.is_sign_negative() => value
            .to_u32()
            .ok_or(HydrateError::InvalidStock { index, value })?,
        Some(value) if value.is_zero() => 0,
        Some(value) => return Err(HydrateError::InvalidStock { index, value }),
    };

    let name = match input.name {
        Some(name) if !name.trim().is_empty() => name,
        _ => variant_name(attributes, &assignment),
    };

    Ok(Variant {
        assignment,
        price: input.price.unwrap_or(Decimal::ZERO),
        stock,
        weight: input.weight,
        sku: input.sku.filter(|s| !s.trim().is_empty()),
        name,
        unit: input.unit,
    })
}

/// Persistence-ready snapshot of a form
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    #[serde(flatten)]
    pub meta: MetaPayload,
    pub attributes: Vec<AttributePayload>,
    pub variants: Vec<VariantPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaPayload {
    pub slug: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category_id: u64,
    pub product_type: ProductType,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub base_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitType>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributePayload {
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub kind: AttributeKind,
    pub order: u32,
    pub values: Vec<AttributeValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: u32,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitType>,
    pub attributes: Assignment,
}

impl SavePayload {
    pub fn from_form(form: &ProductForm) -> Self {
        let meta = &form.meta;

        let attributes = form
            .attributes
            .iter()
            .enumerate()
            .map(|(position, attribute)| {
                let mut attribute = attribute.clone();
                attribute.renumber();
                AttributePayload {
                    name: attribute.name,
                    slug: attribute.slug,
                    kind: attribute.kind,
                    order: position as u32,
                    values: attribute.values,
                }
            })
            .collect();

        let variants = form
            .variants
            .iter()
            .map(|variant| VariantPayload {
                name: variant.name.clone(),
                sku: variant.sku.clone(),
                price: variant.price,
                stock: variant.stock,
                weight: variant.weight,
                unit: variant.unit,
                attributes: variant.assignment.clone(),
            })
            .collect();

        Self {
            meta: MetaPayload {
                slug: meta.slug.trim().to_string(),
                name: meta.name.trim().to_string(),
                description: meta.description.clone().filter(|d| !d.trim().is_empty()),
                category_id: meta.category_id,
                product_type: meta.product_type,
                base_price: meta.base_price,
                unit: meta.unit,
                is_active: meta.is_active,
            },
            attributes,
            variants,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
