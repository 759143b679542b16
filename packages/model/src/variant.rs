use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::product::UnitType;

/// Separator between value display names in a generated variant name
pub const NAME_SEPARATOR: &str = " × ";

/// Attribute slug → chosen value
pub type Assignment = BTreeMap<String, String>;

/// Canonical identity of a variant: its sorted `(slug, value)` tuple.
///
/// Variants are addressed by key rather than by list position, so edits
/// survive reordering of the variant list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantKey(Vec<(String, String)>);

impl VariantKey {
    pub fn from_assignment(assignment: &Assignment) -> Self {
        Self(
            assignment
                .iter()
                .map(|(slug, value)| (slug.clone(), value.clone()))
                .collect(),
        )
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn get(&self, slug: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(s, _)| s == slug)
            .map(|(_, v)| v.as_str())
    }

    /// Deterministic short id derived from the tuple
    pub fn id(&self) -> String {
        stonecat_common::stable_id(&self.to_string())
    }

    /// Whether `assignment` has exactly this tuple
    pub fn is_key_of(&self, assignment: &Assignment) -> bool {
        self.0.len() == assignment.len()
            && self
                .0
                .iter()
                .zip(assignment.iter())
                .all(|((s1, v1), (s2, v2))| s1 == s2 && v1 == v2)
    }

    pub fn to_assignment(&self) -> Assignment {
        self.0.iter().cloned().collect()
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (slug, value) in &self.0 {
            if !first {
                f.write_str(";")?;
            }
            write!(f, "{}={}", slug, value)?;
            first = false;
        }
        Ok(())
    }
}

/// Numeric field of a variant edited through the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantField {
    Price,
    Stock,
    Weight,
}

impl VariantField {
    pub const ALL: [VariantField; 3] = [VariantField::Price, VariantField::Stock, VariantField::Weight];

    pub fn as_str(&self) -> &'static str {
        match self {
            VariantField::Price => "price",
            VariantField::Stock => "stock",
            VariantField::Weight => "weight",
        }
    }
}

impl fmt::Display for VariantField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VariantField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(VariantField::Price),
            "stock" => Ok(VariantField::Stock),
            "weight" => Ok(VariantField::Weight),
            other => Err(format!("Unknown field: {}. Use: price, stock, or weight", other)),
        }
    }
}

/// One priced/stocked product instance for one combination of values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    #[serde(rename = "attributes")]
    pub assignment: Assignment,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitType>,
}

impl Variant {
    /// Fresh variant with defaults (price 0, stock 0, nothing else set)
    pub fn new(assignment: Assignment, name: impl Into<String>) -> Self {
        Self {
            assignment,
            price: Decimal::ZERO,
            stock: 0,
            weight: None,
            sku: None,
            name: name.into(),
            unit: None,
        }
    }

    pub fn key(&self) -> VariantKey {
        VariantKey::from_assignment(&self.assignment)
    }

    pub fn value_of(&self, slug: &str) -> Option<&str> {
        self.assignment.get(slug).map(String::as_str)
    }

    /// Whether every given pair is present in this variant's assignment
    pub fn matches(&self, partial: &Assignment) -> bool {
        partial
            .iter()
            .all(|(slug, value)| self.assignment.get(slug) == Some(value))
    }

    /// Current value of a numeric field; an unset weight reads as zero
    pub fn field(&self, field: VariantField) -> Decimal {
        match field {
            VariantField::Price => self.price,
            VariantField::Stock => Decimal::from(self.stock),
            VariantField::Weight => self.weight.unwrap_or(Decimal::ZERO),
        }
    }
}
