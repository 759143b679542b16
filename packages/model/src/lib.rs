//! # Stonecat Model
//!
//! Plain data for the variant matrix engine: attributes and their values,
//! variants keyed by attribute-value tuples, and product form metadata.
//!
//! Nothing here generates or edits; see `stonecat-variants` and
//! `stonecat-editor`.

pub mod attribute;
pub mod product;
pub mod variant;

pub use attribute::{Attribute, AttributeKind, AttributeSet, AttributeValue};
pub use product::{MetaIssue, ProductMeta, ProductType, UnitType};
pub use variant::{Assignment, Variant, VariantField, VariantKey, NAME_SEPARATOR};

// Re-export the decimal type used for money and weights
pub use rust_decimal::Decimal;
