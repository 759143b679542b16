//! # Stonecat Variants
//!
//! Expands attribute sets into priced variants and looks them up again.
//!
//! ```text
//! TemplateCatalog ─┐
//!                  ├─→ AttributeSet ─→ generate() ─→ Vec<Variant> ─→ VariantIndex
//! manual edits ────┘
//! ```
//!
//! ## Ordering Contract
//!
//! Generation is a cartesian product where the first attribute is the
//! outermost (slowest-varying) loop and the last attribute the innermost.
//! `Size{A,B} × Grade{1,2}` always yields `(A,1) (A,2) (B,1) (B,2)`.

pub mod generator;
pub mod index;
pub mod templates;

pub use generator::{combination_count, generate, variant_name, GenerateError};
pub use index::VariantIndex;
pub use templates::{AttributeTemplate, TemplateAttribute, TemplateIcon, TemplateId};
