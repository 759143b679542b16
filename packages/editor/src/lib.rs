//! # Stonecat Editor
//!
//! Product form editing engine: attribute sets, variant lists and the price
//! matrix.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ hydrate: catalog JSON → ProductForm         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document + mutations                │
//! │  - Apply mutations with validation          │
//! │  - Post-effects keep assignments consistent │
//! │  - Undo/redo with snapshots                 │
//! │  - Matrix projection and cell editing       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ hydrate: ProductForm → SavePayload          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Single writer**: an `EditSession` owns the document; `&mut self` is
//!    the only lock
//! 2. **Field-scoped mutations**: every change is a named, invertible
//!    operation
//! 3. **Stable addressing**: variants are found by `VariantKey`, never by
//!    position
//! 4. **Frozen while saving**: no writes between `begin_save` and
//!    `finish_save`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stonecat_editor::{Document, EditSession, VariantField};
//! use stonecat_variants::TemplateId;
//!
//! let doc = Document::load("plita.json")?;
//! let mut session = EditSession::new("client-1", doc);
//!
//! session.apply_template(TemplateId::TumbaRitualnaya)?;
//!
//! session.begin_edit(1, 1, VariantField::Price)?;
//! session.input("500")?;
//! session.commit()?;
//!
//! let (ticket, payload) = session.begin_save()?;
//! // send payload ...
//! session.finish_save(&ticket, Ok(()))?;
//! ```

mod document;
mod errors;
mod hydrate;
mod matrix;
mod mutations;
mod post_effects;
mod session;
mod undo_stack;

pub use document::{Document, ProductForm};
pub use errors::EditorError;
pub use hydrate::{
    form_from_json, AssignmentRepr, AttributeInput, AttributePayload, HydrateError, MetaPayload, ProductInput,
    SavePayload, VariantInput, VariantPayload,
};
pub use matrix::{
    flat_rows, parse_input, ActiveEdit, Axis, AxisLabel, CellBinding, CellState, CommitOutcome, EditInputError,
    FlatRow, MatrixEditor, MatrixError, MatrixView,
};
pub use mutations::{MetaField, Mutation, MutationError, MutationResult};
pub use post_effects::{PostEffect, PostEffectEngine};
pub use session::{EditSession, SaveState, SessionOptions};
pub use undo_stack::{MutationBatch, UndoStack};

// Re-export model types for convenience
pub use stonecat_model::{VariantField, VariantKey};
