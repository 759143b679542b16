//! # Edit Session
//!
//! Single writer over one product form.
//!
//! An EditSession owns the document, the matrix cell editor and the undo
//! history, and runs the save protocol:
//!
//! ```text
//! Idle ── begin_save ──→ Pending ── finish_save(Ok) ──→ Idle (clean)
//!                           │
//!                           └──── finish_save(Err) ──→ Failed (dirty, re-saveable)
//! ```
//!
//! While a save is pending the form is frozen: every write is rejected with
//! `EditorError::SavePending`.

use serde::{Deserialize, Serialize};
use stonecat_common::IdGenerator;
use stonecat_model::VariantField;
use stonecat_variants::{AttributeTemplate, TemplateId};
use tracing::{debug, info, instrument, warn};

use crate::hydrate::SavePayload;
use crate::matrix::{flat_rows, ActiveEdit, FlatRow, MatrixEditor, MatrixError, MatrixView};
use crate::{Document, EditorError, Mutation, MutationResult, ProductForm, UndoStack};

/// Tunables for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionOptions {
    /// Undo levels kept (0 = unlimited)
    pub undo_levels: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { undo_levels: 100 }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SaveState {
    #[default]
    Idle,
    Pending { ticket: String, version: u64 },
    Failed { message: String },
}

/// One operator's editing session
#[derive(Debug)]
pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    document: Document,
    editor: MatrixEditor,
    history: UndoStack,
    save: SaveState,
    tickets: IdGenerator,
}

impl EditSession {
    pub fn new(id: impl Into<String>, document: Document) -> Self {
        Self::with_options(id, document, SessionOptions::default())
    }

    pub fn with_options(id: impl Into<String>, document: Document, options: SessionOptions) -> Self {
        let id = id.into();
        Self {
            tickets: IdGenerator::new(&id),
            id,
            document,
            editor: MatrixEditor::new(),
            history: UndoStack::with_max_levels(options.undo_levels),
            save: SaveState::Idle,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn form(&self) -> &ProductForm {
        self.document.form()
    }

    pub fn editor(&self) -> &MatrixEditor {
        &self.editor
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn save_state(&self) -> &SaveState {
        &self.save
    }

    pub fn is_dirty(&self) -> bool {
        self.document.is_dirty()
    }

    fn ensure_writable(&self) -> Result<(), EditorError> {
        match self.save {
            SaveState::Pending { .. } => Err(EditorError::SavePending),
            _ => Ok(()),
        }
    }

    /// Apply a mutation with undo support.
    ///
    /// Structural mutations discard any cell edit in progress, since the
    /// cell may no longer exist afterwards.
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        self.ensure_writable()?;

        let result = self.history.apply(&mutation, &mut self.document)?;

        if mutation.is_structural() {
            if let Some(edit) = self.editor.cancel() {
                debug!(row = edit.row, col = edit.col, mutation = mutation.name(), "Cell edit discarded");
            }
        }

        Ok(result)
    }

    /// Templates that suit the current product type
    pub fn templates(&self) -> Vec<&'static AttributeTemplate> {
        TemplateId::for_product_type(self.form().meta.product_type)
    }

    #[instrument(skip(self, template), fields(session = %self.id, template = %template))]
    pub fn apply_template(&mut self, template: TemplateId) -> Result<MutationResult, EditorError> {
        self.apply(Mutation::ApplyTemplate { template })
    }

    pub fn regenerate(&mut self) -> Result<MutationResult, EditorError> {
        self.apply(Mutation::Regenerate)
    }

    /// Current matrix for one field
    pub fn matrix(&self, field: VariantField) -> Result<MatrixView, EditorError> {
        let form = self.form();
        MatrixView::project(&form.attributes, &form.variants, field).ok_or_else(|| MatrixError::Unavailable.into())
    }

    pub fn flat_list(&self) -> Vec<FlatRow> {
        let form = self.form();
        flat_rows(&form.attributes, &form.variants)
    }

    pub fn begin_edit(&mut self, row: usize, col: usize, field: VariantField) -> Result<&ActiveEdit, EditorError> {
        self.ensure_writable()?;
        let view = self.matrix(field)?;
        Ok(self.editor.begin(&view, row, col)?)
    }

    pub fn input(&mut self, text: impl Into<String>) -> Result<(), EditorError> {
        self.ensure_writable()?;
        Ok(self.editor.input(text)?)
    }

    /// Commit the active cell.
    ///
    /// The editor only leaves `Editing` once the document accepted the
    /// value; bad input or a rejected mutation keep the buffer for another
    /// try.
    pub fn commit(&mut self) -> Result<MutationResult, EditorError> {
        self.ensure_writable()?;

        let mutation = self.editor.prepare_commit()?;
        let result = self.history.apply(&mutation, &mut self.document)?;
        self.editor.finish_commit();

        Ok(result)
    }

    /// Commit, then start editing the next bound cell of the same field
    pub fn commit_and_advance(&mut self) -> Result<(MutationResult, Option<(usize, usize)>), EditorError> {
        let (row, col, field) = match self.editor.active() {
            Some(edit) => (edit.row, edit.col, edit.field),
            None => return Err(MatrixError::NotEditing.into()),
        };

        let result = self.commit()?;

        let view = self.matrix(field)?;
        let next = view.next_bound(row, col);
        if let Some((row, col)) = next {
            self.editor.begin(&view, row, col)?;
        }

        Ok((result, next))
    }

    /// Discard the active cell edit, if any
    pub fn cancel_edit(&mut self) -> Option<ActiveEdit> {
        self.editor.cancel()
    }

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.ensure_writable()?;
        self.editor.cancel();
        self.history.undo(&mut self.document)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.ensure_writable()?;
        self.editor.cancel();
        self.history.redo(&mut self.document)
    }

    /// Freeze the form and produce the payload to send.
    ///
    /// Returns a ticket that must be handed back to [`Self::finish_save`].
    pub fn begin_save(&mut self) -> Result<(String, SavePayload), EditorError> {
        self.ensure_writable()?;

        let issues = self.form().meta.validate();
        if !issues.is_empty() {
            return Err(EditorError::Invalid(issues));
        }

        if let Some(edit) = self.editor.cancel() {
            debug!(row = edit.row, col = edit.col, "Uncommitted cell edit dropped before save");
        }

        let ticket = self.tickets.next_id();
        let payload = SavePayload::from_form(self.form());

        info!(
            session = %self.id,
            ticket = %ticket,
            version = self.document.version,
            variants = payload.variants.len(),
            "Save started"
        );

        self.save = SaveState::Pending {
            ticket: ticket.clone(),
            version: self.document.version,
        };

        Ok((ticket, payload))
    }

    /// Resolve a pending save.
    ///
    /// On failure the form is left exactly as it was and can be saved again.
    pub fn finish_save(&mut self, ticket: &str, outcome: Result<(), String>) -> Result<(), EditorError> {
        let version = match &self.save {
            SaveState::Pending { ticket: pending, version } if pending == ticket => *version,
            _ => return Err(EditorError::UnknownSaveTicket(ticket.to_string())),
        };

        match outcome {
            Ok(()) => {
                self.document.mark_saved(version);
                self.save = SaveState::Idle;
                info!(session = %self.id, ticket, version, "Save finished");
            }
            Err(message) => {
                warn!(session = %self.id, ticket, error = %message, "Save failed");
                self.save = SaveState::Failed { message };
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use stonecat_model::{Attribute, AttributeSet, ProductMeta, ProductType};

    fn session() -> EditSession {
        let attributes = AttributeSet::from_attributes(vec![
            Attribute::new("Size", "size").with_value("A", "A").with_value("B", "B"),
            Attribute::new("Grade", "grade").with_value("1", "1").with_value("2", "2"),
        ]);
        let meta = ProductMeta {
            slug: "plita".to_string(),
            name: "Плита".to_string(),
            category_id: 1,
            product_type: ProductType::Matrix,
            ..ProductMeta::default()
        };
        let mut session = EditSession::new(
            "client-1",
            Document::new(ProductForm {
                meta,
                attributes,
                variants: vec![],
            }),
        );
        session.regenerate().unwrap();
        session
    }

    #[test]
    fn test_session_creation() {
        let session = session();
        assert_eq!(session.id, "client-1");
        assert_eq!(session.form().variants.len(), 4);
        assert_eq!(session.save_state(), &SaveState::Idle);
        assert!(!session.editor().is_editing());
    }

    #[test]
    fn test_structural_mutation_cancels_cell_edit() {
        let mut session = session();
        session.begin_edit(0, 0, VariantField::Price).unwrap();

        session
            .apply(Mutation::RemoveValue {
                slug: "size".to_string(),
                value: "B".to_string(),
            })
            .unwrap();

        assert!(!session.editor().is_editing());
    }

    #[test]
    fn test_field_mutation_keeps_cell_edit() {
        let mut session = session();
        session.begin_edit(0, 0, VariantField::Price).unwrap();
        let key = session.form().variants[3].key();

        session
            .apply(Mutation::SetVariantSku {
                key,
                sku: Some("PL-B2".to_string()),
            })
            .unwrap();

        assert!(session.editor().is_editing());
    }

    #[test]
    fn test_commit_and_advance_walks_row_major() {
        let mut session = session();
        session.begin_edit(0, 0, VariantField::Stock).unwrap();

        for stock in ["1", "2", "3"] {
            session.input(stock).unwrap();
            let (_, next) = session.commit_and_advance().unwrap();
            assert!(next.is_some());
        }
        session.input("4").unwrap();
        let (_, next) = session.commit_and_advance().unwrap();
        assert_eq!(next, None);

        let stock: Vec<_> = session.form().variants.iter().map(|v| v.stock).collect();
        assert_eq!(stock, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_save_requires_valid_meta() {
        let mut session = session();
        session
            .apply(Mutation::SetMeta {
                field: crate::MetaField::CategoryId(0),
            })
            .unwrap();

        match session.begin_save() {
            Err(EditorError::Invalid(issues)) => assert_eq!(issues[0].field, "categoryId"),
            other => panic!("expected invalid form, got {:?}", other.map(|(t, _)| t)),
        }
        assert_eq!(session.save_state(), &SaveState::Idle);
    }

    #[test]
    fn test_unknown_ticket_rejected() {
        let mut session = session();
        let (ticket, _) = session.begin_save().unwrap();

        assert!(matches!(
            session.finish_save("bogus", Ok(())),
            Err(EditorError::UnknownSaveTicket(_))
        ));
        session.finish_save(&ticket, Ok(())).unwrap();
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_undo_blocked_while_saving() {
        let mut session = session();
        let key = session.form().variants[0].key();
        session
            .apply(Mutation::SetVariantField {
                key,
                field: VariantField::Price,
                value: Some(Decimal::from(10)),
            })
            .unwrap();

        session.begin_save().unwrap();
        assert!(matches!(session.undo(), Err(EditorError::SavePending)));
    }
}
