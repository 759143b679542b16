//! # Price Matrix
//!
//! Two-axis projection of the variant list and the cell editor on top of it.
//!
//! Rows are the values of the first attribute, columns the values of the
//! second. A cell is *bound* when some variant carries that (row, column)
//! pair; with more than two attributes the first such variant in list order
//! wins and the rest are only reachable through [`flat_rows`].
//!
//! ## Cell state machine
//!
//! ```text
//!         begin            commit (parse ok)
//! Idle ─────────→ Editing ──────────────────→ Idle
//!                  │   ↑ commit (parse error: buffer kept)
//!                  │   └──┘
//!                  └───── cancel ───────────→ Idle
//! ```
//!
//! A commit never writes to the variant list directly: it yields a
//! `Mutation::SetVariantField` addressed by `VariantKey` for the document to
//! apply.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use stonecat_model::{Attribute, AttributeSet, Variant, VariantField, VariantKey};
use stonecat_variants::VariantIndex;
use thiserror::Error;
use tracing::debug;

use crate::Mutation;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error("Price matrix needs at least two attributes and one generated variant")]
    Unavailable,

    #[error("Cell ({row}, {col}) is outside the matrix")]
    CellOutOfRange { row: usize, col: usize },

    #[error("Cell ({row}, {col}) has no variant")]
    UnboundCell { row: usize, col: usize },

    #[error("No cell is being edited")]
    NotEditing,

    #[error(transparent)]
    Input(#[from] EditInputError),
}

/// Operator typed something that is not an acceptable field value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditInputError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("Value must not be negative, got {0}")]
    Negative(Decimal),

    #[error("Stock must be a whole number, got {0}")]
    NotAnInteger(Decimal),

    #[error("Stock {0} is too large")]
    OutOfRange(Decimal),
}

/// Parse operator input for a numeric field.
///
/// Whitespace is trimmed and `,` is accepted as the decimal separator.
pub fn parse_input(field: VariantField, text: &str) -> Result<Decimal, EditInputError> {
    let trimmed = text.trim();
    let normalized = trimmed.replace(',', ".");

    let value = Decimal::from_str(&normalized)
        .map_err(|_| EditInputError::NotANumber(trimmed.to_string()))?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(EditInputError::Negative(value));
    }

    if field == VariantField::Stock {
        if !value.fract().is_zero() {
            return Err(EditInputError::NotAnInteger(value));
        }
        if value > Decimal::from(u32::MAX) {
            return Err(EditInputError::OutOfRange(value));
        }
    }

    Ok(value)
}

/// One row or column header
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisLabel {
    pub value: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub name: String,
    pub slug: String,
    pub labels: Vec<AxisLabel>,
}

impl Axis {
    fn from_attribute(attribute: &Attribute) -> Self {
        let mut labels: Vec<AxisLabel> = Vec::with_capacity(attribute.values.len());
        for value in &attribute.values {
            if labels.iter().any(|l| l.value == value.value) {
                continue;
            }
            labels.push(AxisLabel {
                value: value.value.clone(),
                display_name: value.display_name.clone(),
            });
        }

        Self {
            name: attribute.name.clone(),
            slug: attribute.slug.clone(),
            labels,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Variant behind a bound cell and its current field value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellBinding {
    pub key: VariantKey,
    pub value: Decimal,
}

/// Snapshot of one field of the variant list laid out as a grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixView {
    pub field: VariantField,
    pub rows: Axis,
    pub columns: Axis,
    /// Row-major, `rows.len() * columns.len()` entries
    cells: Vec<Option<CellBinding>>,
}

impl MatrixView {
    /// Lay out `field` over the first two attributes.
    ///
    /// `None` when there are fewer than two attributes or no variants.
    pub fn project(attributes: &AttributeSet, variants: &[Variant], field: VariantField) -> Option<Self> {
        let (row_attr, col_attr) = attributes.axes()?;
        if variants.is_empty() {
            return None;
        }

        let rows = Axis::from_attribute(row_attr);
        let columns = Axis::from_attribute(col_attr);
        let index = VariantIndex::with_axes(variants, &rows.slug, &columns.slug);

        let mut cells = Vec::with_capacity(rows.len() * columns.len());
        for row in &rows.labels {
            for col in &columns.labels {
                cells.push(index.find(&row.value, &col.value).map(|position| {
                    let variant = &variants[position];
                    CellBinding {
                        key: variant.key(),
                        value: variant.field(field),
                    }
                }));
            }
        }

        debug!(
            field = %field,
            rows = rows.len(),
            columns = columns.len(),
            bound = cells.iter().filter(|c| c.is_some()).count(),
            "Projected price matrix"
        );

        Some(Self {
            field,
            rows,
            columns,
            cells,
        })
    }

    /// Binding of a cell; `Ok(None)` for an unbound cell
    pub fn cell(&self, row: usize, col: usize) -> Result<Option<&CellBinding>, MatrixError> {
        if row >= self.rows.len() || col >= self.columns.len() {
            return Err(MatrixError::CellOutOfRange { row, col });
        }
        Ok(self.cells[row * self.columns.len() + col].as_ref())
    }

    /// Next bound cell after (row, col) in row-major order
    pub fn next_bound(&self, row: usize, col: usize) -> Option<(usize, usize)> {
        let width = self.columns.len();
        if width == 0 {
            return None;
        }
        let start = row * width + col + 1;
        self.cells
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, cell)| cell.is_some())
            .map(|(i, _)| (i / width, i % width))
    }

    pub fn bound_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Iterate rows as slices of cells
    pub fn grid(&self) -> impl Iterator<Item = &[Option<CellBinding>]> {
        self.cells.chunks(self.columns.len().max(1))
    }
}

/// One variant in the flat list, with every attribute spelled out
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRow {
    /// Short stable id derived from the key
    pub id: String,
    pub key: VariantKey,
    pub name: String,
    /// (attribute name, value display name) in attribute order
    pub values: Vec<(String, String)>,
    pub price: Decimal,
    pub stock: u32,
    pub weight: Option<Decimal>,
    pub sku: Option<String>,
}

/// Flat listing of all variants in list order
pub fn flat_rows(attributes: &AttributeSet, variants: &[Variant]) -> Vec<FlatRow> {
    variants
        .iter()
        .map(|variant| FlatRow {
            id: variant.key().id(),
            key: variant.key(),
            name: variant.name.clone(),
            values: attributes
                .iter()
                .filter_map(|attribute| {
                    variant.value_of(&attribute.slug).map(|value| {
                        (
                            attribute.name.clone(),
                            attribute.display_name_of(value).to_string(),
                        )
                    })
                })
                .collect(),
            price: variant.price,
            stock: variant.stock,
            weight: variant.weight,
            sku: variant.sku.clone(),
        })
        .collect()
}

/// The cell currently being edited
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEdit {
    pub row: usize,
    pub col: usize,
    pub field: VariantField,
    pub key: VariantKey,
    pub buffer: String,
    /// Value the buffer was seeded with
    pub original: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellState {
    #[default]
    Idle,
    Editing(ActiveEdit),
}

/// Outcome of a successful commit-and-advance
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    pub mutation: Mutation,
    /// Cell now being edited, if any bound cell followed
    pub next: Option<(usize, usize)>,
}

/// Single-cell editor over a `MatrixView`
#[derive(Debug, Default)]
pub struct MatrixEditor {
    state: CellState,
}

impl MatrixEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CellState {
        &self.state
    }

    pub fn active(&self) -> Option<&ActiveEdit> {
        match &self.state {
            CellState::Editing(edit) => Some(edit),
            CellState::Idle => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, CellState::Editing(_))
    }

    /// Start editing a bound cell, seeding the buffer with its value.
    ///
    /// Any edit already in progress is discarded. On error the state is left
    /// as it was.
    pub fn begin(&mut self, view: &MatrixView, row: usize, col: usize) -> Result<&ActiveEdit, MatrixError> {
        let binding = view
            .cell(row, col)?
            .ok_or(MatrixError::UnboundCell { row, col })?;

        if let CellState::Editing(previous) = &self.state {
            debug!(row = previous.row, col = previous.col, "Discarding unfinished cell edit");
        }

        self.state = CellState::Editing(ActiveEdit {
            row,
            col,
            field: view.field,
            key: binding.key.clone(),
            buffer: binding.value.normalize().to_string(),
            original: binding.value,
        });

        self.active().ok_or(MatrixError::NotEditing)
    }

    /// Replace the edit buffer
    pub fn input(&mut self, text: impl Into<String>) -> Result<(), MatrixError> {
        match &mut self.state {
            CellState::Editing(edit) => {
                edit.buffer = text.into();
                Ok(())
            }
            CellState::Idle => Err(MatrixError::NotEditing),
        }
    }

    /// Parse the buffer into a mutation without leaving `Editing`
    pub fn prepare_commit(&self) -> Result<Mutation, MatrixError> {
        let edit = self.active().ok_or(MatrixError::NotEditing)?;
        let value = parse_input(edit.field, &edit.buffer)?;

        Ok(Mutation::SetVariantField {
            key: edit.key.clone(),
            field: edit.field,
            value: Some(value),
        })
    }

    /// Return to `Idle` after a prepared commit was applied
    pub fn finish_commit(&mut self) -> Option<ActiveEdit> {
        match std::mem::take(&mut self.state) {
            CellState::Editing(edit) => Some(edit),
            CellState::Idle => None,
        }
    }

    /// Parse the buffer; on success yield the mutation and go `Idle`.
    ///
    /// A parse failure keeps the editor `Editing` with the buffer intact.
    pub fn commit(&mut self) -> Result<Mutation, MatrixError> {
        let mutation = self.prepare_commit()?;
        self.finish_commit();
        Ok(mutation)
    }

    /// Commit, then begin editing the next bound cell of the same field
    pub fn commit_and_advance(&mut self, view: &MatrixView) -> Result<CommitOutcome, MatrixError> {
        let mutation = self.prepare_commit()?;
        let next = self
            .active()
            .and_then(|edit| view.next_bound(edit.row, edit.col));
        self.finish_commit();

        if let Some((row, col)) = next {
            self.begin(view, row, col)?;
        }

        Ok(CommitOutcome { mutation, next })
    }

    /// Discard the buffer unconditionally
    pub fn cancel(&mut self) -> Option<ActiveEdit> {
        self.finish_commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stonecat_model::Assignment;
    use stonecat_variants::generate;

    fn attributes() -> AttributeSet {
        AttributeSet::from_attributes(vec![
            Attribute::new("Size", "size").with_value("A", "A").with_value("B", "B"),
            Attribute::new("Grade", "grade").with_value("1", "1").with_value("2", "2"),
        ])
    }

    fn view(variants: &[Variant]) -> MatrixView {
        MatrixView::project(&attributes(), variants, VariantField::Price).unwrap()
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input(VariantField::Price, " 500 "), Ok(Decimal::from(500)));
        assert_eq!(parse_input(VariantField::Weight, "1,5"), Ok(Decimal::new(15, 1)));
        assert_eq!(
            parse_input(VariantField::Price, "abc"),
            Err(EditInputError::NotANumber("abc".to_string()))
        );
        assert_eq!(
            parse_input(VariantField::Price, ""),
            Err(EditInputError::NotANumber(String::new()))
        );
        assert_eq!(
            parse_input(VariantField::Price, "-1"),
            Err(EditInputError::Negative(Decimal::from(-1)))
        );
        assert_eq!(
            parse_input(VariantField::Stock, "2.5"),
            Err(EditInputError::NotAnInteger(Decimal::new(25, 1)))
        );
        assert_eq!(parse_input(VariantField::Stock, "12"), Ok(Decimal::from(12)));
    }

    #[test]
    fn test_projection_needs_two_attributes_and_variants() {
        let one = AttributeSet::from_attributes(vec![Attribute::new("Size", "size").with_value("A", "A")]);
        let variants = generate(&one).unwrap();
        assert!(MatrixView::project(&one, &variants, VariantField::Price).is_none());
        assert!(MatrixView::project(&attributes(), &[], VariantField::Price).is_none());
    }

    #[test]
    fn test_projection_binds_cells() {
        let variants = generate(&attributes()).unwrap();
        let view = view(&variants);

        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.columns.len(), 2);
        assert_eq!(view.bound_count(), 4);
        assert_eq!(view.cell(1, 1).unwrap().unwrap().key, variants[3].key());
        assert_eq!(
            view.cell(2, 0),
            Err(MatrixError::CellOutOfRange { row: 2, col: 0 })
        );
    }

    #[test]
    fn test_unbound_cell_renders_placeholder() {
        let variants = generate(&attributes()).unwrap();
        let view = view(&variants[..3]);
        assert_eq!(view.cell(1, 1), Ok(None));
        assert_eq!(view.next_bound(1, 0), None);
    }

    #[test]
    fn test_begin_commit_yields_keyed_mutation() {
        let variants = generate(&attributes()).unwrap();
        let view = view(&variants);
        let mut editor = MatrixEditor::new();

        let edit = editor.begin(&view, 1, 1).unwrap();
        assert_eq!(edit.buffer, "0");

        editor.input("500").unwrap();
        let mutation = editor.commit().unwrap();

        assert_eq!(
            mutation,
            Mutation::SetVariantField {
                key: variants[3].key(),
                field: VariantField::Price,
                value: Some(Decimal::from(500)),
            }
        );
        assert_eq!(editor.state(), &CellState::Idle);
    }

    #[test]
    fn test_bad_input_keeps_editing() {
        let variants = generate(&attributes()).unwrap();
        let view = view(&variants);
        let mut editor = MatrixEditor::new();

        editor.begin(&view, 0, 0).unwrap();
        editor.input("five hundred").unwrap();

        assert!(matches!(
            editor.commit(),
            Err(MatrixError::Input(EditInputError::NotANumber(_)))
        ));
        assert_eq!(editor.active().unwrap().buffer, "five hundred");
    }

    #[test]
    fn test_unbound_begin_stays_idle() {
        let variants = generate(&attributes()).unwrap();
        let view = view(&variants[..3]);
        let mut editor = MatrixEditor::new();

        assert_eq!(
            editor.begin(&view, 1, 1).map(|e| e.row),
            Err(MatrixError::UnboundCell { row: 1, col: 1 })
        );
        assert!(!editor.is_editing());
        assert_eq!(editor.input("1"), Err(MatrixError::NotEditing));
    }

    #[test]
    fn test_commit_and_advance_row_major() {
        let variants = generate(&attributes()).unwrap();
        let view = view(&variants);
        let mut editor = MatrixEditor::new();

        editor.begin(&view, 0, 1).unwrap();
        editor.input("10").unwrap();
        let outcome = editor.commit_and_advance(&view).unwrap();

        assert_eq!(outcome.next, Some((1, 0)));
        let active = editor.active().unwrap();
        assert_eq!((active.row, active.col), (1, 0));

        editor.begin(&view, 1, 1).unwrap();
        let last = editor.commit_and_advance(&view).unwrap();
        assert_eq!(last.next, None);
        assert!(!editor.is_editing());
    }

    #[test]
    fn test_cancel_discards_buffer() {
        let variants = generate(&attributes()).unwrap();
        let view = view(&variants);
        let mut editor = MatrixEditor::new();

        editor.begin(&view, 0, 0).unwrap();
        editor.input("999").unwrap();
        let discarded = editor.cancel().unwrap();

        assert_eq!(discarded.buffer, "999");
        assert!(!editor.is_editing());
    }

    #[test]
    fn test_flat_rows_spell_out_every_attribute() {
        let attributes = AttributeSet::from_attributes(vec![
            Attribute::new("Size", "size").with_value("s", "Small"),
            Attribute::new("Grade", "grade").with_value("1", "First"),
            Attribute::new("Finish", "finish").with_value("p", "Polished"),
        ]);
        let variants = generate(&attributes).unwrap();
        let rows = flat_rows(&attributes, &variants);

        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].values,
            vec![
                ("Size".to_string(), "Small".to_string()),
                ("Grade".to_string(), "First".to_string()),
                ("Finish".to_string(), "Polished".to_string()),
            ]
        );

        let mut partial = Assignment::new();
        partial.insert("finish".to_string(), "p".to_string());
        assert!(variants[0].matches(&partial));
    }
}
