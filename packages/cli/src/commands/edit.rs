use crate::commands::matrix::open_session;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use stonecat_editor::{parse_input, EditSession, Mutation};
use stonecat_model::{Assignment, VariantField};
use stonecat_variants::{TemplateId, VariantIndex};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Product JSON file to edit
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Replace the attribute set with a template first
    #[arg(short, long)]
    pub template: Option<TemplateId>,

    /// Rebuild all variants from the attribute set (resets prices)
    #[arg(long)]
    pub regenerate: bool,

    /// Edit a matrix cell: "ROW,COL:FIELD=VALUE" (zero-based)
    #[arg(long, value_name = "CELL")]
    pub cell: Vec<CellEdit>,

    /// Edit the first variant matching a partial tuple: "slug=value,...:FIELD=VALUE"
    #[arg(long, value_name = "EDIT")]
    pub set: Vec<TupleEdit>,

    /// Write the save payload here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Error, Debug, PartialEq)]
pub enum EditArgError {
    #[error("Expected '<target>:<field>=<value>', got '{0}'")]
    Shape(String),

    #[error("Expected 'ROW,COL', got '{0}'")]
    Cell(String),

    #[error("Expected 'slug=value' pairs, got '{0}'")]
    Tuple(String),

    #[error("{0}")]
    Field(String),
}

fn split_edit(arg: &str) -> Result<(&str, VariantField, &str), EditArgError> {
    let (target, assignment) = arg
        .split_once(':')
        .ok_or_else(|| EditArgError::Shape(arg.to_string()))?;
    let (field, value) = assignment
        .split_once('=')
        .ok_or_else(|| EditArgError::Shape(arg.to_string()))?;
    let field = VariantField::from_str(field.trim()).map_err(EditArgError::Field)?;
    Ok((target, field, value))
}

/// `--cell` argument
#[derive(Debug, Clone, PartialEq)]
pub struct CellEdit {
    pub row: usize,
    pub col: usize,
    pub field: VariantField,
    pub value: String,
}

impl FromStr for CellEdit {
    type Err = EditArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, field, value) = split_edit(s)?;
        let (row, col) = target
            .split_once(',')
            .and_then(|(r, c)| Some((r.trim().parse().ok()?, c.trim().parse().ok()?)))
            .ok_or_else(|| EditArgError::Cell(target.to_string()))?;
        Ok(Self {
            row,
            col,
            field,
            value: value.to_string(),
        })
    }
}

/// `--set` argument
#[derive(Debug, Clone, PartialEq)]
pub struct TupleEdit {
    pub partial: Assignment,
    pub field: VariantField,
    pub value: String,
}

impl FromStr for TupleEdit {
    type Err = EditArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, field, value) = split_edit(s)?;
        let mut partial = Assignment::new();
        for pair in target.split(',').filter(|p| !p.trim().is_empty()) {
            let (slug, value) = pair
                .split_once('=')
                .ok_or_else(|| EditArgError::Tuple(target.to_string()))?;
            partial.insert(slug.trim().to_string(), value.trim().to_string());
        }
        if partial.is_empty() {
            return Err(EditArgError::Tuple(target.to_string()));
        }
        Ok(Self {
            partial,
            field,
            value: value.to_string(),
        })
    }
}

fn apply_cell(session: &mut EditSession, edit: &CellEdit) -> Result<()> {
    session.begin_edit(edit.row, edit.col, edit.field)?;
    session.input(edit.value.clone())?;
    if let Err(err) = session.commit() {
        session.cancel_edit();
        return Err(err.into());
    }
    info!(row = edit.row, col = edit.col, field = %edit.field, "Cell committed");
    Ok(())
}

fn apply_tuple(session: &mut EditSession, edit: &TupleEdit) -> Result<()> {
    let variants = &session.form().variants;
    let position = VariantIndex::resolve(variants, &edit.partial)
        .ok_or_else(|| anyhow!("No variant matches {:?}", edit.partial))?;
    let key = variants[position].key();
    let value = parse_input(edit.field, &edit.value)?;

    session.apply(Mutation::SetVariantField {
        key: key.clone(),
        field: edit.field,
        value: Some(value),
    })?;
    info!(variant = %key, field = %edit.field, %value, "Variant updated");
    Ok(())
}

pub fn edit(args: EditArgs, config: &Config) -> Result<()> {
    let stdout = std::io::stdout();
    run_edit(args, config, &mut stdout.lock())
}

/// Apply the requested edits and write the save payload.
///
/// Progress goes to stderr so that `out` only ever receives the JSON payload.
fn run_edit(args: EditArgs, config: &Config, out: &mut dyn Write) -> Result<()> {
    let mut session = open_session(args.input.as_ref(), args.template, config.product_type, config)?;

    if args.regenerate {
        let result = session.regenerate()?;
        eprintln!("  {} Regenerated {} variants", "✓".green(), result.variant_count);
    }

    for cell in &args.cell {
        apply_cell(&mut session, cell)?;
        eprintln!("  {} Cell ({}, {}) {} = {}", "✓".green(), cell.row, cell.col, cell.field, cell.value);
    }

    for set in &args.set {
        apply_tuple(&mut session, set)?;
        eprintln!("  {} {:?} {} = {}", "✓".green(), set.partial, set.field, set.value);
    }

    let (ticket, payload) = session.begin_save()?;
    let json = payload.to_json_pretty()?;

    let written = match &args.output {
        Some(path) => fs::write(path, &json).map(|_| Some(path)),
        None => writeln!(out, "{}", json).map(|_| None),
    };

    match written {
        Ok(path) => {
            session.finish_save(&ticket, Ok(()))?;
            if let Some(path) = path {
                eprintln!("  {} Wrote {}", "✓".green(), path.display());
            }
            Ok(())
        }
        Err(err) => {
            session.finish_save(&ticket, Err(err.to_string()))?;
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_edit() {
        let edit: CellEdit = "1, 2:price=500".parse().unwrap();
        assert_eq!(
            edit,
            CellEdit {
                row: 1,
                col: 2,
                field: VariantField::Price,
                value: "500".to_string(),
            }
        );
        assert!(matches!("1:price=5".parse::<CellEdit>(), Err(EditArgError::Cell(_))));
        assert!(matches!("1,1:colour=5".parse::<CellEdit>(), Err(EditArgError::Field(_))));
    }

    #[test]
    fn test_parse_tuple_edit() {
        let edit: TupleEdit = "size=B,grade=2:stock=3".parse().unwrap();
        assert_eq!(edit.partial.get("grade").map(String::as_str), Some("2"));
        assert_eq!(edit.field, VariantField::Stock);
        assert!(matches!("size:stock=3".parse::<TupleEdit>(), Err(EditArgError::Tuple(_))));
        assert!(matches!("size=B".parse::<TupleEdit>(), Err(EditArgError::Shape(_))));
    }

    const PRODUCT: &str = r#"{
        "slug": "plita",
        "name": "Plita",
        "categoryId": 4,
        "productType": "MATRIX",
        "attributes": [
            { "name": "Size", "slug": "size", "values": [
                { "value": "A", "displayName": "A" }, { "value": "B", "displayName": "B" }
            ] },
            { "name": "Grade", "slug": "grade", "values": [
                { "value": "1", "displayName": "1" }, { "value": "2", "displayName": "2" }
            ] }
        ]
    }"#;

    fn args(dir: &tempfile::TempDir) -> EditArgs {
        let input = dir.path().join("product.json");
        fs::write(&input, PRODUCT).unwrap();
        EditArgs {
            input: Some(input),
            template: None,
            regenerate: true,
            cell: vec!["0,1:price=750".parse().unwrap()],
            set: vec![],
            output: None,
        }
    }

    #[test]
    fn test_stdout_carries_only_the_payload() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut out = Vec::new();
        run_edit(args(&dir), &Config::default(), &mut out).unwrap();

        let payload: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(payload["variants"].as_array().map(Vec::len), Some(4));
        assert_eq!(payload["variants"][1]["price"], serde_json::json!(750.0));
    }

    #[test]
    fn test_payload_written_to_output_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("payload.json");
        let mut out = Vec::new();

        let mut edit_args = args(&dir);
        edit_args.output = Some(path.clone());
        run_edit(edit_args, &Config::default(), &mut out).unwrap();

        assert!(out.is_empty());
        let payload: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(payload["attributes"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_apply_edits_to_template_session() {
        let config = Config::default();
        let mut session = open_session(None, Some(TemplateId::PlitaMramornaya), config.product_type, &config).unwrap();

        apply_cell(&mut session, &"1,1:price=500".parse().unwrap()).unwrap();
        assert_eq!(session.form().variants[3].price, stonecat_model::Decimal::from(500));

        let first = session.form().variants[0].clone();
        let partial = first
            .assignment
            .iter()
            .take(1)
            .map(|(s, v)| format!("{}={}", s, v))
            .collect::<Vec<_>>()
            .join(",");
        apply_tuple(&mut session, &format!("{}:stock=7", partial).parse().unwrap()).unwrap();
        assert_eq!(session.form().variants[0].stock, 7);

        assert!(apply_cell(&mut session, &"0,0:price=abc".parse().unwrap()).is_err());
        assert!(!session.editor().is_editing());
    }
}
