use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use stonecat_editor::{Document, EditSession, FlatRow, MatrixView, ProductForm, SessionOptions};
use stonecat_model::{ProductMeta, ProductType, VariantField};
use stonecat_variants::TemplateId;

#[derive(Debug, Args)]
pub struct MatrixArgs {
    /// Product JSON file to render
    #[arg(short, long, conflicts_with = "template")]
    pub input: Option<PathBuf>,

    /// Render a fresh matrix from a template instead
    #[arg(short, long)]
    pub template: Option<TemplateId>,

    /// Fields to render (price, stock, weight); defaults to config `fields`
    #[arg(short, long)]
    pub field: Vec<VariantField>,

    /// Also print the flat variant list
    #[arg(long)]
    pub flat: bool,
}

/// Open a session over a product file or a fresh template form
pub fn open_session(
    input: Option<&PathBuf>,
    template: Option<TemplateId>,
    product_type: ProductType,
    config: &Config,
) -> Result<EditSession> {
    let options = SessionOptions {
        undo_levels: config.undo_levels,
    };

    match (input, template) {
        (Some(path), template) => {
            let doc = Document::load(path)?;
            let mut session = EditSession::with_options(path.display().to_string(), doc, options);
            if let Some(template) = template {
                session.apply_template(template)?;
            }
            Ok(session)
        }
        (None, Some(template)) => {
            let doc = Document::new(ProductForm {
                meta: ProductMeta {
                    product_type,
                    ..ProductMeta::default()
                },
                ..ProductForm::default()
            });
            let mut session = EditSession::with_options(template.as_str(), doc, options);
            session.apply_template(template)?;
            Ok(session)
        }
        (None, None) => Err(anyhow!("Pass --input <product.json> or --template <id>")),
    }
}

pub fn matrix(args: MatrixArgs, config: &Config) -> Result<()> {
    // A template rendered on its own is always shown as a matrix product
    let session = open_session(args.input.as_ref(), args.template, ProductType::Matrix, config)?;

    let fields = if args.field.is_empty() {
        config.fields.clone()
    } else {
        args.field
    };

    let form = session.form();
    println!(
        "{} {} attributes, {} variants",
        "🧮".bright_blue(),
        form.attributes.len(),
        form.variants.len()
    );

    for field in fields {
        println!();
        match session.matrix(field) {
            Ok(view) => print!("{}", render_matrix(&view, field_unit(field, config))),
            Err(err) => println!("{} {}", "⚠️".yellow(), err),
        }
    }

    if args.flat {
        println!();
        print!("{}", render_flat(&session.flat_list(), &config.currency));
    }

    Ok(())
}

fn field_unit(field: VariantField, config: &Config) -> &str {
    match field {
        VariantField::Price => &config.currency,
        VariantField::Stock => "pcs",
        VariantField::Weight => "kg",
    }
}

/// Render a matrix as a plain text table; unbound cells show as `—`
pub fn render_matrix(view: &MatrixView, unit: &str) -> String {
    let corner = format!("{} \\ {} ({}, {})", view.rows.name, view.columns.name, view.field, unit);

    let header: Vec<String> = view.columns.labels.iter().map(|l| l.display_name.clone()).collect();
    let body: Vec<(String, Vec<String>)> = view
        .rows
        .labels
        .iter()
        .zip(view.grid())
        .map(|(label, cells)| {
            let cells = cells
                .iter()
                .map(|cell| match cell {
                    Some(binding) => binding.value.normalize().to_string(),
                    None => "—".to_string(),
                })
                .collect();
            (label.display_name.clone(), cells)
        })
        .collect();

    let first_width = body
        .iter()
        .map(|(label, _)| label.chars().count())
        .chain(std::iter::once(corner.chars().count()))
        .max()
        .unwrap_or(0);
    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            body.iter()
                .map(|(_, cells)| cells[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&pad(&corner, first_width));
    for (h, w) in header.iter().zip(&widths) {
        out.push_str(" │ ");
        out.push_str(&pad(h, *w));
    }
    out.push('\n');

    for (label, cells) in &body {
        out.push_str(&pad(label, first_width));
        for (cell, w) in cells.iter().zip(&widths) {
            out.push_str(" │ ");
            out.push_str(&pad(cell, *w));
        }
        out.push('\n');
    }

    out
}

/// Render every variant with its full tuple
pub fn render_flat(rows: &[FlatRow], currency: &str) -> String {
    let mut out = String::new();
    for row in rows {
        let tuple: Vec<String> = row.values.iter().map(|(name, value)| format!("{}: {}", name, value)).collect();
        out.push_str(&format!(
            "{} {}  [{}]  {} {}  stock {}",
            format!("#{}", row.id).as_str().dimmed(),
            row.name,
            tuple.join(", "),
            row.price.normalize(),
            currency,
            row.stock
        ));
        if let Some(weight) = row.weight {
            out.push_str(&format!("  weight {}", weight.normalize()));
        }
        if let Some(sku) = &row.sku {
            out.push_str(&format!("  sku {}", sku));
        }
        out.push('\n');
    }
    out
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}
