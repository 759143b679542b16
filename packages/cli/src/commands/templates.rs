use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use stonecat_model::ProductType;
use stonecat_variants::{AttributeTemplate, TemplateId};

#[derive(Debug, Args)]
pub struct TemplatesArgs {
    /// Only templates that suit this product type (simple, single-variant, matrix, range, configurable)
    #[arg(short = 't', long)]
    pub product_type: Option<ProductType>,

    /// List every template regardless of product type
    #[arg(short, long)]
    pub all: bool,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TemplateSummary<'a> {
    id: TemplateId,
    name: &'a str,
    description: &'a str,
    category: &'a str,
    attributes: Vec<AttributeSummary<'a>>,
    combinations: usize,
}

#[derive(Debug, Serialize)]
struct AttributeSummary<'a> {
    name: &'a str,
    slug: &'a str,
    values: Vec<&'a str>,
}

fn summarize(template: &AttributeTemplate) -> TemplateSummary<'_> {
    TemplateSummary {
        id: template.id,
        name: template.name,
        description: template.description,
        category: template.category,
        attributes: template
            .attributes
            .iter()
            .map(|a| AttributeSummary {
                name: a.name,
                slug: a.slug,
                values: a.values.iter().map(|(_, display)| *display).collect(),
            })
            .collect(),
        combinations: template.combination_count(),
    }
}

pub fn templates(args: TemplatesArgs, config: &Config) -> Result<()> {
    let selected: Vec<&'static AttributeTemplate> = if args.all {
        TemplateId::ALL.iter().map(|id| id.template()).collect()
    } else {
        TemplateId::for_product_type(args.product_type.unwrap_or(config.product_type))
    };

    if args.json {
        let summaries: Vec<_> = selected.iter().map(|t| summarize(t)).collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if selected.is_empty() {
        println!("{}", "⚠️  No templates fit this product type".yellow());
        return Ok(());
    }

    println!("{}", "📋 Attribute templates".bright_blue().bold());
    for template in selected {
        println!();
        println!(
            "  {} {}  {}",
            template.id.as_str().bright_white().bold(),
            template.name,
            format!("[{}]", template.category).as_str().dimmed()
        );
        println!("    {}", template.description.dimmed());
        for attribute in template.attributes {
            let values: Vec<_> = attribute.values.iter().map(|(_, display)| *display).collect();
            println!(
                "    {} {} ({}): {}",
                "•".cyan(),
                attribute.name,
                attribute.slug,
                values.join(", ")
            );
        }
        println!(
            "    {} {} variants",
            "→".green(),
            template.combination_count()
        );
    }

    Ok(())
}
