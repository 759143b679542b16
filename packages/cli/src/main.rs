mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{edit, init, matrix, templates, EditArgs, InitArgs, MatrixArgs, TemplatesArgs};
use config::Config;
use tracing_subscriber::EnvFilter;

/// Stonecat CLI - attribute matrices and variant pricing for stone products
#[derive(Parser, Debug)]
#[command(name = "stonecat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default stonecat.config.json
    Init(InitArgs),

    /// List attribute templates
    Templates(TemplatesArgs),

    /// Render price/stock/weight matrices
    Matrix(MatrixArgs),

    /// Apply edits to a product and emit the save payload
    Edit(EditArgs),
}

fn main() {
    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let config = Config::load(&cwd);

    let log_level = config
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Templates(args) => config.and_then(|config| templates(args, &config)),
        Command::Matrix(args) => config.and_then(|config| matrix(args, &config)),
        Command::Edit(args) => config.and_then(|config| edit(args, &config)),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
