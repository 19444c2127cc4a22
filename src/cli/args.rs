//! Command-line arguments

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::config::ConfigCommands;
use crate::cli::commands::measure::MeasureCommands;
use crate::cli::commands::product::ProductCommands;
use crate::cli::commands::proforma::ProformaCommands;

#[derive(Parser, Debug)]
#[command(name = "ferre")]
#[command(version)]
#[command(about = "Hardware store catalog and proforma client")]
#[command(
    long_about = "Manage the store's product catalog and sales proformas against the ferre REST API.\n\n\
    Lists are paginated and cached for the lifetime of a command; every successful\n\
    write discards the cached reads of its entity so the next read is fresh."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Base URL of the API (overrides config)
    #[arg(long, global = true, env = "FERRE_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "auto")]
    pub output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage catalog products
    #[command(subcommand)]
    Product(ProductCommands),

    /// Create and export proformas (sales quotations)
    #[command(subcommand)]
    Proforma(ProformaCommands),

    /// Units of measure
    #[command(subcommand)]
    Measure(MeasureCommands),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for list and show commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table for lists, pretty details for show
    Auto,
    /// Boxed table
    Table,
    /// Tab-separated values
    Tsv,
    /// Comma-separated values
    Csv,
    /// Markdown table
    Md,
    Json,
    Yaml,
    /// Identifiers only, one per line
    Id,
}
