//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    init::InitArgs, order::OrderCommands, part::PartCommands, proto::ProtoCommands,
    raw::RawCommands, report::ReportCommands, validate::ValidateArgs,
    where_used::WhereUsedArgs,
};
use crate::core::Role;

#[derive(Parser)]
#[command(name = "pws")]
#[command(author, version, about = "Pallet Workshop inventory and costing")]
#[command(
    long_about = "Track raw materials, cut and assembled parts, pallet prototypes and customer orders as plain-text YAML files. Derives how much of each part the stock can support and what every pallet and order costs."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .pws/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Act as this role; encargado does not see prices
    #[arg(long, global = true, env = "PWS_ROLE")]
    pub role: Option<Role>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new workshop project
    Init(InitArgs),

    /// Raw materials (boards, posts, nails, fiber)
    #[command(subcommand)]
    Raw(RawCommands),

    /// Composite parts (board types, block types, skids)
    #[command(subcommand)]
    Part(PartCommands),

    /// Pallet prototypes and their bills of materials
    #[command(subcommand, alias = "prototype")]
    Proto(ProtoCommands),

    /// Customer orders
    #[command(subcommand)]
    Order(OrderCommands),

    /// Find what references an entity
    WhereUsed(WhereUsedArgs),

    /// Re-check every entity file and invariant
    Validate(ValidateArgs),

    /// Workshop reports
    #[command(subcommand)]
    Report(ReportCommands),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl OutputFormat {
    /// Replace `Auto` with the command's natural format
    pub fn or(self, fallback: OutputFormat) -> OutputFormat {
        match self {
            OutputFormat::Auto => fallback,
            f => f,
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <OutputFormat as ValueEnum>::from_str(s, true)
    }
}
