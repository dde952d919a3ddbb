//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    asset::AssetCommands, audit::AuditCommands, calendar::CalendarCommands,
    completions::CompletionsArgs, dashboard::DashboardArgs, file::FileCommands,
    init::InitArgs, mail::MailCommands, supplier::SupplierCommands, task::TaskCommands,
};

#[derive(Parser)]
#[command(name = "srp")]
#[command(author, version, about = "Zenova supplier relationship portal")]
#[command(long_about = "Manage suppliers, assets, projects, audits, shared files, messages and events stored as plain CSV tables.")]
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

    /// Enable verbose (debug) logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Data directory (default: auto-detect by finding data/config.yaml)
    #[arg(long, global = true, env = "SRP_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Role to act as (OEM, Supplier A, Supplier B, Auditor)
    #[arg(long, global = true, env = "SRP_ROLE")]
    pub role: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a workspace and its tables
    Init(InitArgs),

    /// Supplier records
    #[command(subcommand, visible_alias = "sup")]
    Supplier(SupplierCommands),

    /// Asset management
    #[command(subcommand)]
    Asset(AssetCommands),

    /// Project and ESG task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Audit points
    #[command(subcommand)]
    Audit(AuditCommands),

    /// Shared files and comments
    #[command(subcommand)]
    File(FileCommands),

    /// Role-to-role messages
    #[command(subcommand)]
    Mail(MailCommands),

    /// Shared calendar
    #[command(subcommand, visible_alias = "cal")]
    Calendar(CalendarCommands),

    /// OEM performance dashboard
    Dashboard(DashboardArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table on a terminal; the configured default_format if set
    #[default]
    Auto,
    /// Aligned table
    Table,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
