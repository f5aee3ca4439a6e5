use clap::{Parser, ValueEnum};

pub mod root_commands;

pub use root_commands::Commands;

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

/// Top-level CLI parser for the `rew` binary.
#[derive(Debug, Parser)]
#[command(name = "rew", version, about = "Rewind - ledger change tracking and undo")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table
    #[arg(short, long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database file (defaults to storage.db_path from config)
    #[arg(long, global = true)]
    pub db: Option<String>,
}
