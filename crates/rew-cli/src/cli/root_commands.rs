//! Subcommand and argument definitions for `rew`.

use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add a record and log its creation.
    Add(AddArgs),
    /// Change a record's fields and log the update.
    Edit(EditArgs),
    /// Remove a record and log the deletion.
    Rm(RmArgs),
    /// Apply one edit to several records as an atomic batch.
    #[command(name = "bulk-edit")]
    BulkEdit(BulkEditArgs),
    /// Reverse the most recent mutation, or a specific trail entry.
    Undo(UndoArgs),
    /// Browse the audit trail.
    History(HistoryArgs),
    /// Export the audit trail as CSV.
    Export(ExportArgs),
    /// Pending-undo count and trail totals.
    Status,
}

/// Arguments for `rew add`.
#[derive(Clone, Debug, Args)]
pub struct AddArgs {
    /// Record kind: transaction, income, expense
    pub kind: String,
    /// Field assignments, e.g. merchant=Acme amount_cents=1250
    #[arg(required = true)]
    pub fields: Vec<String>,
    /// Trail summary (defaults to a generated one)
    #[arg(long)]
    pub summary: Option<String>,
}

/// Arguments for `rew edit`.
#[derive(Clone, Debug, Args)]
pub struct EditArgs {
    /// Record kind: transaction, income, expense
    pub kind: String,
    /// Record id
    pub id: i64,
    /// Field assignments, e.g. category=Office reviewed=true
    #[arg(required = true)]
    pub fields: Vec<String>,
    /// Trail summary (defaults to a generated one)
    #[arg(long)]
    pub summary: Option<String>,
}

/// Arguments for `rew rm`.
#[derive(Clone, Debug, Args)]
pub struct RmArgs {
    /// Record kind: transaction, income, expense
    pub kind: String,
    /// Record id
    pub id: i64,
    /// Trail summary (defaults to a generated one)
    #[arg(long)]
    pub summary: Option<String>,
}

/// Arguments for `rew bulk-edit`.
#[derive(Clone, Debug, Args)]
pub struct BulkEditArgs {
    /// Record kind: transaction, income, expense
    pub kind: String,
    /// Record ids, comma separated
    #[arg(long, required = true, value_delimiter = ',')]
    pub ids: Vec<i64>,
    /// Field assignments applied to every record
    #[arg(required = true)]
    pub fields: Vec<String>,
    /// Trail summary (defaults to a generated one)
    #[arg(long)]
    pub summary: Option<String>,
}

/// Arguments for `rew undo`.
#[derive(Clone, Debug, Args)]
pub struct UndoArgs {
    /// Reverse this trail entry (and its batch) instead of the newest
    #[arg(long)]
    pub id: Option<i64>,
}

/// Shared filter arguments for `rew history` and `rew export`.
#[derive(Clone, Debug, Args)]
pub struct FilterArgs {
    /// Only entries for this kind: transaction, income, expense
    #[arg(long)]
    pub entity_type: Option<String>,
    /// Only entries for this record id
    #[arg(long)]
    pub entity_id: Option<i64>,
    /// Only this action: create, update, delete, bulk_update
    #[arg(long)]
    pub action: Option<String>,
    /// Only entries at or after this date (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,
    /// Only entries at or before this date (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<String>,
    /// Case-insensitive substring match against summaries
    #[arg(long)]
    pub contains: Option<String>,
}

/// Arguments for `rew history`.
#[derive(Clone, Debug, Args)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Max entries per page (defaults to general.default_limit)
    #[arg(short, long)]
    pub limit: Option<u32>,
    /// Entries to skip (for paging)
    #[arg(long)]
    pub offset: Option<u32>,
}

/// Arguments for `rew export`.
#[derive(Clone, Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Write to this file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}
