//! Response types returned by `rew` commands and the service API.

use serde::{Deserialize, Serialize};

use crate::entities::AuditEntry;
use crate::enums::{AuditAction, EntityType};

/// One reversed entry inside an [`UndoReport`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UndoneRecord {
    pub entry_id: i64,
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub summary: String,
}

/// Result of a successful `undo` — what was reversed and what was skipped.
///
/// `skipped` carries warnings for create-entries whose record was already
/// gone: their reversal is a no-op but they are still marked undone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UndoReport {
    pub entries_undone: u32,
    pub records_affected: u32,
    pub details: Vec<UndoneRecord>,
    pub skipped: Vec<String>,
}

/// One page of audit history plus the pre-pagination total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryPage {
    pub entries: Vec<AuditEntry>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}
