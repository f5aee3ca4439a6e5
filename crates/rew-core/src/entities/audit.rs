use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{AuditAction, EntityType};
use crate::snapshot::ValueSnapshot;

/// An append-only audit trail entry recording one mutation.
///
/// `id` is assigned at append time, strictly increasing and never reused;
/// it is the sole undo ordering key (`timestamp` is advisory). After a
/// successful reversal the only field that ever changes is `undone` — the
/// entry itself stays in the trail until retention evicts it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub before: Option<ValueSnapshot>,
    pub after: Option<ValueSnapshot>,
    pub summary: String,
    /// Entries sharing a batch id came from one logical multi-record
    /// operation and are reversed (and evicted) together.
    pub batch_id: Option<i64>,
    pub undone: bool,
}

impl AuditEntry {
    /// Whether this entry's snapshots satisfy the presence invariant for
    /// its action. Stored entries always do; rows that fail this check
    /// indicate corrupted storage.
    #[must_use]
    pub const fn shape_is_valid(&self) -> bool {
        self.before.is_some() == self.action.requires_before()
            && self.after.is_some() == self.action.requires_after()
    }
}
