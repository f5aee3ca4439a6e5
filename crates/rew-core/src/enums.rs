//! Action and entity-kind enums for Rewind.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all =
//! "snake_case")]`, which is also the representation stored in SQL.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// The kind of mutation an audit entry records.
///
/// Each action fixes which snapshots the entry must carry:
///
/// ```text
/// create       — before: none, after: some
/// update       — before: some, after: some (distinct)
/// delete       — before: some, after: none
/// bulk_update  — same shape as update, always part of a batch
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    BulkUpdate,
}

impl AuditAction {
    /// Whether entries with this action must carry a `before` snapshot.
    #[must_use]
    pub const fn requires_before(self) -> bool {
        match self {
            Self::Create => false,
            Self::Update | Self::Delete | Self::BulkUpdate => true,
        }
    }

    /// Whether entries with this action must carry an `after` snapshot.
    #[must_use]
    pub const fn requires_after(self) -> bool {
        match self {
            Self::Delete => false,
            Self::Create | Self::Update | Self::BulkUpdate => true,
        }
    }

    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::BulkUpdate => "bulk_update",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// The closed set of record kinds the engine tracks.
///
/// Each kind maps to one table in the record store; the per-kind column
/// layout lives in the store's kind registry, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Transaction,
    Income,
    Expense,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transaction => "transaction",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{AuditAction, EntityType};

    #[test]
    fn action_serializes_snake_case() {
        let json = serde_json::to_string(&AuditAction::BulkUpdate).unwrap();
        assert_eq!(json, "\"bulk_update\"");
        let back: AuditAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AuditAction::BulkUpdate);
    }

    #[test]
    fn action_as_str_matches_serde() {
        for action in [
            AuditAction::Create,
            AuditAction::Update,
            AuditAction::Delete,
            AuditAction::BulkUpdate,
        ] {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }

    #[test]
    fn snapshot_presence_matrix() {
        assert!(!AuditAction::Create.requires_before());
        assert!(AuditAction::Create.requires_after());
        assert!(AuditAction::Update.requires_before());
        assert!(AuditAction::Update.requires_after());
        assert!(AuditAction::Delete.requires_before());
        assert!(!AuditAction::Delete.requires_after());
        assert!(AuditAction::BulkUpdate.requires_before());
        assert!(AuditAction::BulkUpdate.requires_after());
    }

    #[test]
    fn entity_type_as_str_matches_serde() {
        for kind in [
            EntityType::Transaction,
            EntityType::Income,
            EntityType::Expense,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
