//! Error types for rew-db.

use rew_core::enums::{AuditAction, EntityType};
use rew_core::snapshot::ValueSnapshot;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in the database).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors from logging mutations and reversing them.
///
/// The recoverable variants (`RecordAlreadyGone`, `RecordAlreadyExists`,
/// `StaleState`, `IdentityNotRecoverable`) abort the specific undo
/// attempt — the whole batch, if the target is one — but leave every
/// record in its prior state. Each names the blocking entry and entity so
/// the caller can present the concrete reason, never a generic failure.
#[derive(Debug, Error)]
pub enum UndoError {
    /// The caller violated the before/after presence invariant for the
    /// given action. A programming error, not user-recoverable.
    #[error("Invalid entry shape for '{action}': {reason}")]
    InvalidEntryShape { action: AuditAction, reason: String },

    /// No entry is eligible for "undo last".
    #[error("Nothing to undo")]
    NothingToUndo,

    /// No entry with this id exists (it may have been evicted).
    #[error("Audit entry {0} not found")]
    NotFound(i64),

    /// The target entry (or a member of its batch) was already reversed.
    #[error("Audit entry {0} has already been undone")]
    AlreadyUndone(i64),

    /// The record an update entry refers to no longer exists.
    #[error("Cannot undo entry {entry_id}: {entity_type} {entity_id} no longer exists")]
    RecordAlreadyGone {
        entry_id: i64,
        entity_type: EntityType,
        entity_id: i64,
    },

    /// A record already sits at the id a delete entry would restore.
    #[error("Cannot undo entry {entry_id}: a {entity_type} with id {entity_id} already exists")]
    RecordAlreadyExists {
        entry_id: i64,
        entity_type: EntityType,
        entity_id: i64,
    },

    /// The record changed after this entry was logged; reversing would
    /// silently discard the later change.
    #[error(
        "Cannot undo entry {entry_id}: {entity_type} {entity_id} was modified by a later operation"
    )]
    StaleState {
        entry_id: i64,
        entity_type: EntityType,
        entity_id: i64,
    },

    /// The store cannot re-insert this kind at a fixed id. Carries the
    /// restored values so the caller can offer manual re-entry.
    #[error(
        "Cannot undo entry {entry_id}: the store cannot re-insert a {entity_type} at id {entity_id}"
    )]
    IdentityNotRecoverable {
        entry_id: i64,
        entity_type: EntityType,
        entity_id: i64,
        restored: ValueSnapshot,
    },

    /// Underlying storage write failed; the enclosing transaction was
    /// rolled back.
    #[error(transparent)]
    Persistence(#[from] DatabaseError),
}

impl From<libsql::Error> for UndoError {
    fn from(e: libsql::Error) -> Self {
        Self::Persistence(DatabaseError::LibSql(e))
    }
}
