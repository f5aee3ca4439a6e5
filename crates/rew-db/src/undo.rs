//! The undo engine.
//!
//! Reverses the effect of one audit entry — or one whole batch — against
//! the live record store, inside a single transaction. The stale-state
//! comparison is what keeps an out-of-order undo from clobbering changes
//! a later operation made to the same record; with a single serialized
//! actor it is a logical check, not a locking mechanism.

use rew_core::entities::AuditEntry;
use rew_core::enums::AuditAction;
use rew_core::responses::{UndoReport, UndoneRecord};

use crate::error::{DatabaseError, UndoError};
use crate::repos::{audit, records};
use crate::service::RewindService;

/// What reversing one entry did.
enum Outcome {
    Reversed,
    /// The entry was a `Create` whose record is already gone — the
    /// desired end state. Marked undone anyway, with a warning.
    Skipped(String),
}

impl RewindService {
    /// Reverse the newest not-yet-undone entry, or its whole batch.
    ///
    /// # Errors
    ///
    /// `UndoError::NothingToUndo` when the trail holds no undoable entry;
    /// otherwise any of the per-entry failures documented on
    /// [`UndoError`], with no partial effects.
    pub async fn undo_last(&self) -> Result<UndoReport, UndoError> {
        let group = self
            .most_recent_undoable()
            .await
            .map_err(UndoError::Persistence)?
            .ok_or(UndoError::NothingToUndo)?;
        self.undo_group(group).await
    }

    /// Reverse a specific entry by id, or its whole batch.
    ///
    /// Because the target may not be the newest entry, the stale-state
    /// check carries the full weight here: it is the only thing stopping
    /// this from overwriting later, unrelated changes to the record.
    ///
    /// # Errors
    ///
    /// `UndoError::NotFound` if no entry has this id (it may have been
    /// evicted by retention); `UndoError::AlreadyUndone` if the target
    /// group was reversed before; otherwise as [`Self::undo_last`].
    pub async fn undo_by_id(&self, entry_id: i64) -> Result<UndoReport, UndoError> {
        let entry = self
            .get_audit(entry_id)
            .await
            .map_err(UndoError::Persistence)?
            .ok_or(UndoError::NotFound(entry_id))?;

        let group = match entry.batch_id {
            Some(batch_id) => audit::batch_members(self.db().conn(), batch_id)
                .await
                .map_err(UndoError::Persistence)?,
            None => vec![entry],
        };
        if group.iter().any(|e| e.undone) {
            return Err(UndoError::AlreadyUndone(entry_id));
        }
        self.undo_group(group).await
    }

    /// Reverse every entry of a group in reverse append order, then mark
    /// the whole group undone — all inside one transaction.
    ///
    /// Reverse order matters within a batch: if two entries touched the
    /// same record, the later one must unwind first or the earlier one's
    /// stale-state check would reject its own batch. Any failure drops
    /// the transaction, rolling back every reversal already applied.
    async fn undo_group(&self, mut group: Vec<AuditEntry>) -> Result<UndoReport, UndoError> {
        group.sort_by_key(|e| std::cmp::Reverse(e.id));

        let tx = self.db().conn().transaction().await?;
        let mut details = Vec::new();
        let mut skipped = Vec::new();
        let mut records_affected = 0_u32;

        for entry in &group {
            match reverse_entry(&tx, entry).await? {
                Outcome::Reversed => {
                    records_affected += 1;
                    details.push(UndoneRecord {
                        entry_id: entry.id,
                        action: entry.action,
                        entity_type: entry.entity_type,
                        entity_id: entry.entity_id,
                        summary: describe_reversal(entry),
                    });
                }
                Outcome::Skipped(reason) => {
                    tracing::warn!(entry = entry.id, "{reason}");
                    skipped.push(reason);
                }
            }
        }

        let ids: Vec<i64> = group.iter().map(|e| e.id).collect();
        audit::mark_undone(&tx, &ids)
            .await
            .map_err(UndoError::Persistence)?;
        tx.commit().await?;

        tracing::info!(
            entries = ids.len(),
            records_affected,
            "reversed audit group"
        );
        Ok(UndoReport {
            entries_undone: ids.len() as u32,
            records_affected,
            details,
            skipped,
        })
    }
}

fn describe_reversal(entry: &AuditEntry) -> String {
    let kind = entry.entity_type;
    let id = entry.entity_id;
    match entry.action {
        AuditAction::Create => format!("{kind} {id} deleted (creation reversed)"),
        AuditAction::Update | AuditAction::BulkUpdate => {
            format!("{kind} {id} restored to its prior values")
        }
        AuditAction::Delete => format!("{kind} {id} re-created"),
    }
}

async fn reverse_entry(
    conn: &libsql::Connection,
    entry: &AuditEntry,
) -> Result<Outcome, UndoError> {
    let kind = entry.entity_type;
    let id = entry.entity_id;
    // Stored entries passed shape validation at append; a missing
    // snapshot here means the trail itself is corrupt.
    let corrupt = |which: &str| {
        UndoError::Persistence(DatabaseError::InvalidState(format!(
            "audit entry {} is missing its '{which}' snapshot",
            entry.id
        )))
    };

    match entry.action {
        AuditAction::Create => {
            let after = entry.after.as_ref().ok_or_else(|| corrupt("after"))?;
            let Some(current) = records::fetch_snapshot(conn, kind, id)
                .await
                .map_err(UndoError::Persistence)?
            else {
                return Ok(Outcome::Skipped(format!(
                    "{kind} {id} was already deleted; entry {} marked undone without changes",
                    entry.id
                )));
            };
            if current != *after {
                return Err(UndoError::StaleState {
                    entry_id: entry.id,
                    entity_type: kind,
                    entity_id: id,
                });
            }
            records::delete_row(conn, kind, id)
                .await
                .map_err(UndoError::Persistence)?;
            Ok(Outcome::Reversed)
        }
        AuditAction::Update | AuditAction::BulkUpdate => {
            let before = entry.before.as_ref().ok_or_else(|| corrupt("before"))?;
            let after = entry.after.as_ref().ok_or_else(|| corrupt("after"))?;
            let Some(current) = records::fetch_snapshot(conn, kind, id)
                .await
                .map_err(UndoError::Persistence)?
            else {
                return Err(UndoError::RecordAlreadyGone {
                    entry_id: entry.id,
                    entity_type: kind,
                    entity_id: id,
                });
            };
            if current != *after {
                return Err(UndoError::StaleState {
                    entry_id: entry.id,
                    entity_type: kind,
                    entity_id: id,
                });
            }
            records::apply_snapshot(conn, kind, id, before)
                .await
                .map_err(UndoError::Persistence)?;
            Ok(Outcome::Reversed)
        }
        AuditAction::Delete => {
            let before = entry.before.as_ref().ok_or_else(|| corrupt("before"))?;
            if records::fetch_snapshot(conn, kind, id)
                .await
                .map_err(UndoError::Persistence)?
                .is_some()
            {
                return Err(UndoError::RecordAlreadyExists {
                    entry_id: entry.id,
                    entity_type: kind,
                    entity_id: id,
                });
            }
            let inserted = records::insert_with_id(conn, kind, id, before)
                .await
                .map_err(UndoError::Persistence)?;
            if !inserted {
                return Err(UndoError::IdentityNotRecoverable {
                    entry_id: entry.id,
                    entity_type: kind,
                    entity_id: id,
                    restored: before.clone(),
                });
            }
            Ok(Outcome::Reversed)
        }
    }
}
