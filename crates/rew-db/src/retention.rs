//! Retention policy — bounds the audit trail.
//!
//! Runs after every append, inside the append's transaction. Evicts
//! oldest-first until the count is back at the limit, always removing
//! whole batches so a surviving batch can still undo atomically. Evicted
//! entries are gone for good and become permanently un-undoable.

use crate::error::DatabaseError;
use crate::service::RewindService;

async fn count_entries(conn: &libsql::Connection) -> Result<u64, DatabaseError> {
    let mut rows = conn.query("SELECT COUNT(*) FROM audit_trail", ()).await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(u64::try_from(row.get::<i64>(0)?).unwrap_or_default())
}

async fn newest_entry_id(conn: &libsql::Connection) -> Result<Option<i64>, DatabaseError> {
    let mut rows = conn
        .query("SELECT MAX(id) FROM audit_trail", ())
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<Option<i64>>(0)?)
}

/// The oldest entry's id and batch id, if the trail is non-empty.
async fn oldest_entry(
    conn: &libsql::Connection,
) -> Result<Option<(i64, Option<i64>)>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT id, batch_id FROM audit_trail ORDER BY id ASC LIMIT 1",
            (),
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some((row.get::<i64>(0)?, row.get::<Option<i64>>(1)?))),
        None => Ok(None),
    }
}

/// Evict oldest entries (whole batches at a time) until the trail is back
/// within `max_entries`. Returns how many entries were evicted.
///
/// The group containing the newest entry is never evicted — a fresh
/// batch larger than the window must not remove itself mid-append.
pub(crate) async fn enforce(
    conn: &libsql::Connection,
    max_entries: u32,
) -> Result<u64, DatabaseError> {
    let mut evicted = 0_u64;

    loop {
        let count = count_entries(conn).await?;
        if count <= u64::from(max_entries) {
            break;
        }
        let Some((oldest_id, batch_id)) = oldest_entry(conn).await? else {
            break;
        };
        let newest_id = newest_entry_id(conn).await?.unwrap_or(oldest_id);

        let removed = match batch_id {
            Some(batch_id) => {
                let mut rows = conn
                    .query(
                        "SELECT MAX(id) FROM audit_trail WHERE batch_id = ?1",
                        [batch_id],
                    )
                    .await?;
                let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
                if row.get::<Option<i64>>(0)? == Some(newest_id) {
                    tracing::warn!(
                        count,
                        max_entries,
                        "newest batch exceeds the retention window; leaving it intact"
                    );
                    break;
                }
                let n = conn
                    .execute("DELETE FROM audit_trail WHERE batch_id = ?1", [batch_id])
                    .await?;
                conn.execute("DELETE FROM audit_batches WHERE id = ?1", [batch_id])
                    .await?;
                n
            }
            None => {
                if oldest_id == newest_id {
                    break;
                }
                conn.execute("DELETE FROM audit_trail WHERE id = ?1", [oldest_id])
                    .await?
            }
        };
        evicted += removed;
    }

    if evicted > 0 {
        tracing::debug!(evicted, max_entries, "retention evicted oldest entries");
    }
    Ok(evicted)
}

impl RewindService {
    /// Enforce the retention window outside an append (e.g. after the
    /// limit was lowered in configuration).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a query or delete fails.
    pub async fn enforce_retention(&self) -> Result<u64, DatabaseError> {
        enforce(self.db().conn(), self.max_entries()).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use rew_core::enums::{AuditAction, EntityType};
    use rew_core::snapshot::{FieldValue, ValueSnapshot};

    use crate::error::UndoError;
    use crate::repos::audit::{AuditFilter, NewAuditEntry};
    use crate::test_support::helpers::test_service_with_retention;

    fn delete_entry(i: i64) -> NewAuditEntry {
        NewAuditEntry {
            action: AuditAction::Delete,
            entity_type: EntityType::Transaction,
            entity_id: i,
            before: Some(ValueSnapshot::from_fields([(
                "amount_cents",
                FieldValue::from(i),
            )])),
            after: None,
            summary: format!("Removed transaction {i}"),
            batch_id: None,
        }
    }

    #[tokio::test]
    async fn window_keeps_the_newest_entries() {
        let svc = test_service_with_retention(50).await;

        for i in 0..55_i64 {
            svc.append_audit(delete_entry(i)).await.unwrap();
        }

        let (entries, total) = svc.query_audit(&AuditFilter::default()).await.unwrap();
        assert_eq!(total, 50);
        assert_eq!(entries.len(), 50);
        // Newest first: ids 55 down to 6.
        assert_eq!(entries.first().unwrap().id, 55);
        assert_eq!(entries.last().unwrap().id, 6);
    }

    #[tokio::test]
    async fn eviction_removes_whole_batches() {
        let svc = test_service_with_retention(4).await;

        // A 3-entry batch, then singles pushing the batch past the edge.
        let batch_id = svc.begin_batch().await.unwrap();
        for i in 0..3_i64 {
            let mut entry = delete_entry(i);
            entry.batch_id = Some(batch_id);
            svc.append_audit(entry).await.unwrap();
        }
        svc.append_audit(delete_entry(10)).await.unwrap();

        let (_, total) = svc.query_audit(&AuditFilter::default()).await.unwrap();
        assert_eq!(total, 4, "still within the window");

        // One more single: count hits 5, and the only way down is to
        // drop the whole 3-entry batch — never one member alone.
        svc.append_audit(delete_entry(11)).await.unwrap();

        let (entries, total) = svc.query_audit(&AuditFilter::default()).await.unwrap();
        assert_eq!(total, 2);
        assert!(entries.iter().all(|e| e.batch_id.is_none()));
    }

    #[tokio::test]
    async fn evicted_entries_are_not_undoable() {
        let svc = test_service_with_retention(2).await;

        let first = svc.append_audit(delete_entry(1)).await.unwrap();
        svc.append_audit(delete_entry(2)).await.unwrap();
        svc.append_audit(delete_entry(3)).await.unwrap();

        assert!(svc.get_audit(first.id).await.unwrap().is_none());
        assert!(matches!(
            svc.undo_by_id(first.id).await,
            Err(UndoError::NotFound(id)) if id == first.id
        ));
    }

    #[tokio::test]
    async fn eviction_ignores_undone_flag() {
        let svc = test_service_with_retention(2).await;

        let first = svc.append_audit(delete_entry(1)).await.unwrap();
        // Not undone, still evicted once it falls out of the window.
        svc.append_audit(delete_entry(2)).await.unwrap();
        svc.append_audit(delete_entry(3)).await.unwrap();
        assert!(svc.get_audit(first.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn oversized_new_batch_is_left_intact() {
        let svc = test_service_with_retention(2).await;

        let batch_id = svc.begin_batch().await.unwrap();
        for i in 0..4_i64 {
            let mut entry = delete_entry(i);
            entry.batch_id = Some(batch_id);
            svc.append_audit(entry).await.unwrap();
        }

        // The batch exceeds the window but contains the newest entry, so
        // it survives whole rather than evicting itself.
        let (_, total) = svc.query_audit(&AuditFilter::default()).await.unwrap();
        assert_eq!(total, 4);
    }
}
