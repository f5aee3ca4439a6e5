//! Audit trail repository.
//!
//! Append-only audit entries recording every mutation, with dynamic
//! filtering, batch grouping, and the undo-eligibility query. Entries are
//! value types owned by the trail; the record store never sees them.

use chrono::{DateTime, Utc};

use rew_core::entities::AuditEntry;
use rew_core::enums::{AuditAction, EntityType};
use rew_core::snapshot::ValueSnapshot;

use crate::error::{DatabaseError, UndoError};
use crate::helpers::{
    get_opt_string, parse_datetime, parse_enum, parse_optional_snapshot, snapshot_to_json,
};
use crate::retention;
use crate::service::RewindService;

/// Column list shared by every SELECT that feeds [`row_to_entry`].
pub(crate) const ENTRY_COLUMNS: &str = "id, timestamp, action, entity_type, entity_id, \
     before_values, after_values, summary, batch_id, undone";

/// Filter criteria for audit queries. Filters apply conjunctively.
#[derive(Debug, Default, Clone)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<i64>,
    pub action: Option<AuditAction>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    /// Case-insensitive substring match against `summary`.
    pub text: Option<String>,
    /// `None` means unlimited (used by the exporter).
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// A mutation to be appended. The log assigns `id` and `timestamp`; the
/// caller must have flushed the record mutation first so `entity_id` is
/// known (this is what makes `Create` entries loggable at all).
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub before: Option<ValueSnapshot>,
    pub after: Option<ValueSnapshot>,
    pub summary: String,
    pub batch_id: Option<i64>,
}

pub(crate) fn row_to_entry(row: &libsql::Row) -> Result<AuditEntry, DatabaseError> {
    Ok(AuditEntry {
        id: row.get::<i64>(0)?,
        timestamp: parse_datetime(&row.get::<String>(1)?)?,
        action: parse_enum(&row.get::<String>(2)?)?,
        entity_type: parse_enum(&row.get::<String>(3)?)?,
        entity_id: row.get::<i64>(4)?,
        before: parse_optional_snapshot(get_opt_string(row, 5)?.as_deref())?,
        after: parse_optional_snapshot(get_opt_string(row, 6)?.as_deref())?,
        summary: row.get::<String>(7)?,
        batch_id: row.get::<Option<i64>>(8)?,
        undone: row.get::<i64>(9)? != 0,
    })
}

fn validate_shape(new: &NewAuditEntry) -> Result<(), UndoError> {
    let fail = |reason: &str| {
        Err(UndoError::InvalidEntryShape {
            action: new.action,
            reason: reason.to_string(),
        })
    };

    if new.action.requires_before() && new.before.is_none() {
        return fail("missing 'before' snapshot");
    }
    if !new.action.requires_before() && new.before.is_some() {
        return fail("unexpected 'before' snapshot");
    }
    if new.action.requires_after() && new.after.is_none() {
        return fail("missing 'after' snapshot");
    }
    if !new.action.requires_after() && new.after.is_some() {
        return fail("unexpected 'after' snapshot");
    }
    if matches!(new.action, AuditAction::Update | AuditAction::BulkUpdate)
        && new.before == new.after
    {
        return fail("'before' and 'after' snapshots are identical");
    }
    Ok(())
}

/// Validate and insert one entry. Runs on whatever connection the caller
/// holds — inside a mutation's transaction this is what couples the
/// record change and its log entry into one commit.
pub(crate) async fn insert_entry(
    conn: &libsql::Connection,
    new: &NewAuditEntry,
) -> Result<AuditEntry, UndoError> {
    validate_shape(new)?;

    let now = Utc::now();
    let before_json = new
        .before
        .as_ref()
        .map(snapshot_to_json)
        .transpose()
        .map_err(UndoError::Persistence)?;
    let after_json = new
        .after
        .as_ref()
        .map(snapshot_to_json)
        .transpose()
        .map_err(UndoError::Persistence)?;

    conn.execute(
        "INSERT INTO audit_trail (timestamp, action, entity_type, entity_id, before_values, after_values, summary, batch_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        libsql::params![
            now.to_rfc3339(),
            new.action.as_str(),
            new.entity_type.as_str(),
            new.entity_id,
            before_json.as_deref(),
            after_json.as_deref(),
            new.summary.as_str(),
            new.batch_id
        ],
    )
    .await?;

    Ok(AuditEntry {
        id: conn.last_insert_rowid(),
        timestamp: now,
        action: new.action,
        entity_type: new.entity_type,
        entity_id: new.entity_id,
        before: new.before.clone(),
        after: new.after.clone(),
        summary: new.summary.clone(),
        batch_id: new.batch_id,
        undone: false,
    })
}

/// Allocate a fresh batch id.
pub(crate) async fn allocate_batch_id(conn: &libsql::Connection) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO audit_batches (created_at) VALUES (?1)",
        [Utc::now().to_rfc3339()],
    )
    .await?;
    Ok(conn.last_insert_rowid())
}

/// All members of a batch, ascending append order.
pub(crate) async fn batch_members(
    conn: &libsql::Connection,
    batch_id: i64,
) -> Result<Vec<AuditEntry>, DatabaseError> {
    let sql =
        format!("SELECT {ENTRY_COLUMNS} FROM audit_trail WHERE batch_id = ?1 ORDER BY id ASC");
    let mut rows = conn.query(&sql, [batch_id]).await?;

    let mut entries = Vec::new();
    while let Some(row) = rows.next().await? {
        entries.push(row_to_entry(&row)?);
    }
    Ok(entries)
}

/// Flip the `undone` flag for every listed entry.
pub(crate) async fn mark_undone(
    conn: &libsql::Connection,
    ids: &[i64],
) -> Result<(), DatabaseError> {
    for id in ids {
        conn.execute("UPDATE audit_trail SET undone = 1 WHERE id = ?1", [*id])
            .await?;
    }
    Ok(())
}

impl RewindService {
    /// Append an audit entry for a mutation the caller performed itself.
    ///
    /// Validates the before/after presence invariant for the action,
    /// assigns the next id and timestamp, persists the entry, and
    /// enforces retention — all in one transaction, so a failed append
    /// leaves no trace.
    ///
    /// # Errors
    ///
    /// `UndoError::InvalidEntryShape` if the snapshots don't fit the
    /// action; `UndoError::Persistence` if the write fails.
    pub async fn append_audit(&self, new: NewAuditEntry) -> Result<AuditEntry, UndoError> {
        let tx = self.db().conn().transaction().await?;
        let entry = insert_entry(&tx, &new).await?;
        retention::enforce(&tx, self.max_entries())
            .await
            .map_err(UndoError::Persistence)?;
        tx.commit().await?;

        tracing::debug!(
            entry = entry.id,
            action = %entry.action,
            entity_type = %entry.entity_type,
            entity_id = entry.entity_id,
            "appended audit entry"
        );
        Ok(entry)
    }

    /// Query audit entries, newest first, with the pre-pagination total.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(
        &self,
        filter: &AuditFilter,
    ) -> Result<(Vec<AuditEntry>, u64), DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(et) = filter.entity_type {
            params.push(et.as_str().into());
            conditions.push(format!("entity_type = ?{}", params.len()));
        }
        if let Some(eid) = filter.entity_id {
            params.push(eid.into());
            conditions.push(format!("entity_id = ?{}", params.len()));
        }
        if let Some(action) = filter.action {
            params.push(action.as_str().into());
            conditions.push(format!("action = ?{}", params.len()));
        }
        if let Some(from) = filter.date_from {
            params.push(from.to_rfc3339().into());
            conditions.push(format!("timestamp >= ?{}", params.len()));
        }
        if let Some(to) = filter.date_to {
            params.push(to.to_rfc3339().into());
            conditions.push(format!("timestamp <= ?{}", params.len()));
        }
        if let Some(ref text) = filter.text {
            params.push(format!("%{}%", text.to_lowercase()).into());
            conditions.push(format!("LOWER(summary) LIKE ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM audit_trail {where_clause}");
        let mut rows = self
            .db()
            .conn()
            .query(&count_sql, libsql::params_from_iter(params.clone()))
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let total = u64::try_from(row.get::<i64>(0)?).unwrap_or_default();

        let mut sql =
            format!("SELECT {ENTRY_COLUMNS} FROM audit_trail {where_clause} ORDER BY id DESC");
        match (filter.limit, filter.offset.unwrap_or(0)) {
            (Some(limit), 0) => sql.push_str(&format!(" LIMIT {limit}")),
            (Some(limit), offset) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (None, 0) => {}
            // SQLite requires a LIMIT clause to use OFFSET; -1 = unlimited.
            (None, offset) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
        }

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_entry(&row)?);
        }

        Ok((entries, total))
    }

    /// Look up one entry by id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_audit(&self, id: i64) -> Result<Option<AuditEntry>, DatabaseError> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM audit_trail WHERE id = ?1");
        let mut rows = self.db().conn().query(&sql, [id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_entry(&row)?)),
            None => Ok(None),
        }
    }

    /// The newest not-yet-undone entry — expanded to its whole batch when
    /// it has one — or `None` if the trail holds nothing undoable.
    ///
    /// Undo eligibility is a pure query over the persisted trail; there
    /// is no in-memory undo stack to drift out of sync across restarts.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn most_recent_undoable(&self) -> Result<Option<Vec<AuditEntry>>, DatabaseError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM audit_trail WHERE undone = 0 ORDER BY id DESC LIMIT 1"
        );
        let mut rows = self.db().conn().query(&sql, ()).await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let entry = row_to_entry(&row)?;

        match entry.batch_id {
            Some(batch_id) => Ok(Some(batch_members(self.db().conn(), batch_id).await?)),
            None => Ok(Some(vec![entry])),
        }
    }

    /// Number of entries still eligible for undo.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn pending_undo_count(&self) -> Result<u64, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT COUNT(*) FROM audit_trail WHERE undone = 0", ())
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(u64::try_from(row.get::<i64>(0)?).unwrap_or_default())
    }

    /// Allocate a batch id for callers logging their own multi-record
    /// operation through [`Self::append_audit`].
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the allocation fails.
    pub async fn begin_batch(&self) -> Result<i64, DatabaseError> {
        allocate_batch_id(self.db().conn()).await
    }
}
