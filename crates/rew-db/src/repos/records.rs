//! Ledger record store.
//!
//! The live entity tables and the capability set the undo engine drives:
//! fetch-snapshot, apply-snapshot, delete, insert-with-explicit-id,
//! insert-new. Kinds are a closed registry of column layouts rather than
//! a trait hierarchy — the engine stays entity-agnostic and a new kind is
//! one more [`KindSpec`] plus its migration.
//!
//! The capability functions take a plain `&libsql::Connection` so they
//! run equally on the service connection or inside a transaction
//! (`libsql::Transaction` derefs to `Connection`). The store exclusively
//! owns record lifetime; everything it hands out is a value snapshot.

use rew_core::entities::AuditEntry;
use rew_core::enums::{AuditAction, EntityType};
use rew_core::snapshot::{FieldValue, ValueSnapshot};

use crate::error::{DatabaseError, UndoError};
use crate::repos::audit::{self, NewAuditEntry};
use crate::retention;
use crate::service::RewindService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Boolean,
    Text,
}

#[derive(Debug)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
}

/// Column layout and capabilities of one record kind.
#[derive(Debug)]
pub struct KindSpec {
    pub table: &'static str,
    pub columns: &'static [ColumnSpec],
    /// Whether the kind's table accepts inserts at a caller-chosen id.
    /// All shipped kinds do (SQLite rowid tables); undoing a delete
    /// depends on it.
    pub explicit_id_insert: bool,
}

static TRANSACTION: KindSpec = KindSpec {
    table: "transactions",
    columns: &[
        ColumnSpec { name: "occurred_on", ty: ColumnType::Text, nullable: false },
        ColumnSpec { name: "merchant", ty: ColumnType::Text, nullable: false },
        ColumnSpec { name: "amount_cents", ty: ColumnType::Integer, nullable: false },
        ColumnSpec { name: "category", ty: ColumnType::Text, nullable: false },
        ColumnSpec { name: "reviewed", ty: ColumnType::Boolean, nullable: false },
        ColumnSpec { name: "notes", ty: ColumnType::Text, nullable: true },
    ],
    explicit_id_insert: true,
};

static INCOME: KindSpec = KindSpec {
    table: "income",
    columns: &[
        ColumnSpec { name: "received_on", ty: ColumnType::Text, nullable: false },
        ColumnSpec { name: "source", ty: ColumnType::Text, nullable: false },
        ColumnSpec { name: "amount_cents", ty: ColumnType::Integer, nullable: false },
        ColumnSpec { name: "category", ty: ColumnType::Text, nullable: false },
        ColumnSpec { name: "notes", ty: ColumnType::Text, nullable: true },
    ],
    explicit_id_insert: true,
};

static EXPENSE: KindSpec = KindSpec {
    table: "expenses",
    columns: &[
        ColumnSpec { name: "paid_on", ty: ColumnType::Text, nullable: false },
        ColumnSpec { name: "vendor", ty: ColumnType::Text, nullable: false },
        ColumnSpec { name: "amount_cents", ty: ColumnType::Integer, nullable: false },
        ColumnSpec { name: "category", ty: ColumnType::Text, nullable: false },
        ColumnSpec { name: "deductible", ty: ColumnType::Boolean, nullable: false },
        ColumnSpec { name: "notes", ty: ColumnType::Text, nullable: true },
    ],
    explicit_id_insert: true,
};

/// Uses exhaustive match — adding a new `EntityType` variant forces
/// updating this.
#[must_use]
pub const fn kind_spec(kind: EntityType) -> &'static KindSpec {
    match kind {
        EntityType::Transaction => &TRANSACTION,
        EntityType::Income => &INCOME,
        EntityType::Expense => &EXPENSE,
    }
}

fn column_list(spec: &KindSpec) -> String {
    spec.columns
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn column_for_field<'a>(
    spec: &'a KindSpec,
    name: &str,
) -> Result<&'a ColumnSpec, DatabaseError> {
    spec.columns.iter().find(|c| c.name == name).ok_or_else(|| {
        DatabaseError::InvalidState(format!("unknown field '{name}' for table '{}'", spec.table))
    })
}

fn value_for_column(col: &ColumnSpec, value: &FieldValue) -> Result<libsql::Value, DatabaseError> {
    match (col.ty, value) {
        (_, FieldValue::Null) if col.nullable => Ok(libsql::Value::Null),
        (_, FieldValue::Null) => Err(DatabaseError::InvalidState(format!(
            "column '{}' is not nullable",
            col.name
        ))),
        (ColumnType::Integer, FieldValue::Int(v)) => Ok(libsql::Value::Integer(*v)),
        (ColumnType::Boolean, FieldValue::Bool(v)) => Ok(libsql::Value::Integer(i64::from(*v))),
        (ColumnType::Text, FieldValue::Text(v)) => Ok(libsql::Value::Text(v.clone())),
        (ty, other) => Err(DatabaseError::InvalidState(format!(
            "type mismatch for column '{}': expected {ty:?}, got {other:?}",
            col.name
        ))),
    }
}

/// Current snapshot of the record at `id`, or `None` if no such record.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn fetch_snapshot(
    conn: &libsql::Connection,
    kind: EntityType,
    id: i64,
) -> Result<Option<ValueSnapshot>, DatabaseError> {
    let spec = kind_spec(kind);
    let sql = format!("SELECT {} FROM {} WHERE id = ?1", column_list(spec), spec.table);
    let mut rows = conn.query(&sql, [id]).await?;
    let Some(row) = rows.next().await? else {
        return Ok(None);
    };

    let mut fields = Vec::with_capacity(spec.columns.len());
    for (idx, col) in spec.columns.iter().enumerate() {
        let idx = i32::try_from(idx).unwrap_or(i32::MAX);
        let value = match col.ty {
            ColumnType::Integer => row
                .get::<Option<i64>>(idx)?
                .map_or(FieldValue::Null, FieldValue::Int),
            ColumnType::Boolean => row
                .get::<Option<i64>>(idx)?
                .map_or(FieldValue::Null, |v| FieldValue::Bool(v != 0)),
            ColumnType::Text => row
                .get::<Option<String>>(idx)?
                .map_or(FieldValue::Null, FieldValue::Text),
        };
        fields.push((col.name, value));
    }
    Ok(Some(ValueSnapshot::from_fields(fields)))
}

/// Overwrite the record at `id` with the snapshot's fields.
///
/// Fields absent from the snapshot are left untouched; unknown fields and
/// type mismatches are rejected before any write.
///
/// # Errors
///
/// `DatabaseError::NoResult` if no record sits at `id`;
/// `DatabaseError::InvalidState` for unknown fields or type mismatches.
pub async fn apply_snapshot(
    conn: &libsql::Connection,
    kind: EntityType,
    id: i64,
    snap: &ValueSnapshot,
) -> Result<(), DatabaseError> {
    let spec = kind_spec(kind);
    let mut sets = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();

    for (name, value) in snap.fields() {
        let col = column_for_field(spec, name)?;
        params.push(value_for_column(col, value)?);
        sets.push(format!("{} = ?{}", col.name, params.len()));
    }
    if sets.is_empty() {
        return Err(DatabaseError::InvalidState(
            "cannot apply an empty snapshot".to_string(),
        ));
    }

    params.push(libsql::Value::Integer(id));
    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?{}",
        spec.table,
        sets.join(", "),
        params.len()
    );
    let affected = conn.execute(&sql, libsql::params_from_iter(params)).await?;
    if affected == 0 {
        return Err(DatabaseError::NoResult);
    }
    Ok(())
}

/// Delete the record at `id`.
///
/// # Errors
///
/// `DatabaseError::NoResult` if no record sits at `id`.
pub async fn delete_row(
    conn: &libsql::Connection,
    kind: EntityType,
    id: i64,
) -> Result<(), DatabaseError> {
    let spec = kind_spec(kind);
    let affected = conn
        .execute(&format!("DELETE FROM {} WHERE id = ?1", spec.table), [id])
        .await?;
    if affected == 0 {
        return Err(DatabaseError::NoResult);
    }
    Ok(())
}

/// Insert a record at a caller-chosen id. Returns `Ok(false)` — without
/// touching the table — when the kind does not support explicit-identity
/// insert.
///
/// # Errors
///
/// Returns `DatabaseError` if the insert fails (e.g. the id is taken).
pub async fn insert_with_id(
    conn: &libsql::Connection,
    kind: EntityType,
    id: i64,
    snap: &ValueSnapshot,
) -> Result<bool, DatabaseError> {
    let spec = kind_spec(kind);
    if !spec.explicit_id_insert {
        return Ok(false);
    }
    insert_row(conn, spec, Some(id), snap).await?;
    Ok(true)
}

/// Insert a record, letting the store assign the id. Returns the new id.
///
/// # Errors
///
/// Returns `DatabaseError` if the insert fails.
pub async fn insert_new(
    conn: &libsql::Connection,
    kind: EntityType,
    snap: &ValueSnapshot,
) -> Result<i64, DatabaseError> {
    insert_row(conn, kind_spec(kind), None, snap).await?;
    Ok(conn.last_insert_rowid())
}

async fn insert_row(
    conn: &libsql::Connection,
    spec: &KindSpec,
    id: Option<i64>,
    snap: &ValueSnapshot,
) -> Result<(), DatabaseError> {
    let mut names: Vec<&str> = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();

    if let Some(id) = id {
        names.push("id");
        params.push(libsql::Value::Integer(id));
    }
    for (name, value) in snap.fields() {
        let col = column_for_field(spec, name)?;
        params.push(value_for_column(col, value)?);
        names.push(col.name);
    }

    let placeholders = (1..=params.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        spec.table,
        names.join(", "),
        placeholders
    );
    conn.execute(&sql, libsql::params_from_iter(params)).await?;
    Ok(())
}

impl RewindService {
    /// Current snapshot of a record, if it exists.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn snapshot(
        &self,
        kind: EntityType,
        id: i64,
    ) -> Result<Option<ValueSnapshot>, DatabaseError> {
        fetch_snapshot(self.db().conn(), kind, id).await
    }

    /// Insert a new record and log a `Create` entry, atomically.
    ///
    /// The insert is flushed first so the assigned id is known at log
    /// time; the logged `after` is re-read from the table so column
    /// defaults are captured too.
    ///
    /// # Errors
    ///
    /// `UndoError::Persistence` if any step fails; the transaction rolls
    /// back as a whole.
    pub async fn create_record(
        &self,
        kind: EntityType,
        values: &ValueSnapshot,
        summary: &str,
    ) -> Result<AuditEntry, UndoError> {
        let tx = self.db().conn().transaction().await?;

        let id = insert_new(&tx, kind, values)
            .await
            .map_err(UndoError::Persistence)?;
        let after = fetch_snapshot(&tx, kind, id)
            .await
            .map_err(UndoError::Persistence)?
            .ok_or(UndoError::Persistence(DatabaseError::NoResult))?;

        let entry = audit::insert_entry(
            &tx,
            &NewAuditEntry {
                action: AuditAction::Create,
                entity_type: kind,
                entity_id: id,
                before: None,
                after: Some(after),
                summary: summary.to_string(),
                batch_id: None,
            },
        )
        .await?;
        retention::enforce(&tx, self.max_entries())
            .await
            .map_err(UndoError::Persistence)?;
        tx.commit().await?;

        tracing::debug!(entry = entry.id, kind = %kind, id, "created record");
        Ok(entry)
    }

    /// Apply field changes to a record and log an `Update` entry,
    /// atomically. Returns `None` — and logs nothing — when the changes
    /// leave every field as it was (an Update entry must have distinct
    /// before/after snapshots).
    ///
    /// # Errors
    ///
    /// `UndoError::Persistence` wrapping `DatabaseError::NoResult` if no
    /// record sits at `id`; any other failure rolls back the whole
    /// transaction.
    pub async fn update_record(
        &self,
        kind: EntityType,
        id: i64,
        changes: &ValueSnapshot,
        summary: &str,
    ) -> Result<Option<AuditEntry>, UndoError> {
        let tx = self.db().conn().transaction().await?;

        let before = fetch_snapshot(&tx, kind, id)
            .await
            .map_err(UndoError::Persistence)?
            .ok_or(UndoError::Persistence(DatabaseError::NoResult))?;
        apply_snapshot(&tx, kind, id, changes)
            .await
            .map_err(UndoError::Persistence)?;
        let after = fetch_snapshot(&tx, kind, id)
            .await
            .map_err(UndoError::Persistence)?
            .ok_or(UndoError::Persistence(DatabaseError::NoResult))?;

        if before == after {
            tx.commit().await?;
            tracing::debug!(kind = %kind, id, "update changed nothing; no entry logged");
            return Ok(None);
        }

        let entry = audit::insert_entry(
            &tx,
            &NewAuditEntry {
                action: AuditAction::Update,
                entity_type: kind,
                entity_id: id,
                before: Some(before),
                after: Some(after),
                summary: summary.to_string(),
                batch_id: None,
            },
        )
        .await?;
        retention::enforce(&tx, self.max_entries())
            .await
            .map_err(UndoError::Persistence)?;
        tx.commit().await?;

        tracing::debug!(entry = entry.id, kind = %kind, id, "updated record");
        Ok(Some(entry))
    }

    /// Delete a record and log a `Delete` entry, atomically.
    ///
    /// # Errors
    ///
    /// `UndoError::Persistence` wrapping `DatabaseError::NoResult` if no
    /// record sits at `id`.
    pub async fn delete_record(
        &self,
        kind: EntityType,
        id: i64,
        summary: &str,
    ) -> Result<AuditEntry, UndoError> {
        let tx = self.db().conn().transaction().await?;

        let before = fetch_snapshot(&tx, kind, id)
            .await
            .map_err(UndoError::Persistence)?
            .ok_or(UndoError::Persistence(DatabaseError::NoResult))?;
        delete_row(&tx, kind, id)
            .await
            .map_err(UndoError::Persistence)?;

        let entry = audit::insert_entry(
            &tx,
            &NewAuditEntry {
                action: AuditAction::Delete,
                entity_type: kind,
                entity_id: id,
                before: Some(before),
                after: None,
                summary: summary.to_string(),
                batch_id: None,
            },
        )
        .await?;
        retention::enforce(&tx, self.max_entries())
            .await
            .map_err(UndoError::Persistence)?;
        tx.commit().await?;

        tracing::debug!(entry = entry.id, kind = %kind, id, "deleted record");
        Ok(entry)
    }

    /// Apply the same logical operation to several records of one kind
    /// and log the whole thing as one batch, atomically.
    ///
    /// Member entries share a freshly allocated batch id and are appended
    /// contiguously inside one transaction, so the batch is never
    /// interleaved with foreign entries. Members whose changes leave the
    /// record untouched are skipped (not logged).
    ///
    /// # Errors
    ///
    /// Any failing member rolls back every record change and every log
    /// entry of the batch.
    pub async fn bulk_update(
        &self,
        kind: EntityType,
        changes: &[(i64, ValueSnapshot)],
        summary: &str,
    ) -> Result<Vec<AuditEntry>, UndoError> {
        let tx = self.db().conn().transaction().await?;
        let batch_id = audit::allocate_batch_id(&tx)
            .await
            .map_err(UndoError::Persistence)?;

        let mut entries = Vec::with_capacity(changes.len());
        for (id, change) in changes {
            let before = fetch_snapshot(&tx, kind, *id)
                .await
                .map_err(UndoError::Persistence)?
                .ok_or(UndoError::Persistence(DatabaseError::NoResult))?;
            apply_snapshot(&tx, kind, *id, change)
                .await
                .map_err(UndoError::Persistence)?;
            let after = fetch_snapshot(&tx, kind, *id)
                .await
                .map_err(UndoError::Persistence)?
                .ok_or(UndoError::Persistence(DatabaseError::NoResult))?;

            if before == after {
                tracing::debug!(kind = %kind, id, "bulk member unchanged; not logged");
                continue;
            }

            entries.push(
                audit::insert_entry(
                    &tx,
                    &NewAuditEntry {
                        action: AuditAction::BulkUpdate,
                        entity_type: kind,
                        entity_id: *id,
                        before: Some(before),
                        after: Some(after),
                        summary: summary.to_string(),
                        batch_id: Some(batch_id),
                    },
                )
                .await?,
            );
        }

        retention::enforce(&tx, self.max_entries())
            .await
            .map_err(UndoError::Persistence)?;
        tx.commit().await?;

        tracing::debug!(
            batch = batch_id,
            members = entries.len(),
            kind = %kind,
            "logged bulk update"
        );
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use rew_core::snapshot::FieldValue;

    use super::*;
    use crate::test_support::helpers::{test_service, txn_values};

    #[tokio::test]
    async fn fetch_apply_roundtrip() {
        let svc = test_service().await;
        let conn = svc.db().conn();

        let values = txn_values("Acme Supplies", 1250, "Office", false);
        let id = insert_new(conn, EntityType::Transaction, &values).await.unwrap();

        let snap = fetch_snapshot(conn, EntityType::Transaction, id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snap, values);

        let patch = ValueSnapshot::from_fields([
            ("category", FieldValue::from("Travel")),
            ("reviewed", FieldValue::from(true)),
        ]);
        apply_snapshot(conn, EntityType::Transaction, id, &patch)
            .await
            .unwrap();

        let snap = fetch_snapshot(conn, EntityType::Transaction, id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snap.get("category"), Some(&FieldValue::Text("Travel".into())));
        assert_eq!(snap.get("reviewed"), Some(&FieldValue::Bool(true)));
        // Untouched fields keep their values.
        assert_eq!(snap.get("merchant"), Some(&FieldValue::Text("Acme Supplies".into())));
    }

    #[tokio::test]
    async fn fetch_missing_record_is_none() {
        let svc = test_service().await;
        let snap = fetch_snapshot(svc.db().conn(), EntityType::Expense, 404)
            .await
            .unwrap();
        assert!(snap.is_none());
    }

    #[tokio::test]
    async fn apply_rejects_unknown_field() {
        let svc = test_service().await;
        let conn = svc.db().conn();
        let id = insert_new(conn, EntityType::Transaction, &txn_values("A", 1, "Other", false))
            .await
            .unwrap();

        let patch = ValueSnapshot::from_fields([("no_such_column", FieldValue::from(1_i64))]);
        let result = apply_snapshot(conn, EntityType::Transaction, id, &patch).await;
        assert!(matches!(result, Err(DatabaseError::InvalidState(_))));
    }

    #[tokio::test]
    async fn apply_rejects_type_mismatch() {
        let svc = test_service().await;
        let conn = svc.db().conn();
        let id = insert_new(conn, EntityType::Transaction, &txn_values("A", 1, "Other", false))
            .await
            .unwrap();

        let patch = ValueSnapshot::from_fields([("amount_cents", FieldValue::from("lots"))]);
        let result = apply_snapshot(conn, EntityType::Transaction, id, &patch).await;
        assert!(matches!(result, Err(DatabaseError::InvalidState(_))));
    }

    #[tokio::test]
    async fn insert_with_id_restores_exact_identity() {
        let svc = test_service().await;
        let conn = svc.db().conn();

        let values = txn_values("Acme Supplies", 1250, "Office", true);
        let supported = insert_with_id(conn, EntityType::Transaction, 77, &values)
            .await
            .unwrap();
        assert!(supported);

        let snap = fetch_snapshot(conn, EntityType::Transaction, 77)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snap, values);
    }

    #[tokio::test]
    async fn insert_with_taken_id_fails() {
        let svc = test_service().await;
        let conn = svc.db().conn();

        let values = txn_values("A", 1, "Other", false);
        let id = insert_new(conn, EntityType::Transaction, &values).await.unwrap();
        let result = insert_with_id(conn, EntityType::Transaction, id, &values).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn create_record_logs_create_entry() {
        let svc = test_service().await;

        let entry = svc
            .create_record(
                EntityType::Transaction,
                &txn_values("Acme Supplies", 1250, "Office", false),
                "Added transaction for Acme Supplies",
            )
            .await
            .unwrap();

        assert_eq!(entry.action, AuditAction::Create);
        assert!(entry.before.is_none());
        let after = entry.after.as_ref().unwrap();
        assert_eq!(after.get("merchant"), Some(&FieldValue::Text("Acme Supplies".into())));

        let live = svc
            .snapshot(EntityType::Transaction, entry.entity_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&live, after);
    }

    #[tokio::test]
    async fn update_record_logs_before_and_after() {
        let svc = test_service().await;
        let created = svc
            .create_record(
                EntityType::Transaction,
                &txn_values("Acme Supplies", 1250, "Other", false),
                "Added transaction",
            )
            .await
            .unwrap();

        let entry = svc
            .update_record(
                EntityType::Transaction,
                created.entity_id,
                &ValueSnapshot::from_fields([
                    ("category", FieldValue::from("Office")),
                    ("reviewed", FieldValue::from(true)),
                ]),
                "Recategorized and reviewed",
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(entry.action, AuditAction::Update);
        let before = entry.before.as_ref().unwrap();
        let after = entry.after.as_ref().unwrap();
        assert_eq!(before.get("category"), Some(&FieldValue::Text("Other".into())));
        assert_eq!(after.get("category"), Some(&FieldValue::Text("Office".into())));
        // Unchanged fields appear in both snapshots.
        assert_eq!(before.get("amount_cents"), Some(&FieldValue::Int(1250)));
        assert_eq!(after.get("amount_cents"), Some(&FieldValue::Int(1250)));
    }

    #[tokio::test]
    async fn noop_update_logs_nothing() {
        let svc = test_service().await;
        let created = svc
            .create_record(
                EntityType::Transaction,
                &txn_values("Acme Supplies", 1250, "Office", false),
                "Added transaction",
            )
            .await
            .unwrap();

        let entry = svc
            .update_record(
                EntityType::Transaction,
                created.entity_id,
                &ValueSnapshot::from_fields([("category", FieldValue::from("Office"))]),
                "No-op recategorize",
            )
            .await
            .unwrap();
        assert!(entry.is_none());

        let (_, total) = svc
            .query_audit(&crate::repos::audit::AuditFilter::default())
            .await
            .unwrap();
        assert_eq!(total, 1, "only the create is logged");
    }

    #[tokio::test]
    async fn delete_record_logs_before_snapshot() {
        let svc = test_service().await;
        let created = svc
            .create_record(
                EntityType::Expense,
                &ValueSnapshot::from_fields([
                    ("paid_on", FieldValue::from("2026-02-01")),
                    ("vendor", FieldValue::from("CloudHost")),
                    ("amount_cents", FieldValue::from(2900_i64)),
                    ("category", FieldValue::from("Hosting")),
                    ("deductible", FieldValue::from(true)),
                    ("notes", FieldValue::Null),
                ]),
                "Added hosting expense",
            )
            .await
            .unwrap();

        let entry = svc
            .delete_record(EntityType::Expense, created.entity_id, "Removed hosting expense")
            .await
            .unwrap();

        assert_eq!(entry.action, AuditAction::Delete);
        assert!(entry.after.is_none());
        assert_eq!(entry.before, created.after);
        assert!(svc
            .snapshot(EntityType::Expense, created.entity_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn bulk_update_shares_one_contiguous_batch() {
        let svc = test_service().await;

        let mut ids = Vec::new();
        for i in 0..3_i64 {
            let entry = svc
                .create_record(
                    EntityType::Transaction,
                    &txn_values(&format!("Vendor {i}"), 100 + i, "Other", false),
                    "seed",
                )
                .await
                .unwrap();
            ids.push(entry.entity_id);
        }

        let changes: Vec<(i64, ValueSnapshot)> = ids
            .iter()
            .map(|id| {
                (
                    *id,
                    ValueSnapshot::from_fields([("category", FieldValue::from("Office"))]),
                )
            })
            .collect();
        let entries = svc
            .bulk_update(EntityType::Transaction, &changes, "Recategorized quarter")
            .await
            .unwrap();

        assert_eq!(entries.len(), 3);
        let batch_id = entries[0].batch_id.unwrap();
        assert!(entries.iter().all(|e| e.batch_id == Some(batch_id)));
        assert!(entries.iter().all(|e| e.action == AuditAction::BulkUpdate));
        // Contiguous append order.
        assert!(entries.windows(2).all(|w| w[1].id == w[0].id + 1));
    }

    #[tokio::test]
    async fn bulk_update_skips_unchanged_members() {
        let svc = test_service().await;

        let a = svc
            .create_record(
                EntityType::Transaction,
                &txn_values("A", 100, "Office", false),
                "seed",
            )
            .await
            .unwrap();
        let b = svc
            .create_record(
                EntityType::Transaction,
                &txn_values("B", 200, "Other", false),
                "seed",
            )
            .await
            .unwrap();

        let changes = vec![
            (
                a.entity_id,
                ValueSnapshot::from_fields([("category", FieldValue::from("Office"))]),
            ),
            (
                b.entity_id,
                ValueSnapshot::from_fields([("category", FieldValue::from("Office"))]),
            ),
        ];
        let entries = svc
            .bulk_update(EntityType::Transaction, &changes, "Normalize categories")
            .await
            .unwrap();

        assert_eq!(entries.len(), 1, "unchanged member is not logged");
        assert_eq!(entries[0].entity_id, b.entity_id);
    }

    #[tokio::test]
    async fn bulk_update_missing_member_rolls_everything_back() {
        let svc = test_service().await;
        let a = svc
            .create_record(
                EntityType::Transaction,
                &txn_values("A", 100, "Other", false),
                "seed",
            )
            .await
            .unwrap();

        let changes = vec![
            (
                a.entity_id,
                ValueSnapshot::from_fields([("category", FieldValue::from("Office"))]),
            ),
            (
                a.entity_id + 999,
                ValueSnapshot::from_fields([("category", FieldValue::from("Office"))]),
            ),
        ];
        let result = svc
            .bulk_update(EntityType::Transaction, &changes, "Will fail")
            .await;
        assert!(result.is_err());

        // The first member's change was rolled back with the batch.
        let snap = svc
            .snapshot(EntityType::Transaction, a.entity_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snap.get("category"), Some(&FieldValue::Text("Other".into())));
    }
}
