//! Trail exporter.
//!
//! Flattens filtered audit history into CSV: one row per entry, UTF-8,
//! snapshots rendered as compact `key=value` lists inside single columns
//! so the schema stays identical across entity kinds with different
//! field sets.

use rew_core::entities::AuditEntry;

use crate::error::DatabaseError;
use crate::repos::audit::AuditFilter;
use crate::service::RewindService;

const HEADER: &str = "timestamp,action,entity_type,entity_id,summary,undone,before,after";

impl RewindService {
    /// Export filtered audit history as CSV text.
    ///
    /// Read-only over [`Self::query_audit`]; pass a filter without a
    /// limit to export everything matching. Rows come newest first, like
    /// the query.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the underlying query fails.
    pub async fn export_audit(&self, filter: &AuditFilter) -> Result<String, DatabaseError> {
        let (entries, total) = self.query_audit(filter).await?;
        tracing::debug!(rows = entries.len(), total, "exporting audit trail");

        let mut out = String::with_capacity(64 * (entries.len() + 1));
        out.push_str(HEADER);
        out.push('\n');
        for entry in &entries {
            push_row(&mut out, entry);
        }
        Ok(out)
    }
}

fn push_row(out: &mut String, entry: &AuditEntry) {
    let cells = [
        entry.timestamp.to_rfc3339(),
        entry.action.to_string(),
        entry.entity_type.to_string(),
        entry.entity_id.to_string(),
        entry.summary.clone(),
        entry.undone.to_string(),
        entry.before.as_ref().map(rew_core::snapshot::ValueSnapshot::compact).unwrap_or_default(),
        entry.after.as_ref().map(rew_core::snapshot::ValueSnapshot::compact).unwrap_or_default(),
    ];
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_escaped(out, cell);
    }
    out.push('\n');
}

/// Quote a field when it contains the separator, a quote, or a line
/// break; internal quotes are doubled.
fn push_escaped(out: &mut String, value: &str) {
    if value.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&value.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(value);
    }
}
