//! Row-to-entity parsing helpers.
//!
//! Repo code converts `libsql::Row` (column-indexed) into typed structs.
//! These helpers isolate the parsing and handle the dual datetime format
//! issue (`SQLite`'s `datetime('now')` vs Rust's `to_rfc3339()`).

use chrono::{DateTime, Utc};
use rew_core::snapshot::ValueSnapshot;

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s
/// default format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string matches neither format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all rew-core enums that use `#[serde(rename_all =
/// "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string matches no variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and the
/// empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`;
/// nullable columns must go through `get::<Option<String>>()`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Parse an optional JSON TEXT column as a [`ValueSnapshot`].
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string is not a valid
/// snapshot object.
pub fn parse_optional_snapshot(
    s: Option<&str>,
) -> Result<Option<ValueSnapshot>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => {
            let snap = serde_json::from_str(s)
                .map_err(|e| DatabaseError::Query(format!("Invalid snapshot in column: {e}")))?;
            Ok(Some(snap))
        }
        _ => Ok(None),
    }
}

/// Serialize a snapshot for a JSON TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError` if serialization fails (it cannot for the
/// scalar value set, but the signature propagates anyway).
pub fn snapshot_to_json(snap: &ValueSnapshot) -> Result<String, DatabaseError> {
    serde_json::to_string(snap).map_err(|e| DatabaseError::Other(e.into()))
}

#[cfg(test)]
mod tests {
    use rew_core::snapshot::FieldValue;

    use super::*;

    #[test]
    fn parses_both_datetime_formats() {
        let rfc = parse_datetime("2026-02-09T14:30:00+00:00").unwrap();
        let sqlite = parse_datetime("2026-02-09 14:30:00").unwrap();
        assert_eq!(rfc, sqlite);
    }

    #[test]
    fn rejects_garbage_datetime() {
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn snapshot_column_roundtrip() {
        let snap = ValueSnapshot::from_fields([
            ("merchant", FieldValue::from("Acme")),
            ("amount_cents", FieldValue::from(995_i64)),
        ]);
        let json = snapshot_to_json(&snap).unwrap();
        let back = parse_optional_snapshot(Some(&json)).unwrap().unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn null_snapshot_column_is_none() {
        assert!(parse_optional_snapshot(None).unwrap().is_none());
        assert!(parse_optional_snapshot(Some("")).unwrap().is_none());
    }
}
