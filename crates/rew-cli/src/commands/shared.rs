//! Parsing helpers shared by command handlers.

use chrono::{DateTime, NaiveDate, Utc};
use rew_core::snapshot::{FieldValue, ValueSnapshot};

use crate::cli::root_commands::FilterArgs;

/// Parse a CLI string into a snake_case serde enum (entity kinds,
/// actions).
///
/// # Errors
///
/// Returns an error naming `what` when the value matches no variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(value: &str, what: &str) -> anyhow::Result<T> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| anyhow::anyhow!("invalid {what} '{value}'"))
}

/// Parse `name=value` assignments into a snapshot.
///
/// Values: `true`/`false` become booleans, integers become numbers,
/// `null` (or empty) becomes NULL, everything else stays text.
///
/// # Errors
///
/// Returns an error for an argument without `=`.
pub fn parse_fields(fields: &[String]) -> anyhow::Result<ValueSnapshot> {
    let mut pairs = Vec::with_capacity(fields.len());
    for field in fields {
        let (name, raw) = field
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("expected name=value, got '{field}'"))?;
        pairs.push((name.to_string(), parse_value(raw)));
    }
    Ok(ValueSnapshot::from_fields(pairs))
}

fn parse_value(raw: &str) -> FieldValue {
    match raw {
        "" | "null" => FieldValue::Null,
        "true" => FieldValue::Bool(true),
        "false" => FieldValue::Bool(false),
        _ => raw
            .parse::<i64>()
            .map_or_else(|_| FieldValue::Text(raw.to_string()), FieldValue::Int),
    }
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (interpreted
/// as the start of that day, UTC).
///
/// # Errors
///
/// Returns an error naming `what` for anything else.
pub fn parse_date(value: &str, what: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
        .map_err(|_| anyhow::anyhow!("invalid {what} '{value}' (expected RFC 3339 or YYYY-MM-DD)"))
}

/// Build an audit filter from the shared CLI filter arguments.
///
/// # Errors
///
/// Returns an error for an unknown kind, action, or date format.
pub fn filter_from_args(args: &FilterArgs) -> anyhow::Result<rew_db::repos::audit::AuditFilter> {
    Ok(rew_db::repos::audit::AuditFilter {
        entity_type: args
            .entity_type
            .as_deref()
            .map(|value| parse_enum(value, "entity type"))
            .transpose()?,
        entity_id: args.entity_id,
        action: args
            .action
            .as_deref()
            .map(|value| parse_enum(value, "action"))
            .transpose()?,
        date_from: args
            .since
            .as_deref()
            .map(|value| parse_date(value, "--since"))
            .transpose()?,
        date_to: args
            .until
            .as_deref()
            .map(|value| parse_date(value, "--until"))
            .transpose()?,
        text: args.contains.clone(),
        limit: None,
        offset: None,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rew_core::enums::{AuditAction, EntityType};

    use super::*;

    #[test]
    fn parse_enum_accepts_snake_case() {
        let kind: EntityType = parse_enum("transaction", "entity type").unwrap();
        assert_eq!(kind, EntityType::Transaction);
        let action: AuditAction = parse_enum("bulk_update", "action").unwrap();
        assert_eq!(action, AuditAction::BulkUpdate);
    }

    #[test]
    fn parse_enum_rejects_unknown() {
        let result: anyhow::Result<EntityType> = parse_enum("invoice", "entity type");
        assert!(result.is_err());
    }

    #[test]
    fn parse_fields_types_values() {
        let snap = parse_fields(&[
            "merchant=Acme".to_string(),
            "amount_cents=1250".to_string(),
            "reviewed=true".to_string(),
            "notes=null".to_string(),
        ])
        .unwrap();

        assert_eq!(snap.get("merchant"), Some(&FieldValue::Text("Acme".into())));
        assert_eq!(snap.get("amount_cents"), Some(&FieldValue::Int(1250)));
        assert_eq!(snap.get("reviewed"), Some(&FieldValue::Bool(true)));
        assert_eq!(snap.get("notes"), Some(&FieldValue::Null));
    }

    #[test]
    fn parse_fields_rejects_missing_equals() {
        assert!(parse_fields(&["merchant".to_string()]).is_err());
    }

    #[test]
    fn parse_date_accepts_both_formats() {
        let day = parse_date("2026-03-14", "--since").unwrap();
        let precise = parse_date("2026-03-14T00:00:00+00:00", "--since").unwrap();
        assert_eq!(day, precise);
        assert!(parse_date("last tuesday", "--since").is_err());
    }
}
