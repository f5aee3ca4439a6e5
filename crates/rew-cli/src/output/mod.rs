//! Output rendering for `rew` commands.

use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;

pub mod table;

/// Render a serializable response to a string in the requested format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value),
    }
}

/// Print a serializable response in the requested format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn render_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let value = serde_json::to_value(value)?;
    match value {
        Value::Array(items) => render_array_table(&items),
        Value::Object(map) => {
            let headers = ["field", "value"];
            let rows: Vec<Vec<String>> = map
                .into_iter()
                .map(|(key, value)| vec![key, value_to_cell(&value)])
                .collect();
            Ok(table::render(&headers, &rows))
        }
        scalar => Ok(value_to_cell(&scalar)),
    }
}

fn render_array_table(items: &[Value]) -> anyhow::Result<String> {
    if items.is_empty() {
        return Ok(String::from("(no rows)"));
    }

    // Column set: union of keys in first-seen order.
    let mut headers = Vec::<String>::new();
    for item in items {
        let Some(map) = item.as_object() else {
            let rows: Vec<Vec<String>> = items.iter().map(|i| vec![value_to_cell(i)]).collect();
            return Ok(table::render(&["value"], &rows));
        };
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    let rows: Vec<Vec<String>> = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| map.get(header).map_or_else(|| String::from("-"), value_to_cell))
                .collect()
        })
        .collect();

    Ok(table::render(&header_refs, &rows))
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::render;
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Example {
        id: i64,
        summary: &'static str,
    }

    #[test]
    fn json_render_is_valid_json() {
        let value = Example {
            id: 7,
            summary: "Recategorized",
        };
        let out = render(&value, OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["id"], 7);
        assert_eq!(parsed["summary"], "Recategorized");
    }

    #[test]
    fn table_render_for_object_lists_fields() {
        let value = Example {
            id: 7,
            summary: "Recategorized",
        };
        let out = render(&value, OutputFormat::Table).expect("table render should work");
        assert!(out.contains("field"));
        assert!(out.contains("id"));
        assert!(out.contains("Recategorized"));
    }

    #[test]
    fn table_render_for_array_uses_union_headers() {
        let values = vec![
            serde_json::json!({"id": 1, "summary": "a"}),
            serde_json::json!({"id": 2, "undone": true}),
        ];
        let out = render(&values, OutputFormat::Table).expect("table render should work");
        let header = out.lines().next().unwrap();
        assert!(header.contains("id"));
        assert!(header.contains("summary"));
        assert!(header.contains("undone"));
    }
}
