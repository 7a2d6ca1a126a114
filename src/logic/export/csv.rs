//! CSV Rendering
//!
//! Serializes a record list to CSV text. Columns come from the keys of the
//! first record; later records' extra keys are ignored (callers supplying
//! heterogeneous record shapes must pre-normalize if they need full-key
//! coverage). Composite values are JSON-serialized inline as a single
//! field; scalars are emitted as-is. No escaping of separators or line
//! breaks embedded in scalar strings; known, accepted limitation.

use serde_json::Value;

use super::ExportError;

/// Render JSON object records as CSV, rows in source order.
///
/// Fails with [`ExportError::EmptyExport`] on an empty record list: there
/// is no first record to derive a header from.
pub fn render(records: &[Value]) -> Result<String, ExportError> {
    let first = records.first().ok_or(ExportError::EmptyExport)?;

    let headers: Vec<&String> = first
        .as_object()
        .map(|object| object.keys().collect())
        .unwrap_or_default();

    let mut out = headers
        .iter()
        .map(|h| h.as_str())
        .collect::<Vec<_>>()
        .join(",");

    for record in records {
        out.push('\n');
        let object = record.as_object();
        let row: Vec<String> = headers
            .iter()
            .map(|header| {
                object
                    .and_then(|map| map.get(header.as_str()))
                    .map(field)
                    .unwrap_or_default()
            })
            .collect();
        out.push_str(&row.join(","));
    }

    Ok(out)
}

/// One CSV field: composites (and null) as inline JSON, scalars verbatim.
fn field(value: &Value) -> String {
    match value {
        Value::Object(_) | Value::Array(_) | Value::Null => value.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::types::{Module, PredictionRecord};
    use serde_json::json;

    #[test]
    fn test_empty_list_fails_without_artifact() {
        match render(&[]) {
            Err(ExportError::EmptyExport) => {}
            other => panic!("expected EmptyExport, got {:?}", other),
        }
    }

    #[test]
    fn test_header_and_inline_json_payloads() {
        let records = vec![json!({
            "module": "traffic",
            "input": {"hour": 8},
            "result": {"congestion_level": "High"}
        })];

        let csv = render(&records).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "module,input,result");
        assert_eq!(
            lines[1],
            "traffic,{\"hour\":8},{\"congestion_level\":\"High\"}"
        );
    }

    #[test]
    fn test_later_extra_keys_are_ignored() {
        let records = vec![
            json!({"module": "water", "timestamp": "2025-01-02T09:00:00"}),
            json!({"module": "waste", "timestamp": "2025-01-01T09:00:00", "result": {"collection_needed": "Yes"}}),
        ];

        let csv = render(&records).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "module,timestamp");
        assert_eq!(lines[2], "waste,2025-01-01T09:00:00");
    }

    #[test]
    fn test_absent_key_renders_empty_and_null_renders_null() {
        let records = vec![
            json!({"module": "air", "note": null, "score": 3}),
            json!({"module": "air", "score": 4}),
        ];

        let csv = render(&records).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "air,null,3");
        assert_eq!(lines[2], "air,,4");
    }

    #[test]
    fn test_rows_follow_source_order() {
        let records = vec![
            json!({"module": "energy"}),
            json!({"module": "traffic"}),
            json!({"module": "water"}),
        ];

        let csv = render(&records).unwrap();
        assert_eq!(csv, "module\nenergy\ntraffic\nwater");
    }

    #[test]
    fn test_typed_records_serialize_with_declared_field_order() {
        let record = PredictionRecord {
            module: Module::Traffic,
            timestamp: "2025-01-05T08:30:00".to_string(),
            input: json!({"hour": 8}),
            result: Some(json!({"congestion_level": "High"})),
        };

        let rows = vec![serde_json::to_value(&record).unwrap()];
        let csv = render(&rows).unwrap();
        assert!(csv.starts_with("module,timestamp,input,result\n"));
    }
}
