//! Search Filter
//!
//! Free-text narrowing of a record list. Matches case-insensitively against
//! the module wire name or the JSON-serialized result payload (falling back
//! to the input when no result was recorded). An empty term is the identity
//! transform.

use crate::logic::types::PredictionRecord;

/// Filter a record list by a free-text term, preserving order.
///
/// Never mutates the source slice; returns a fresh list.
pub fn filter(records: &[PredictionRecord], term: &str) -> Vec<PredictionRecord> {
    if term.is_empty() {
        return records.to_vec();
    }

    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|record| matches(record, &needle))
        .cloned()
        .collect()
}

fn matches(record: &PredictionRecord, needle: &str) -> bool {
    if record.module.as_str().contains(needle) {
        return true;
    }

    serde_json::to_string(record.payload())
        .map(|payload| payload.to_lowercase().contains(needle))
        .unwrap_or(false)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::types::Module;
    use serde_json::json;

    fn record(module: Module, result: Option<serde_json::Value>) -> PredictionRecord {
        PredictionRecord {
            module,
            timestamp: "2025-01-01T10:00:00".to_string(),
            input: json!({"hour": 8}),
            result,
        }
    }

    fn sample() -> Vec<PredictionRecord> {
        vec![
            record(Module::Traffic, Some(json!({"congestion_level": "High"}))),
            record(Module::Energy, Some(json!({"predicted_consumption_kwh": 420.5}))),
            record(Module::Water, None),
            record(Module::Traffic, Some(json!({"congestion_level": "Low"}))),
        ]
    }

    #[test]
    fn test_empty_term_is_identity() {
        let records = sample();
        let filtered = filter(&records, "");

        assert_eq!(filtered.len(), records.len());
        for (kept, original) in filtered.iter().zip(records.iter()) {
            assert_eq!(kept.module, original.module);
            assert_eq!(kept.result, original.result);
        }
    }

    #[test]
    fn test_matches_module_name_case_insensitive() {
        let filtered = filter(&sample(), "TRAFFIC");
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.module == Module::Traffic));
    }

    #[test]
    fn test_matches_result_payload() {
        let filtered = filter(&sample(), "high");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].result, Some(json!({"congestion_level": "High"})));
    }

    #[test]
    fn test_falls_back_to_input_without_result() {
        let filtered = filter(&sample(), "hour");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].module, Module::Water);
    }

    #[test]
    fn test_preserves_relative_order() {
        let records = sample();
        let filtered = filter(&records, "congestion");

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].result, records[0].result);
        assert_eq!(filtered[1].result, records[3].result);
    }

    #[test]
    fn test_no_match_yields_empty() {
        assert!(filter(&sample(), "zeppelin").is_empty());
    }
}
