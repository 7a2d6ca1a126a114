//! Stats Aggregator
//!
//! Folds a raw record stream into a per-module `StatsSnapshot` when no
//! server aggregation is available. The trusting path needs no code of its
//! own: decoding a server stats payload into `StatsSnapshot` already
//! defaults missing modules to `{total: 0}` and missing derived scalars
//! to 0.
//!
//! Pure transform: same record sequence in, same snapshot out.

use std::collections::BTreeMap;

use crate::logic::types::{Module, PredictionRecord, StatsSnapshot};

/// Fold a record sequence into per-module totals and derived scalars.
pub fn aggregate(records: &[PredictionRecord]) -> StatsSnapshot {
    let mut snapshot = StatsSnapshot::default();

    for record in records {
        snapshot.module_mut(record.module).total += 1;
    }

    for module in Module::ALL {
        snapshot.module_mut(module).derived = derive(module, records);
    }

    snapshot
}

/// Module-specific derived scalars, computed the way the service computes
/// them. Only these per-module arms look inside `result`; everything else in
/// the pipeline treats it as opaque.
fn derive(module: Module, records: &[PredictionRecord]) -> BTreeMap<String, f64> {
    let own = || records.iter().filter(move |r| r.module == module);
    let mut derived = BTreeMap::new();

    match module {
        Module::Traffic => {
            let high = own()
                .filter(|r| result_str(r, "congestion_level") == Some("High"))
                .count();
            derived.insert("high_congestion".to_string(), high as f64);
        }
        Module::Energy => {
            derived.insert(
                "avg_consumption".to_string(),
                successful_mean(own(), "predicted_consumption_kwh"),
            );
        }
        Module::Water => {
            derived.insert(
                "avg_consumption".to_string(),
                successful_mean(own(), "predicted_consumption_liters"),
            );
        }
        Module::Waste => {
            let needed = own()
                .filter(|r| result_str(r, "collection_needed") == Some("Yes"))
                .count();
            derived.insert("collection_needed".to_string(), needed as f64);
        }
        Module::Air => {
            let unhealthy = own()
                .filter(|r| result_i64(r, "quality_binary") == Some(0))
                .count();
            derived.insert("unhealthy_days".to_string(), unhealthy as f64);
        }
    }

    derived
}

/// Mean of a numeric result field over records whose result reports
/// `status == "success"`, rounded to 2 decimals; 0 when no record qualifies.
/// A qualifying record missing the field contributes 0 to the mean.
fn successful_mean<'a>(
    records: impl Iterator<Item = &'a PredictionRecord>,
    key: &str,
) -> f64 {
    let values: Vec<f64> = records
        .filter(|r| result_str(r, "status") == Some("success"))
        .map(|r| result_f64(r, key).unwrap_or(0.0))
        .collect();

    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    (mean * 100.0).round() / 100.0
}

fn result_str<'a>(record: &'a PredictionRecord, key: &str) -> Option<&'a str> {
    record.result.as_ref()?.get(key)?.as_str()
}

fn result_f64(record: &PredictionRecord, key: &str) -> Option<f64> {
    record.result.as_ref()?.get(key)?.as_f64()
}

fn result_i64(record: &PredictionRecord, key: &str) -> Option<i64> {
    record.result.as_ref()?.get(key)?.as_i64()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(module: Module, result: serde_json::Value) -> PredictionRecord {
        PredictionRecord {
            module,
            timestamp: "2025-01-01T10:00:00".to_string(),
            input: json!({}),
            result: Some(result),
        }
    }

    #[test]
    fn test_totals_match_record_counts() {
        let records = vec![
            record(Module::Traffic, json!({"congestion_level": "High"})),
            record(Module::Traffic, json!({"congestion_level": "Low"})),
            record(Module::Air, json!({"quality_binary": 1})),
        ];

        let snapshot = aggregate(&records);
        assert_eq!(snapshot.traffic.total, 2);
        assert_eq!(snapshot.air.total, 1);
        assert_eq!(snapshot.energy.total, 0);
        assert_eq!(snapshot.total_predictions(), records.len() as u64);
    }

    #[test]
    fn test_derived_counters() {
        let records = vec![
            record(Module::Traffic, json!({"congestion_level": "High"})),
            record(Module::Traffic, json!({"congestion_level": "Medium"})),
            record(Module::Waste, json!({"collection_needed": "Yes"})),
            record(Module::Waste, json!({"collection_needed": "No"})),
            record(Module::Air, json!({"quality_binary": 0})),
            record(Module::Air, json!({"quality_binary": 1})),
        ];

        let snapshot = aggregate(&records);
        assert_eq!(snapshot.traffic.scalar("high_congestion"), 1.0);
        assert_eq!(snapshot.waste.scalar("collection_needed"), 1.0);
        assert_eq!(snapshot.air.scalar("unhealthy_days"), 1.0);
    }

    #[test]
    fn test_average_consumption_over_successful_results() {
        let records = vec![
            record(
                Module::Energy,
                json!({"status": "success", "predicted_consumption_kwh": 400.0}),
            ),
            record(
                Module::Energy,
                json!({"status": "success", "predicted_consumption_kwh": 500.5}),
            ),
            // Failed prediction is excluded from the mean
            record(Module::Energy, json!({"status": "error"})),
        ];

        let snapshot = aggregate(&records);
        assert_eq!(snapshot.energy.scalar("avg_consumption"), 450.25);
    }

    #[test]
    fn test_average_is_zero_without_successes() {
        let records = vec![record(Module::Water, json!({"status": "error"}))];
        let snapshot = aggregate(&records);
        assert_eq!(snapshot.water.scalar("avg_consumption"), 0.0);
        assert_eq!(snapshot.water.total, 1);
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let records = vec![
            record(Module::Traffic, json!({"congestion_level": "High"})),
            record(Module::Energy, json!({"status": "success", "predicted_consumption_kwh": 10.0})),
        ];

        assert_eq!(aggregate(&records), aggregate(&records));
    }
}
