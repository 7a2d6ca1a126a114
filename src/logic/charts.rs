//! Chart Projector
//!
//! Pure projections from aggregated stats, record lists and the session
//! history into chart-ready numeric series. No interpolation or smoothing;
//! consumers render the series as-is.

use serde::Serialize;
use serde_json::Value;

use crate::logic::session::SessionEntry;
use crate::logic::types::{Module, PredictionRecord, StatsSnapshot};

/// Label row aligned with [`totals_series`] slots.
pub const MODULE_LABELS: [&str; 5] = ["Traffic", "Energy", "Water", "Waste", "Air Quality"];

/// One labelled point of a time-series chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// Project per-module totals into a fixed 5-slot series
/// (traffic, energy, water, waste, air).
///
/// Modules missing from the snapshot contribute 0; the output arity is
/// always 5, so chart callers never re-check alignment.
pub fn totals_series(stats: &StatsSnapshot) -> [u64; 5] {
    let mut series = [0u64; 5];
    for (slot, module) in Module::ALL.iter().enumerate() {
        series[slot] = stats.module(*module).total;
    }
    series
}

/// Per-module counts over a (filtered) record list, in order of first
/// appearance. Feeds the "recent predictions" distribution chart.
pub fn distribution(records: &[PredictionRecord]) -> Vec<(Module, u64)> {
    let mut counts: Vec<(Module, u64)> = Vec::new();
    for record in records {
        match counts.iter_mut().find(|(module, _)| *module == record.module) {
            Some(entry) => entry.1 += 1,
            None => counts.push((record.module, 1)),
        }
    }
    counts
}

/// Result field charted on each module's page.
pub fn metric_key(module: Module) -> &'static str {
    match module {
        Module::Traffic => "predicted_vehicle_count",
        Module::Energy => "predicted_consumption_kwh",
        Module::Water => "predicted_consumption_liters",
        Module::Waste => "predicted_fill_level_percent",
        Module::Air => "quality_binary",
    }
}

/// Project one module's session history into labelled points in submission
/// order (`Prediction 1`, `Prediction 2`, ...).
pub fn session_series(entries: &[SessionEntry], module: Module) -> Vec<ChartPoint> {
    entries
        .iter()
        .filter(|entry| entry.module == module)
        .enumerate()
        .map(|(index, entry)| ChartPoint {
            label: format!("Prediction {}", index + 1),
            value: metric_value(module, &entry.result),
        })
        .collect()
}

fn metric_value(module: Module, result: &Value) -> f64 {
    result
        .get(metric_key(module))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

// ============================================================================
// TESTS
// ============================================================================
