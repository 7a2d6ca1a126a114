//! Reporting Core Types
//!
//! Shared value types for the reporting and export pipeline: the closed
//! module set, prediction records, aggregated statistics, and report queries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants;

// ============================================================================
// MODULE SET
// ============================================================================

/// The five prediction domains served by the external service.
///
/// A closed set: aggregation and projection code matches exhaustively over
/// this enum, so adding a module is a compile-time-visible change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Traffic,
    Energy,
    Water,
    Waste,
    Air,
}

impl Module {
    /// All modules in fixed chart/report order.
    pub const ALL: [Module; 5] = [
        Module::Traffic,
        Module::Energy,
        Module::Water,
        Module::Waste,
        Module::Air,
    ];

    /// Wire name used in URLs, query params and record payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Traffic => "traffic",
            Module::Energy => "energy",
            Module::Water => "water",
            Module::Waste => "waste",
            Module::Air => "air",
        }
    }

    /// Human-readable label for chart axes and tables.
    pub fn label(&self) -> &'static str {
        match self {
            Module::Traffic => "Traffic",
            Module::Energy => "Energy",
            Module::Water => "Water",
            Module::Waste => "Waste",
            Module::Air => "Air Quality",
        }
    }

    /// Parse a wire name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Module> {
        match name.to_lowercase().as_str() {
            "traffic" => Some(Module::Traffic),
            "energy" => Some(Module::Energy),
            "water" => Some(Module::Water),
            "waste" => Some(Module::Waste),
            "air" => Some(Module::Air),
            _ => None,
        }
    }
}

// ============================================================================
// PREDICTION RECORDS
// ============================================================================

/// One logged input/result pair produced by a module's prediction call.
///
/// `input` and `result` are module-specific payloads and stay opaque in the
/// generic pipeline; only per-module code may look inside them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub module: Module,
    /// ISO-8601 instant as recorded by the producing service.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default = "empty_object")]
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl PredictionRecord {
    /// The payload that represents this record in search and display:
    /// the result, falling back to the input when no result was recorded.
    pub fn payload(&self) -> &Value {
        self.result.as_ref().unwrap_or(&self.input)
    }
}

// ============================================================================
// AGGREGATED STATISTICS
// ============================================================================

/// Aggregated counters for one module: a total plus up to two
/// module-specific derived scalars (e.g. `high_congestion`,
/// `avg_consumption`). Absent derived scalars read as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default, flatten)]
    pub derived: BTreeMap<String, f64>,
}

impl ModuleStats {
    /// Read a derived scalar, defaulting to 0 when absent.
    pub fn scalar(&self, key: &str) -> f64 {
        self.derived.get(key).copied().unwrap_or(0.0)
    }
}

/// Per-module statistics for all five modules.
///
/// Every field defaults, so a server payload missing a module decodes to
/// `{total: 0}` for that module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    #[serde(default)]
    pub traffic: ModuleStats,
    #[serde(default)]
    pub energy: ModuleStats,
    #[serde(default)]
    pub water: ModuleStats,
    #[serde(default)]
    pub waste: ModuleStats,
    #[serde(default)]
    pub air: ModuleStats,
}

impl StatsSnapshot {
    pub fn module(&self, module: Module) -> &ModuleStats {
        match module {
            Module::Traffic => &self.traffic,
            Module::Energy => &self.energy,
            Module::Water => &self.water,
            Module::Waste => &self.waste,
            Module::Air => &self.air,
        }
    }

    pub fn module_mut(&mut self, module: Module) -> &mut ModuleStats {
        match module {
            Module::Traffic => &mut self.traffic,
            Module::Energy => &mut self.energy,
            Module::Water => &mut self.water,
            Module::Waste => &mut self.waste,
            Module::Air => &mut self.air,
        }
    }

    /// Grand total shown on the dashboard: sum of `total` across all modules.
    pub fn total_predictions(&self) -> u64 {
        Module::ALL.iter().map(|m| self.module(*m).total).sum()
    }
}

// ============================================================================
// REPORT QUERIES
// ============================================================================

/// Filter parameters driving a report fetch/view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportQuery {
    /// Restrict to one module; `None` means all modules.
    pub module: Option<Module>,
    /// Free-text search applied downstream of the fetch.
    pub search: Option<String>,
    /// Upper bound on the number of records requested from the source.
    pub limit: usize,
}

impl Default for ReportQuery {
    fn default() -> Self {
        Self {
            module: None,
            search: None,
            limit: constants::DEFAULT_FETCH_LIMIT,
        }
    }
}

impl ReportQuery {
    pub fn for_module(module: Option<Module>) -> Self {
        Self {
            module,
            ..Default::default()
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_module_wire_names_roundtrip() {
        for module in Module::ALL {
            assert_eq!(Module::from_name(module.as_str()), Some(module));
        }
        assert_eq!(Module::from_name("Traffic"), Some(Module::Traffic));
        assert_eq!(Module::from_name("solar"), None);
    }

    #[test]
    fn test_module_serde_uses_lowercase() {
        let serialized = serde_json::to_string(&Module::Air).unwrap();
        assert_eq!(serialized, "\"air\"");
        let parsed: Module = serde_json::from_str("\"waste\"").unwrap();
        assert_eq!(parsed, Module::Waste);
    }

    #[test]
    fn test_stats_snapshot_defaults_missing_modules() {
        // Server payload with only two modules present
        let snapshot: StatsSnapshot = serde_json::from_value(json!({
            "traffic": {"total": 3, "high_congestion": 1},
            "energy": {"total": 2, "avg_consumption": 410.5}
        }))
        .unwrap();

        assert_eq!(snapshot.traffic.total, 3);
        assert_eq!(snapshot.water.total, 0);
        assert_eq!(snapshot.waste.total, 0);
        assert_eq!(snapshot.traffic.scalar("high_congestion"), 1.0);
        assert_eq!(snapshot.water.scalar("avg_consumption"), 0.0);
        assert_eq!(snapshot.total_predictions(), 5);
    }

    #[test]
    fn test_record_payload_falls_back_to_input() {
        let with_result: PredictionRecord = serde_json::from_value(json!({
            "module": "traffic",
            "timestamp": "2025-01-01T10:00:00",
            "input": {"hour": 8},
            "result": {"congestion_level": "High"}
        }))
        .unwrap();
        assert_eq!(with_result.payload(), &json!({"congestion_level": "High"}));

        let without_result: PredictionRecord = serde_json::from_value(json!({
            "module": "water",
            "timestamp": "2025-01-01T10:00:00",
            "input": {"day": 2}
        }))
        .unwrap();
        assert_eq!(without_result.payload(), &json!({"day": 2}));
    }
}
