//! Service API Client
//!
//! HTTP client for the external prediction/report service. Pure I/O
//! boundary: one attempt per call, no retries; the caller decides how a
//! failure surfaces to the operator.

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::constants;
use crate::logic::types::{Module, PredictionRecord, ReportQuery, StatsSnapshot};

/// Service endpoint configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: constants::get_service_url(),
            timeout_seconds: constants::get_request_timeout(),
        }
    }
}

/// Prediction service client
#[derive(Debug, Clone)]
pub struct ServiceClient {
    config: ServiceConfig,
    http_client: reqwest::Client,
}

// Wire types

/// Record as it appears on the wire. Module-filtered fetches omit the
/// `module` field; normalization fills it back in from the query.
#[derive(Debug, Deserialize)]
struct WireRecord {
    #[serde(default)]
    module: Option<Module>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    input: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct PredictionsEnvelope {
    #[serde(default)]
    predictions: Vec<WireRecord>,
}

impl ServiceClient {
    /// Create new service client
    pub fn new(config: ServiceConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Fetch pre-aggregated per-module statistics
    pub async fn fetch_stats(&self) -> Result<StatsSnapshot, ServiceError> {
        let url = format!("{}/api/stats", self.config.base_url);

        let response = self.http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        if response.status().is_success() {
            response.json().await
                .map_err(|e| ServiceError::Parse(e.to_string()))
        } else {
            Err(ServiceError::Status(response.status().as_u16()))
        }
    }

    /// Fetch prediction records for a query.
    ///
    /// Returns at most `query.limit` records, newest first, each with its
    /// `module` attribution filled in.
    pub async fn fetch_records(&self, query: &ReportQuery) -> Result<Vec<PredictionRecord>, ServiceError> {
        let url = format!("{}/api/predictions", self.config.base_url);

        let mut request = self.http_client
            .get(&url)
            .query(&[("limit", query.limit.to_string())]);
        if let Some(module) = query.module {
            request = request.query(&[("module", module.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        if response.status().is_success() {
            let envelope: PredictionsEnvelope = response.json().await
                .map_err(|e| ServiceError::Parse(e.to_string()))?;
            Ok(normalize_records(envelope.predictions, query))
        } else {
            Err(ServiceError::Status(response.status().as_u16()))
        }
    }

    /// Request the rendered PDF report. The payload is opaque here and is
    /// relayed unmodified to the delivery collaborator.
    pub async fn fetch_report_pdf(&self) -> Result<Vec<u8>, ServiceError> {
        let url = format!("{}/api/generate-pdf", self.config.base_url);

        let response = self.http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        if response.status().is_success() {
            response.bytes().await
                .map(|bytes| bytes.to_vec())
                .map_err(|e| ServiceError::Network(e.to_string()))
        } else {
            Err(ServiceError::Status(response.status().as_u16()))
        }
    }

    /// Submit prediction parameters for one module and return the literal
    /// result object.
    pub async fn submit_prediction(&self, module: Module, params: &Value) -> Result<Value, ServiceError> {
        let url = format!("{}/predict/{}", self.config.base_url, module.as_str());

        let response = self.http_client
            .post(&url)
            .json(params)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        if response.status().is_success() {
            response.json().await
                .map_err(|e| ServiceError::Parse(e.to_string()))
        } else {
            Err(ServiceError::Status(response.status().as_u16()))
        }
    }
}

/// Fill module attribution, order newest-first and apply the limit.
///
/// ISO-8601 timestamps compare correctly as strings; the sort is stable, so
/// records with equal timestamps keep their source order. Records that
/// cannot be attributed to a module are dropped.
fn normalize_records(wire: Vec<WireRecord>, query: &ReportQuery) -> Vec<PredictionRecord> {
    let mut records: Vec<PredictionRecord> = wire
        .into_iter()
        .filter_map(|record| {
            let module = match record.module.or(query.module) {
                Some(module) => module,
                None => {
                    log::debug!("Dropping record without module attribution");
                    return None;
                }
            };
            Some(PredictionRecord {
                module,
                timestamp: record.timestamp.unwrap_or_default(),
                input: record.input.unwrap_or_else(|| Value::Object(serde_json::Map::new())),
                result: record.result,
            })
        })
        .collect();

    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records.truncate(query.limit);
    records
}

/// Service client errors
#[derive(Debug, Clone)]
pub enum ServiceError {
    Network(String),
    Status(u16),
    Parse(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(e) => write!(f, "Network error: {}", e),
            Self::Status(code) => write!(f, "Service error: {}", code),
            Self::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire(value: Value) -> WireRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_fills_module_from_query() {
        let query = ReportQuery::for_module(Some(Module::Energy));
        let records = normalize_records(
            vec![wire(json!({"timestamp": "2025-01-01T08:00:00", "input": {"hour": 8}}))],
            &query,
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].module, Module::Energy);
    }

    #[test]
    fn test_normalize_orders_newest_first_and_truncates() {
        let query = ReportQuery {
            limit: 2,
            ..Default::default()
        };
        let records = normalize_records(
            vec![
                wire(json!({"module": "traffic", "timestamp": "2025-01-01T08:00:00"})),
                wire(json!({"module": "water", "timestamp": "2025-01-03T08:00:00"})),
                wire(json!({"module": "energy", "timestamp": "2025-01-02T08:00:00"})),
            ],
            &query,
        );

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].module, Module::Water);
        assert_eq!(records[1].module, Module::Energy);
    }

    #[test]
    fn test_normalize_drops_unattributable_records() {
        let query = ReportQuery::default();
        let records = normalize_records(
            vec![
                wire(json!({"timestamp": "2025-01-01T08:00:00"})),
                wire(json!({"module": "waste", "timestamp": "2025-01-01T09:00:00"})),
            ],
            &query,
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].module, Module::Waste);
    }

    #[test]
    fn test_envelope_decodes_without_predictions_key() {
        let envelope: PredictionsEnvelope = serde_json::from_value(json!({})).unwrap();
        assert!(envelope.predictions.is_empty());
    }
}
