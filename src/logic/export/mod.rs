//! Exporter - Downloadable Artifacts
//!
//! This module handles:
//! - CSV export of prediction records (rendered locally)
//! - PDF report export (delegated to the service, relayed unmodified)
//! - The one-export-at-a-time state machine guarding both paths
//!
//! The export-in-progress flag lives in [`ExportState`] and nowhere else;
//! a trigger while an export is in flight is a no-op, not an error.

pub mod csv;
pub mod delivery;

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use serde_json::Value;

use crate::constants;
use crate::logic::source::{ServiceClient, ServiceError};
use crate::logic::types::{Module, ReportQuery};

// ============================================================================
// ARTIFACTS
// ============================================================================

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// One finished export: format, deterministic filename, payload bytes.
/// Created per request and handed straight to delivery.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub filename: String,
    pub payload: Vec<u8>,
}

/// `smart_city_<module-or-"all">_<ISO-date>.csv`
pub fn csv_filename(module: Option<Module>, date: NaiveDate) -> String {
    format!(
        "{}_{}_{}.csv",
        constants::ARTIFACT_PREFIX,
        module.map(|m| m.as_str()).unwrap_or("all"),
        date.format("%Y-%m-%d")
    )
}

/// `smart_city_report_<ISO-date>.pdf`
pub fn pdf_filename(date: NaiveDate) -> String {
    format!(
        "{}_report_{}.pdf",
        constants::ARTIFACT_PREFIX,
        date.format("%Y-%m-%d")
    )
}

// ============================================================================
// ERRORS
// ============================================================================

/// Export errors
#[derive(Debug, Clone)]
pub enum ExportError {
    /// No records to export; no header can be derived from nothing.
    EmptyExport,
    Transport(ServiceError),
    Io(String),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyExport => write!(f, "No data to export"),
            Self::Transport(e) => write!(f, "Export fetch failed: {}", e),
            Self::Io(e) => write!(f, "Export write failed: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

// ============================================================================
// STATE MACHINE
// ============================================================================

/// Export lifecycle: `Idle -> Requesting -> Delivering -> Idle`. Failures
/// return to `Idle` through ticket drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    Idle,
    Requesting,
    Delivering,
}

/// Owner of the export-in-progress flag.
pub struct ExportState {
    phase: Mutex<ExportPhase>,
}

impl ExportState {
    pub const fn new() -> Self {
        Self {
            phase: Mutex::new(ExportPhase::Idle),
        }
    }

    pub fn phase(&self) -> ExportPhase {
        *self.phase.lock()
    }

    /// Claim the machine for one export. Returns `None` while another
    /// export is in flight; the caller treats that as a no-op.
    pub fn try_begin(&self) -> Option<ExportTicket<'_>> {
        let mut phase = self.phase.lock();
        if *phase != ExportPhase::Idle {
            return None;
        }
        *phase = ExportPhase::Requesting;
        Some(ExportTicket { state: self })
    }
}

/// RAII claim on the export state machine. Dropping the ticket releases the
/// machine back to `Idle` on every path, success or failure.
pub struct ExportTicket<'a> {
    state: &'a ExportState,
}

impl ExportTicket<'_> {
    /// Mark the payload as fetched and being handed to delivery.
    pub fn delivering(&self) {
        *self.state.phase.lock() = ExportPhase::Delivering;
    }
}

impl Drop for ExportTicket<'_> {
    fn drop(&mut self) {
        *self.state.phase.lock() = ExportPhase::Idle;
    }
}

/// Session-wide export state
static EXPORT_STATE: ExportState = ExportState::new();

pub fn state() -> &'static ExportState {
    &EXPORT_STATE
}

// ============================================================================
// EXPORT OPERATIONS
// ============================================================================

/// Fetch records, render CSV and deliver the artifact.
///
/// `Ok(None)` means another export was already in flight and this trigger
/// was ignored.
pub async fn export_csv(
    client: &ServiceClient,
    module: Option<Module>,
    target_dir: &Path,
) -> Result<Option<PathBuf>, ExportError> {
    let ticket = match EXPORT_STATE.try_begin() {
        Some(ticket) => ticket,
        None => {
            log::info!("Export already in progress, ignoring CSV trigger");
            return Ok(None);
        }
    };

    let query = ReportQuery {
        module,
        search: None,
        limit: constants::EXPORT_FETCH_LIMIT,
    };
    let records = client
        .fetch_records(&query)
        .await
        .map_err(ExportError::Transport)?;

    let rows: Vec<Value> = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()
        .map_err(|e| ExportError::Io(e.to_string()))?;
    let body = csv::render(&rows)?;

    let artifact = ExportArtifact {
        format: ExportFormat::Csv,
        filename: csv_filename(module, Utc::now().date_naive()),
        payload: body.into_bytes(),
    };

    ticket.delivering();
    let path = delivery::deliver(&artifact, target_dir).map_err(|e| ExportError::Io(e.to_string()))?;

    log::info!("Exported {} records to {}", records.len(), path.display());
    Ok(Some(path))
}

/// Request the rendered PDF from the service and deliver it unmodified.
pub async fn export_pdf(
    client: &ServiceClient,
    target_dir: &Path,
) -> Result<Option<PathBuf>, ExportError> {
    let ticket = match EXPORT_STATE.try_begin() {
        Some(ticket) => ticket,
        None => {
            log::info!("Export already in progress, ignoring PDF trigger");
            return Ok(None);
        }
    };

    let payload = client
        .fetch_report_pdf()
        .await
        .map_err(ExportError::Transport)?;

    let artifact = ExportArtifact {
        format: ExportFormat::Pdf,
        filename: pdf_filename(Utc::now().date_naive()),
        payload,
    };

    ticket.delivering();
    let path = delivery::deliver(&artifact, target_dir).map_err(|e| ExportError::Io(e.to_string()))?;

    log::info!("PDF report delivered to {}", path.display());
    Ok(Some(path))
}

// ============================================================================
// TESTS
// ============================================================================
