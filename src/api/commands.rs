//! Boundary Commands - API for the Dashboard UI
//!
//! One async function per UI operation, returning `Result<T, String>`.
//! Every source/export error is caught here and converted into a
//! user-facing notification; nothing below this layer reaches the operator
//! as a crash.

use serde::Serialize;
use serde_json::Value;

use crate::constants;
use crate::logic::charts::{self, ChartPoint};
use crate::logic::events::{self, Notification};
use crate::logic::export::{self, ExportError};
use crate::logic::search;
use crate::logic::session;
use crate::logic::source;
use crate::logic::types::{Module, PredictionRecord, ReportQuery, StatsSnapshot};
use crate::logic::view;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Dashboard overview payload
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub stats: StatsSnapshot,
    pub total_predictions: u64,
    pub chart_labels: Vec<String>,
    pub chart_series: Vec<u64>,
}

/// One slice of the recent-predictions distribution chart
#[derive(Debug, Clone, Serialize)]
pub struct DistributionSlice {
    pub module: Module,
    pub label: String,
    pub count: u64,
}

/// Reports page payload
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub stats: StatsSnapshot,
    pub total_predictions: u64,
    pub chart_series: Vec<u64>,
    pub records: Vec<PredictionRecord>,
    pub filtered: Vec<PredictionRecord>,
    pub distribution: Vec<DistributionSlice>,
}

// ============================================================================
// DASHBOARD & REPORT COMMANDS
// ============================================================================

/// Refresh and project the dashboard overview. Falls back to the last
/// applied snapshot (all zeros before any successful fetch) when the
/// service is unreachable.
pub async fn get_dashboard() -> Result<DashboardData, String> {
    let view = view::view();
    if let Err(e) = view.refresh().await {
        events::notify_error(format!("Unable to reach prediction service: {}", e));
    }

    let stats = view.stats();
    Ok(DashboardData {
        total_predictions: stats.total_predictions(),
        chart_labels: charts::MODULE_LABELS.iter().map(|s| s.to_string()).collect(),
        chart_series: charts::totals_series(&stats).to_vec(),
        stats,
    })
}

/// Refresh the reporting surface for a query and project stats, records,
/// the search-filtered subset and the recent-predictions distribution.
pub async fn get_report(
    module: Option<Module>,
    search: Option<String>,
    limit: Option<usize>,
) -> Result<ReportData, String> {
    let view = view::view();
    let mut query = ReportQuery::for_module(module);
    query.search = search.clone();
    query.limit = limit.unwrap_or(constants::DEFAULT_FETCH_LIMIT);
    view.set_query(query);

    if let Err(e) = view.refresh().await {
        events::notify_error(format!("Failed to load report data: {}", e));
    }

    let stats = view.stats();
    let records = view.records();
    let term = search.unwrap_or_default();
    let filtered = search::filter(&records, &term);

    let recent = &filtered[..filtered.len().min(constants::RECENT_PREDICTIONS)];
    let distribution = charts::distribution(recent)
        .into_iter()
        .map(|(module, count)| DistributionSlice {
            module,
            label: module.label().to_string(),
            count,
        })
        .collect();

    Ok(ReportData {
        total_predictions: stats.total_predictions(),
        chart_series: charts::totals_series(&stats).to_vec(),
        records,
        filtered,
        distribution,
        stats,
    })
}

// ============================================================================
// PREDICTION COMMANDS
// ============================================================================

/// Forward prediction parameters to the service, log the submission into
/// the session history and return the literal result object.
pub async fn submit_prediction(module: Module, params: Value) -> Result<Value, String> {
    match source::service().submit_prediction(module, &params).await {
        Ok(result) => {
            session::record_submission(module, params, result.clone());
            Ok(result)
        }
        Err(e) => {
            events::notify_error(format!("{} prediction failed: {}", module.label(), e));
            Err(e.to_string())
        }
    }
}

/// Time-series chart points for one module's session history.
pub fn get_session_series(module: Module) -> Result<Vec<ChartPoint>, String> {
    Ok(charts::session_series(&session::history(), module))
}

// ============================================================================
// EXPORT COMMANDS
// ============================================================================

/// Whether an export is currently in flight; the UI disables the export
/// buttons while this is true.
pub fn is_export_in_progress() -> bool {
    export::state().phase() != export::ExportPhase::Idle
}

/// Export prediction records as CSV. `Ok(None)` means no artifact was
/// produced (empty data set, or an export already in progress).
pub async fn export_records_csv(module: Option<Module>) -> Result<Option<String>, String> {
    let target_dir = export::delivery::target_dir();
    match export::export_csv(source::service(), module, &target_dir).await {
        Ok(Some(path)) => {
            events::notify_success(format!("CSV export saved to {}", path.display()));
            Ok(Some(path.display().to_string()))
        }
        Ok(None) => {
            events::notify_info("An export is already in progress");
            Ok(None)
        }
        Err(ExportError::EmptyExport) => {
            events::notify_info("No data to export");
            Ok(None)
        }
        Err(e) => {
            events::notify_error(format!("Error exporting data: {}", e));
            Err(e.to_string())
        }
    }
}

/// Download the service-rendered PDF report. Same `Ok(None)` semantics as
/// the CSV path.
pub async fn export_pdf_report() -> Result<Option<String>, String> {
    let target_dir = export::delivery::target_dir();
    match export::export_pdf(source::service(), &target_dir).await {
        Ok(Some(path)) => {
            events::notify_success(format!("PDF report downloaded to {}", path.display()));
            Ok(Some(path.display().to_string()))
        }
        Ok(None) => {
            events::notify_info("An export is already in progress");
            Ok(None)
        }
        Err(e) => {
            events::notify_error(format!("Error downloading PDF: {}", e));
            Err(e.to_string())
        }
    }
}

// ============================================================================
// NOTIFICATION COMMANDS
// ============================================================================

/// Hand pending notices to the UI.
pub fn drain_notifications() -> Vec<Notification> {
    events::drain()
}
