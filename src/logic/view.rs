//! Report View - Query State & Stale-Response Discipline
//!
//! Holds the current query plus the latest stats/record snapshots for the
//! reporting surface. Every issued fetch is tagged with a monotonically
//! increasing sequence number; a response is applied to its surface only if
//! no newer response landed there first. Superseded responses are discarded
//! with a debug-level signal, never a user-visible error.

use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::logic::source::{self, ServiceClient, ServiceError};
use crate::logic::types::{PredictionRecord, ReportQuery, StatsSnapshot};

/// One UI surface: the last applied value and the sequence that wrote it.
struct SurfaceCell<T> {
    applied_seq: u64,
    value: T,
}

impl<T> SurfaceCell<T> {
    fn new(value: T) -> Self {
        Self {
            applied_seq: 0,
            value,
        }
    }

    /// Apply `value` if `seq` is newer than the last applied sequence.
    /// Returns false when the response is stale and was discarded.
    fn apply(&mut self, seq: u64, value: T) -> bool {
        if seq <= self.applied_seq {
            return false;
        }
        self.applied_seq = seq;
        self.value = value;
        true
    }
}

/// Reporting surface state. The stats and records surfaces are independent:
/// fetches issued together may complete in either order and each lands on
/// its own cell.
pub struct ReportView {
    client: ServiceClient,
    query: RwLock<ReportQuery>,
    issue_seq: AtomicU64,
    stats: RwLock<SurfaceCell<StatsSnapshot>>,
    records: RwLock<SurfaceCell<Vec<PredictionRecord>>>,
}

impl ReportView {
    pub fn new(client: ServiceClient) -> Self {
        Self {
            client,
            query: RwLock::new(ReportQuery::default()),
            issue_seq: AtomicU64::new(0),
            stats: RwLock::new(SurfaceCell::new(StatsSnapshot::default())),
            records: RwLock::new(SurfaceCell::new(Vec::new())),
        }
    }

    pub fn set_query(&self, query: ReportQuery) {
        *self.query.write() = query;
    }

    pub fn query(&self) -> ReportQuery {
        self.query.read().clone()
    }

    /// Latest applied stats snapshot (defaults to all-zero before the first
    /// successful fetch, which renders as "no data").
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.read().value.clone()
    }

    /// Latest applied record list for the current query.
    pub fn records(&self) -> Vec<PredictionRecord> {
        self.records.read().value.clone()
    }

    /// Issue a stats fetch and a records fetch for the current query.
    ///
    /// Both calls run concurrently and are applied independently under the
    /// sequence check, so a slower superseded response can never overwrite
    /// a newer one. Returns the first fetch error, if any; previously
    /// applied surfaces are kept as-is on failure.
    pub async fn refresh(&self) -> Result<(), ServiceError> {
        let seq = self.issue_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let query = self.query();

        let (stats_result, records_result) =
            tokio::join!(self.client.fetch_stats(), self.client.fetch_records(&query));

        let mut first_error = None;

        match stats_result {
            Ok(snapshot) => {
                if !self.stats.write().apply(seq, snapshot) {
                    log::debug!("Stale stats response discarded (seq {})", seq);
                }
            }
            Err(e) => {
                log::warn!("Stats fetch failed: {}", e);
                first_error = Some(e);
            }
        }

        match records_result {
            Ok(records) => {
                if !self.records.write().apply(seq, records) {
                    log::debug!("Stale records response discarded (seq {})", seq);
                }
            }
            Err(e) => {
                log::warn!("Records fetch failed: {}", e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Process-wide reporting view
static VIEW: Lazy<ReportView> = Lazy::new(|| ReportView::new(source::service().clone()));

pub fn view() -> &'static ReportView {
    &VIEW
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::types::Module;

    #[test]
    fn test_newer_sequence_wins_regardless_of_arrival_order() {
        let mut cell = SurfaceCell::new(0u64);

        // Response for fetch #2 lands before the slower fetch #1.
        assert!(cell.apply(2, 20));
        assert!(!cell.apply(1, 10));
        assert_eq!(cell.value, 20);

        // A genuinely newer fetch still applies.
        assert!(cell.apply(3, 30));
        assert_eq!(cell.value, 30);
    }

    #[test]
    fn test_duplicate_sequence_is_discarded() {
        let mut cell = SurfaceCell::new(String::new());
        assert!(cell.apply(1, "first".to_string()));
        assert!(!cell.apply(1, "again".to_string()));
        assert_eq!(cell.value, "first");
    }

    #[test]
    fn test_view_starts_with_empty_surfaces() {
        let view = ReportView::new(ServiceClient::new(crate::logic::source::ServiceConfig {
            base_url: "http://localhost:0".to_string(),
            timeout_seconds: 1,
        }));

        assert_eq!(view.stats().total_predictions(), 0);
        assert!(view.records().is_empty());
        assert_eq!(view.query().limit, crate::constants::DEFAULT_FETCH_LIMIT);
    }

    #[test]
    fn test_set_query_replaces_current_query() {
        let view = ReportView::new(ServiceClient::new(crate::logic::source::ServiceConfig {
            base_url: "http://localhost:0".to_string(),
            timeout_seconds: 1,
        }));

        view.set_query(ReportQuery {
            module: Some(Module::Air),
            search: Some("unhealthy".to_string()),
            limit: 25,
        });

        let query = view.query();
        assert_eq!(query.module, Some(Module::Air));
        assert_eq!(query.limit, 25);
    }
}
