//! Session History
//!
//! In-memory, in-order log of predictions submitted during this session.
//! Feeds the per-module time-series charts. Not persisted anywhere; the
//! data is owned by the external service, this is a display convenience.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::logic::types::Module;

/// Upper bound on retained session entries
const MAX_SESSION_ENTRIES: usize = 500;

/// One submitted prediction with its literal result.
#[derive(Debug, Clone, Serialize)]
pub struct SessionEntry {
    pub id: String,
    pub module: Module,
    pub timestamp: DateTime<Utc>,
    pub input: Value,
    pub result: Value,
}

static HISTORY: Lazy<RwLock<Vec<SessionEntry>>> = Lazy::new(|| RwLock::new(Vec::new()));

/// Append a submission to the session history.
pub fn record_submission(module: Module, input: Value, result: Value) -> SessionEntry {
    let entry = SessionEntry {
        id: Uuid::new_v4().to_string(),
        module,
        timestamp: Utc::now(),
        input,
        result,
    };

    let mut history = HISTORY.write();
    history.push(entry.clone());
    if history.len() > MAX_SESSION_ENTRIES {
        history.remove(0);
    }

    log::debug!("Session history: {} entries", history.len());
    entry
}

/// Snapshot of the full session history in submission order.
pub fn history() -> Vec<SessionEntry> {
    HISTORY.read().clone()
}

/// Number of retained entries.
pub fn count() -> usize {
    HISTORY.read().len()
}

/// Forget the session history (logout / session reset).
pub fn clear() {
    HISTORY.write().clear();
    log::info!("Session history cleared");
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // The history is a process-wide singleton shared by every test in this
    // binary, so assertions here stick to entries this test created.
    #[test]
    fn test_record_and_snapshot_order() {
        let first = record_submission(
            Module::Traffic,
            json!({"hour": 8}),
            json!({"predicted_vehicle_count": 120}),
        );
        let second = record_submission(
            Module::Traffic,
            json!({"hour": 9}),
            json!({"predicted_vehicle_count": 95}),
        );

        let snapshot = history();
        let first_pos = snapshot.iter().position(|e| e.id == first.id).unwrap();
        let second_pos = snapshot.iter().position(|e| e.id == second.id).unwrap();
        assert!(first_pos < second_pos);
        assert!(count() >= 2);
    }
}
