//! Auto-Refresh Loop
//!
//! Explicit periodic task re-fetching the reporting view, replacing the
//! original dashboard's callback timer. The loop is gated on a running
//! flag; staleness of slow responses is handled by the view's sequence
//! check, so no in-flight cancellation is needed.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::logic::view;

static IS_RUNNING: AtomicBool = AtomicBool::new(false);
static TOTAL_REFRESHES: AtomicU64 = AtomicU64::new(0);

#[derive(Debug)]
pub struct RefreshError(pub String);

impl std::fmt::Display for RefreshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RefreshError: {}", self.0)
    }
}

impl std::error::Error for RefreshError {}

// ============================================================================
// REFRESH CONTROL
// ============================================================================

pub fn start(interval_secs: u64) -> Result<(), RefreshError> {
    if IS_RUNNING.load(Ordering::SeqCst) {
        return Err(RefreshError("Auto-refresh is already running".to_string()));
    }

    IS_RUNNING.store(true, Ordering::SeqCst);

    tokio::spawn(async move {
        refresh_loop(interval_secs).await;
    });

    log::info!("Auto-refresh started (interval: {}s)", interval_secs);
    Ok(())
}

pub fn stop() -> Result<(), RefreshError> {
    if !IS_RUNNING.load(Ordering::SeqCst) {
        return Err(RefreshError("Auto-refresh is not running".to_string()));
    }

    IS_RUNNING.store(false, Ordering::SeqCst);
    log::info!("Auto-refresh stopped");
    Ok(())
}

pub fn is_running() -> bool {
    IS_RUNNING.load(Ordering::SeqCst)
}

pub fn refresh_count() -> u64 {
    TOTAL_REFRESHES.load(Ordering::Relaxed)
}

// ============================================================================
// MAIN REFRESH LOOP
// ============================================================================

async fn refresh_loop(interval_secs: u64) {
    log::info!("Refresh loop started");

    while IS_RUNNING.load(Ordering::SeqCst) {
        match view::view().refresh().await {
            Ok(()) => {
                TOTAL_REFRESHES.fetch_add(1, Ordering::Relaxed);
                log::info!(
                    "Stats refreshed: {} total predictions",
                    view::view().stats().total_predictions()
                );
            }
            Err(e) => log::warn!("Auto-refresh fetch failed: {}", e),
        }

        tokio::time::sleep(Duration::from_secs(interval_secs)).await;
    }

    log::info!("Refresh loop stopped");
}
