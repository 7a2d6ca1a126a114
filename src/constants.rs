//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change the default prediction service URL, only edit this file.

/// Default prediction/report service URL
///
/// This is the fallback URL when no environment variable is set.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5000";

/// Default HTTP request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// Default number of records requested for report views
pub const DEFAULT_FETCH_LIMIT: usize = 100;

/// Number of records requested for a CSV export
pub const EXPORT_FETCH_LIMIT: usize = 1000;

/// Default dashboard auto-refresh interval (seconds)
pub const DEFAULT_REFRESH_INTERVAL: u64 = 30;

/// How many filtered records feed the "recent predictions" views
pub const RECENT_PREDICTIONS: usize = 10;

/// Prefix for exported artifact filenames
pub const ARTIFACT_PREFIX: &str = "smart_city";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Smart City Core";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get service URL from environment or use default
pub fn get_service_url() -> String {
    std::env::var("CITY_SERVICE_URL")
        .unwrap_or_else(|_| DEFAULT_SERVICE_URL.to_string())
}

/// Get request timeout from environment or use default
pub fn get_request_timeout() -> u64 {
    std::env::var("CITY_REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
}

/// Get auto-refresh interval from environment or use default
pub fn get_refresh_interval() -> u64 {
    std::env::var("CITY_REFRESH_INTERVAL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_REFRESH_INTERVAL)
}

/// Check if dashboard auto-refresh is enabled
pub fn is_auto_refresh_enabled() -> bool {
    std::env::var("CITY_AUTO_REFRESH")
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(true)
}
