//! Record Source - Prediction Service Access
//!
//! This module handles:
//! - Fetching pre-aggregated stats and prediction records
//! - Requesting the rendered PDF report binary
//! - Submitting prediction parameters on behalf of the form pages

pub mod client;

pub use client::{ServiceClient, ServiceConfig, ServiceError};

use once_cell::sync::Lazy;

/// Shared client for the configured service URL
static SERVICE: Lazy<ServiceClient> = Lazy::new(|| ServiceClient::new(ServiceConfig::default()));

/// Get the process-wide service client
pub fn service() -> &'static ServiceClient {
    &SERVICE
}
