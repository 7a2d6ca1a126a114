//! Logic Module - Reporting & Export Engines
//!
//! The cross-module reporting pipeline: record source, aggregation, search,
//! chart projection and export, plus the session/view state they feed.

// Core pipeline
pub mod types;
pub mod source;
pub mod stats;
pub mod search;
pub mod charts;
pub mod export;

// Session & surface state
pub mod session;
pub mod view;
pub mod refresh;
pub mod events;
