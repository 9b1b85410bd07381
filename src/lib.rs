//! Pulse Insights - deterministic wellness insights from daily wearable metrics
//!
//! Pulse turns a user's recent daily records (sleep score, readiness score,
//! HRV, SpO2) into an ordered list of categorized insights through a fixed
//! rule set: window statistics → rule evaluation → optional chart series.
//!
//! ## Modules
//!
//! - **Engine**: `generate_insights` and the configurable `InsightEngine`
//! - **Presentation**: grouping, dismissal and chart details for a feed
//! - **Report**: seven-day summary of best and worst days
//! - **Source**: the `MetricSource` seam and file-backed sources

pub mod config;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod logging;
pub mod presentation;
pub mod report;
pub mod rules;
pub mod source;
pub mod stats;
pub mod types;
pub mod validate;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::PulseConfig;
pub use engine::{generate_insights, insights_to_json, InsightEngine};
pub use envelope::{EnvelopeEncoder, InsightEnvelope};
pub use error::InsightError;
pub use presentation::InsightFeed;
pub use report::WeeklyReport;
pub use source::MetricSource;
pub use types::{HealthMetricRecord, Insight, InsightCategory};

/// Engine version embedded in every envelope
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for envelopes
pub const PRODUCER_NAME: &str = "pulse-insights";
