//! # Batch Processing
//!
//! Runs many encode/decode/info jobs described in a TOML batch file.
//!
//! ## Runner ([`runner`])
//! Spreads jobs over a bounded pool of blocking workers. Jobs share nothing,
//! so each image is processed independently and failures stay isolated.
//!
//! ## Metrics ([`metrics`])
//! Per-job latency and outcome, aggregated and exported as JSON.

pub mod metrics;
pub mod runner;

// Re-export for convenience
pub use metrics::BatchMetrics;
pub use runner::{BatchRunner, JobOutcome};
