//! Aggregation of canonical traces into duration statistics.
//!
//! This module turns loaded traces into:
//! - Trace duration distributions per request type
//! - Per-function Entry-to-Exit duration distributions
//!
//! Plotting and prediction consume these numbers elsewhere.

pub mod durations;
pub mod metrics;

// Re-export main types and functions
pub use durations::{function_distributions, request_type_distributions, trace_durations};
pub use metrics::{calculate_distribution, DurationDistribution};
