//! Duration queries over batches of traces.

use super::metrics::{calculate_distribution, DurationDistribution};
use crate::model::Trace;
use crate::utils::error::TraceError;
use std::collections::BTreeMap;

/// Trace durations grouped by request type
pub fn trace_durations<'a>(traces: impl IntoIterator<Item = &'a Trace>) -> BTreeMap<String, Vec<i64>> {
    let mut groups: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for trace in traces {
        groups
            .entry(trace.request_type().to_string())
            .or_default()
            .push(trace.duration());
    }
    groups
}

/// Trace duration distribution per request type
///
/// **Public** - used by the stats command
pub fn request_type_distributions<'a>(
    traces: impl IntoIterator<Item = &'a Trace>,
) -> BTreeMap<String, DurationDistribution> {
    trace_durations(traces)
        .into_iter()
        .map(|(request_type, durations)| (request_type, calculate_distribution(&durations)))
        .collect()
}

/// Entry-to-Exit duration distribution per function across traces
///
/// Only span-graph traces carry Entry/Exit pairs; causal-chain traces
/// contribute nothing.
///
/// # Errors
/// * `TraceError::Causality` - a trace with unmatched Entry/Exit nodes
pub fn function_distributions<'a>(
    traces: impl IntoIterator<Item = &'a Trace>,
) -> Result<BTreeMap<String, DurationDistribution>, TraceError> {
    let mut samples: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for trace in traces {
        for (function, durations) in trace.function_durations()? {
            samples.entry(function).or_default().extend(durations);
        }
    }

    Ok(samples
        .into_iter()
        .map(|(function, durations)| (function, calculate_distribution(&durations)))
        .collect())
}
