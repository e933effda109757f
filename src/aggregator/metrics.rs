//! Summary statistics over duration samples.
//!
//! All values are nanoseconds.

use log::debug;

/// Calculate distribution statistics for a set of durations
///
/// **Public** - main entry point for metrics calculation
///
/// # Arguments
/// * `durations` - Samples in nanoseconds, in any order
///
/// # Returns
/// Statistics about the samples; all zero when there are none
pub fn calculate_distribution(durations: &[i64]) -> DurationDistribution {
    if durations.is_empty() {
        return DurationDistribution::default();
    }

    let mut sorted = durations.to_vec();
    sorted.sort_unstable();

    let count = sorted.len();
    let total: i128 = sorted.iter().map(|&d| i128::from(d)).sum();
    let mean = (total / count as i128) as i64;

    // Upper median for even counts
    let median = sorted[count / 2];

    debug!("Distribution over {} samples", count);

    DurationDistribution {
        count,
        min: sorted[0],
        max: sorted[count - 1],
        mean,
        median,
        total,
    }
}

/// Duration distribution statistics
///
/// **Public** - returned from calculate_distribution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DurationDistribution {
    /// Number of samples
    pub count: usize,

    pub min: i64,
    pub max: i64,

    /// Mean, truncated toward zero
    pub mean: i64,

    pub median: i64,

    /// Sum of all samples
    pub total: i128,
}

impl DurationDistribution {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Spread between the slowest and fastest sample
    pub fn range(&self) -> i64 {
        self.max.saturating_sub(self.min)
    }

    /// Get human-readable summary
    ///
    /// **Public** - for logging and the stats command
    pub fn summary(&self) -> String {
        format!(
            "n={} | min: {} | median: {} | mean: {} | max: {}",
            self.count,
            format_nanos(self.min),
            format_nanos(self.median),
            format_nanos(self.mean),
            format_nanos(self.max)
        )
    }
}

/// Render nanoseconds with the largest unit that keeps the value readable
pub fn format_nanos(nanos: i64) -> String {
    let abs = nanos.unsigned_abs();
    if abs >= 1_000_000_000 {
        format!("{:.3}s", nanos as f64 / 1e9)
    } else if abs >= 1_000_000 {
        format!("{:.3}ms", nanos as f64 / 1e6)
    } else if abs >= 1_000 {
        format!("{:.3}us", nanos as f64 / 1e3)
    } else {
        format!("{}ns", nanos)
    }
}
