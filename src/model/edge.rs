use serde::{Deserialize, Serialize};

/// A directed causal link between two nodes of the same trace
///
/// Endpoints are positions in the owning trace's node list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: usize,
    pub destination: usize,

    /// Nanoseconds, never negative
    pub duration: i64,

    /// Link kind, when the source format records one
    pub variant: Option<String>,
}

impl Edge {
    pub fn new(source: usize, destination: usize, duration: i64, variant: Option<String>) -> Self {
        Self {
            source,
            destination,
            duration,
            variant,
        }
    }
}
