//! Configuration and constants for the pipeline.

use crate::model::Dataset;
use crate::utils::error::TraceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Causal-chain labels that legitimately arrive without a `Source`
pub const SOURCELESS_LABELS: &[&str] = &["Executing command", "netread"];

/// Parent id the causal-chain format uses for "no parent"
pub const ROOT_PARENT_ID: &str = "0";

/// Causal-chain tag emitted by the shell wrapper, never the request tag
pub const IGNORED_TAG: &str = "FsShell";

/// Span-graph edges of exactly this many nanoseconds are recorder artifacts
pub const ANOMALOUS_EDGE_DURATION: i64 = 1;

pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

pub const TRACE_EXTENSION: &str = "trace";
pub const MOTIF_EXTENSION: &str = "motifs";
pub const GRAMI_SUFFIX: &str = "-grami.lg";
pub const GASTON_SUFFIX: &str = "-gaston.lg";
pub const LABELS_FILENAME: &str = "labels.txt";

/// First line of every Format A file (a single pattern graph)
pub const GRAMI_HEADER: &str = "# t 1";

/// Pipeline configuration, optionally loaded from a TOML file
///
/// Every field has a default so a config file only needs the values
/// it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding `<dataset>/*.json` source documents
    pub json_dir: PathBuf,

    /// Root of the binary trace store
    pub trace_dir: PathBuf,

    /// Root of the exported line-graph files
    pub graph_dir: PathBuf,

    /// Root of the motif result files
    pub motif_dir: PathBuf,

    /// Worker threads for batch conversion and export (None = all cores)
    pub workers: Option<usize>,

    /// Legal request types per dataset name; missing or empty accepts any
    pub request_types: BTreeMap<String, Vec<String>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            json_dir: PathBuf::from("jsons"),
            trace_dir: PathBuf::from("traces"),
            graph_dir: PathBuf::from("graphs"),
            motif_dir: PathBuf::from("motifs"),
            workers: None,
            request_types: BTreeMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// * `TraceError::Io` - If file cannot be read
    /// * `TraceError::Schema` - If TOML is invalid
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| TraceError::Schema(format!("{}: {}", path.display(), e)))
    }

    /// Number of workers to use, never zero
    pub fn worker_count(&self) -> usize {
        self.workers
            .filter(|&n| n > 0)
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1)
    }

    /// The legal request types for a dataset, if the config restricts them
    pub fn allowed_request_types(&self, dataset: Dataset) -> Option<&[String]> {
        self.request_types
            .get(dataset.name())
            .filter(|types| !types.is_empty())
            .map(Vec::as_slice)
    }

    /// Check a request type against the dataset's enumeration
    pub fn check_request_type(&self, dataset: Dataset, request_type: &str) -> Result<(), TraceError> {
        match self.allowed_request_types(dataset) {
            Some(types) if !types.iter().any(|t| t == request_type) => Err(TraceError::Schema(
                format!("request type '{}' is not defined for dataset {}", request_type, dataset),
            )),
            _ => Ok(()),
        }
    }
}
