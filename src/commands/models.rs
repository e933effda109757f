use crate::model::Dataset;
use crate::utils::config::PipelineConfig;
use std::path::PathBuf;

/// Arguments for the convert command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    /// Dataset whose JSON sources are converted
    pub dataset: Dataset,

    /// Directories, workers and request-type enumeration
    pub config: PipelineConfig,
}

impl Default for ConvertArgs {
    fn default() -> Self {
        Self {
            dataset: Dataset::OpenStack,
            config: PipelineConfig::default(),
        }
    }
}

/// Arguments for the export command
#[derive(Debug, Clone)]
pub struct ExportArgs {
    pub dataset: Dataset,

    pub config: PipelineConfig,

    /// Only export these request types (empty = all). Labels still cover
    /// the whole dataset.
    pub request_types: Vec<String>,
}

impl Default for ExportArgs {
    fn default() -> Self {
        Self {
            dataset: Dataset::OpenStack,
            config: PipelineConfig::default(),
            request_types: Vec::new(),
        }
    }
}

/// Arguments for the stats command
#[derive(Debug, Clone)]
pub struct StatsArgs {
    pub dataset: Dataset,

    /// Root of the trace store
    pub trace_dir: PathBuf,

    /// Also print per-function Entry-to-Exit durations
    pub functions: bool,
}

impl Default for StatsArgs {
    fn default() -> Self {
        Self {
            dataset: Dataset::OpenStack,
            trace_dir: PathBuf::from("traces"),
            functions: false,
        }
    }
}

/// Arguments for the motifs command
#[derive(Debug, Clone)]
pub struct MotifArgs {
    /// Binary trace the motifs were mined from
    pub trace: PathBuf,

    /// Motif file (None = derive from `motif_dir` and the trace)
    pub motifs: Option<PathBuf>,

    pub motif_dir: PathBuf,

    /// Print in size-then-later-start order instead of file order
    pub sorted: bool,
}

impl Default for MotifArgs {
    fn default() -> Self {
        Self {
            trace: PathBuf::new(),
            motifs: None,
            motif_dir: PathBuf::from("motifs"),
            sorted: false,
        }
    }
}
