//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod convert;
pub mod export;
pub mod models;
pub mod pool;
pub mod utils;

// Re-export main command functions
pub use convert::{convert_batch, convert_file, execute_convert, validate_args, ConversionReport};
pub use export::{execute_export, export_groups, ExportSummary, ExportedBatch};
pub use models::{ConvertArgs, ExportArgs, MotifArgs, StatsArgs};
pub use utils::{display_motifs, display_stats, display_version, inspect_trace};
