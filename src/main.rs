//! Trace Motifs CLI
//!
//! Converts raw trace documents into binary traces, exports them for
//! subgraph miners, and inspects the results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use trace_motifs::commands::{
    display_motifs, display_stats, display_version, execute_convert, execute_export,
    inspect_trace, validate_args, ConvertArgs, ExportArgs, MotifArgs, StatsArgs,
};
use trace_motifs::model::Dataset;
use trace_motifs::utils::config::PipelineConfig;

/// Trace Motifs - canonical traces for frequent-subgraph mining
#[derive(Parser, Debug)]
#[command(name = "trace-motifs")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Pipeline configuration file (TOML)
    #[arg(short, long, global = true, env = "TRACE_MOTIFS_CONFIG")]
    config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a dataset's JSON documents into binary traces
    Convert {
        /// Dataset to convert
        #[arg(short, long, value_enum)]
        dataset: Dataset,

        /// Directory holding <dataset>/*.json
        #[arg(long)]
        json_dir: Option<PathBuf>,

        /// Root of the trace store
        #[arg(long)]
        trace_dir: Option<PathBuf>,

        /// Worker threads (default: all cores)
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Export stored traces as Format A and Format B graphs
    Export {
        #[arg(short, long, value_enum)]
        dataset: Dataset,

        /// Only these request types (labels still cover the whole dataset)
        #[arg(short, long = "request-type")]
        request_types: Vec<String>,

        #[arg(long)]
        trace_dir: Option<PathBuf>,

        /// Root of the exported graph files
        #[arg(long)]
        graph_dir: Option<PathBuf>,

        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Inspect a binary trace file
    Inspect {
        /// Path to a .trace file
        #[arg(short, long)]
        file: PathBuf,

        /// Print every node and edge
        #[arg(long)]
        graph: bool,
    },

    /// Decode a motif file against the trace it was mined from
    Motifs {
        /// Path to the .trace file
        #[arg(short, long)]
        trace: PathBuf,

        /// Path to the .motifs file (default: <motif_dir>/<dataset>/<base_id>.motifs)
        #[arg(short, long)]
        motifs: Option<PathBuf>,

        /// Sort by size, later starts first
        #[arg(long)]
        sorted: bool,
    },

    /// Duration statistics for a stored dataset
    Stats {
        #[arg(short, long, value_enum)]
        dataset: Dataset,

        #[arg(long)]
        trace_dir: Option<PathBuf>,

        /// Include per-function Entry-to-Exit durations
        #[arg(long)]
        functions: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    // Execute command
    match cli.command {
        Commands::Convert {
            dataset,
            json_dir,
            trace_dir,
            workers,
        } => {
            if let Some(dir) = json_dir {
                config.json_dir = dir;
            }
            if let Some(dir) = trace_dir {
                config.trace_dir = dir;
            }
            if workers.is_some() {
                config.workers = workers;
            }

            let args = ConvertArgs { dataset, config };

            // Validate args first
            validate_args(&args)?;

            let report = execute_convert(args)?;
            if !report.is_clean() {
                for failure in &report.failures {
                    eprintln!("✗ {} [{}]", failure, failure.error.kind());
                }
                anyhow::bail!(
                    "{} of {} documents failed to convert",
                    report.failures.len(),
                    report.total()
                );
            }
        }

        Commands::Export {
            dataset,
            request_types,
            trace_dir,
            graph_dir,
            workers,
        } => {
            if let Some(dir) = trace_dir {
                config.trace_dir = dir;
            }
            if let Some(dir) = graph_dir {
                config.graph_dir = dir;
            }
            if workers.is_some() {
                config.workers = workers;
            }

            execute_export(ExportArgs {
                dataset,
                config,
                request_types,
            })?;
        }

        Commands::Inspect { file, graph } => {
            inspect_trace(&file, graph)?;
        }

        Commands::Motifs {
            trace,
            motifs,
            sorted,
        } => {
            display_motifs(&MotifArgs {
                trace,
                motifs,
                motif_dir: config.motif_dir,
                sorted,
            })?;
        }

        Commands::Stats {
            dataset,
            trace_dir,
            functions,
        } => {
            display_stats(&StatsArgs {
                dataset,
                trace_dir: trace_dir.unwrap_or(config.trace_dir),
                functions,
            })?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
