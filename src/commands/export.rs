//! Export command implementation.
//!
//! The export command:
//! 1. Loads every stored trace of a dataset
//! 2. Builds and freezes the dataset-wide label index
//! 3. Writes `labels.txt`
//! 4. Writes Format A and Format B files per request type, concurrently

use super::models::ExportArgs;
use super::pool::run_parallel;
use crate::model::{Dataset, Trace};
use crate::output::{export_gaston, export_grami, LabelIndex};
use crate::store::TraceStore;
use crate::utils::config::LABELS_FILENAME;
use crate::utils::error::OutputError;
use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Files written for one `(dataset, request_type)` batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedBatch {
    pub request_type: String,
    pub trace_count: usize,
    pub grami: PathBuf,
    pub gaston: PathBuf,
}

/// Everything an export run wrote
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub labels: PathBuf,
    pub label_count: usize,
    pub batches: Vec<ExportedBatch>,
}

/// Directory holding a dataset's graph files
pub fn graph_dataset_dir(graph_dir: &Path, dataset: Dataset) -> PathBuf {
    graph_dir.join(dataset.name())
}

/// Write both formats for one batch with a shared, frozen label index
pub fn export_batch(
    dir: &Path,
    request_type: &str,
    traces: &[&Trace],
    labels: &LabelIndex,
) -> Result<ExportedBatch, OutputError> {
    let grami = export_grami(dir, request_type, traces, labels)?;
    let gaston = export_gaston(dir, request_type, traces, labels)?;
    Ok(ExportedBatch {
        request_type: request_type.to_string(),
        trace_count: traces.len(),
        grami,
        gaston,
    })
}

/// Export already-grouped traces
///
/// **Public** - shared by the export command and tests
///
/// # Arguments
/// * `groups` - Every trace of the dataset, by request type. The label
///   index is built over all of them.
/// * `selected` - Request types to write (empty = all)
pub fn export_groups(
    dir: &Path,
    groups: &BTreeMap<String, Vec<Trace>>,
    selected: &[String],
    workers: usize,
) -> Result<ExportSummary, OutputError> {
    // First pass: every name in the dataset, then freeze
    let labels = LabelIndex::from_traces(groups.values().flatten());
    debug!("Label index holds {} names", labels.len());

    let labels_path = dir.join(LABELS_FILENAME);
    labels.write_file(&labels_path)?;

    let batches: Vec<(&str, Vec<&Trace>)> = groups
        .iter()
        .filter(|(request_type, _)| selected.is_empty() || selected.contains(*request_type))
        .map(|(request_type, traces)| (request_type.as_str(), traces.iter().collect()))
        .collect();

    // Second pass: encode, sharing the frozen index read-only
    let written = run_parallel(&batches, workers, |(request_type, traces)| {
        export_batch(dir, request_type, traces, &labels)
    });

    Ok(ExportSummary {
        labels: labels_path,
        label_count: labels.len(),
        batches: written.into_iter().collect::<Result<_, _>>()?,
    })
}

/// Execute the export command
///
/// **Public** - main entry point called from main.rs
pub fn execute_export(args: ExportArgs) -> Result<ExportSummary> {
    let start_time = Instant::now();
    let config = &args.config;

    let store = TraceStore::new(&config.trace_dir);
    let groups = store
        .load_dataset(args.dataset)
        .with_context(|| format!("Failed to load {} traces from {}", args.dataset, config.trace_dir.display()))?;

    for wanted in &args.request_types {
        if !groups.contains_key(wanted) {
            anyhow::bail!("No {} traces with request type '{}'", args.dataset, wanted);
        }
    }

    let dir = graph_dataset_dir(&config.graph_dir, args.dataset);
    let summary = export_groups(&dir, &groups, &args.request_types, config.worker_count())
        .context("Failed to export graphs")?;

    info!("✓ Labels written to: {} ({} names)", summary.labels.display(), summary.label_count);
    for batch in &summary.batches {
        info!("✓ {}: {} traces", batch.request_type, batch.trace_count);
    }
    info!("Export completed in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(summary)
}
