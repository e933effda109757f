//! Convert command implementation.
//!
//! The convert command:
//! 1. Lists the dataset's JSON documents
//! 2. Parses each one into a canonical trace
//! 3. Checks the request type against the configured enumeration
//! 4. Persists the trace into the store
//!
//! Documents are independent: one malformed document is reported and the
//! rest of the batch carries on.

use super::models::ConvertArgs;
use super::pool::run_parallel;
use crate::model::Dataset;
use crate::parser::parse_trace_file;
use crate::store::TraceStore;
use crate::utils::config::PipelineConfig;
use crate::utils::error::{ConversionFailure, TraceError};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::any::Any;
use std::collections::BTreeMap;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Outcome of converting a batch of documents
#[derive(Debug, Default)]
pub struct ConversionReport {
    /// Trace files written, in source order
    pub converted: Vec<PathBuf>,

    /// Documents that failed, in source order
    pub failures: Vec<ConversionFailure>,
}

impl ConversionReport {
    pub fn total(&self) -> usize {
        self.converted.len() + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failure count per invariant family
    pub fn failures_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut kinds = BTreeMap::new();
        for failure in &self.failures {
            *kinds.entry(failure.error.kind()).or_insert(0) += 1;
        }
        kinds
    }

    pub fn summary(&self) -> String {
        format!(
            "{} documents | {} converted | {} failed",
            self.total(),
            self.converted.len(),
            self.failures.len()
        )
    }
}

/// JSON documents of a dataset: `<json_dir>/<dataset>/*.json`, sorted
pub fn list_sources(json_dir: &Path, dataset: Dataset) -> Result<Vec<PathBuf>, TraceError> {
    let dir = json_dir.join(dataset.name());
    let mut sources = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            sources.push(path);
        }
    }
    sources.sort();
    Ok(sources)
}

/// Parse, validate and persist one document
///
/// **Public** - the unit of work of a batch
///
/// Nothing is written unless every check passes.
pub fn convert_file(
    dataset: Dataset,
    path: &Path,
    store: &TraceStore,
    config: &PipelineConfig,
) -> Result<PathBuf, TraceError> {
    let trace = parse_trace_file(dataset, path)?;
    config.check_request_type(dataset, trace.request_type())?;
    let written = store.save(&trace)?;
    debug!("{} -> {}", path.display(), written.display());
    Ok(written)
}

/// Run one conversion, recording a panic as that document's failure
pub fn isolate<F>(path: &Path, convert: F) -> Result<PathBuf, ConversionFailure>
where
    F: FnOnce() -> Result<PathBuf, TraceError>,
{
    panic::catch_unwind(AssertUnwindSafe(convert))
        .unwrap_or_else(|payload| Err(TraceError::Panicked(panic_message(payload.as_ref()))))
        .map_err(|error| ConversionFailure {
            path: path.to_path_buf(),
            error,
        })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

/// Convert documents concurrently, collecting per-document failures
pub fn convert_batch(
    dataset: Dataset,
    sources: &[PathBuf],
    store: &TraceStore,
    config: &PipelineConfig,
) -> ConversionReport {
    let outcomes = run_parallel(sources, config.worker_count(), |path| {
        isolate(path, || convert_file(dataset, path, store, config))
    });

    let mut report = ConversionReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(written) => report.converted.push(written),
            Err(failure) => {
                warn!("Skipping {}", failure);
                report.failures.push(failure);
            }
        }
    }
    report
}

/// Execute the convert command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// Only when the source directory cannot be listed. Per-document failures
/// are returned inside the report.
pub fn execute_convert(args: ConvertArgs) -> Result<ConversionReport> {
    let start_time = Instant::now();
    let config = &args.config;

    info!(
        "Converting {} documents from {}",
        args.dataset.human_readable(),
        config.json_dir.display()
    );

    let sources = list_sources(&config.json_dir, args.dataset).with_context(|| {
        format!(
            "Failed to list {} sources in {}",
            args.dataset,
            config.json_dir.display()
        )
    })?;
    debug!("Found {} documents", sources.len());

    check_enumeration(config, args.dataset);

    let store = TraceStore::new(&config.trace_dir);
    let report = convert_batch(args.dataset, &sources, &store, config);

    info!("{}", report.summary());
    for (kind, count) in report.failures_by_kind() {
        info!("  {} {} failures", count, kind);
    }
    info!("Conversion completed in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(report)
}

/// Warn when request types for `dataset` are not restricted; returns
/// whether they are
fn check_enumeration(config: &PipelineConfig, dataset: Dataset) -> bool {
    match config.allowed_request_types(dataset) {
        Some(types) => {
            debug!("{} request types restricted to {:?}", dataset, types);
            true
        }
        None => {
            warn!(
                "No request types configured for {}; every request type will be accepted",
                dataset
            );
            false
        }
    }
}

/// Validate convert arguments
///
/// **Public** - can be called before execute_convert for early validation
pub fn validate_args(args: &ConvertArgs) -> Result<()> {
    let source_dir = args.config.json_dir.join(args.dataset.name());
    if !source_dir.is_dir() {
        anyhow::bail!("Source directory does not exist: {}", source_dir.display());
    }

    if args.config.trace_dir.as_os_str().is_empty() {
        anyhow::bail!("Trace directory cannot be empty");
    }

    Ok(())
}
