//! Source trace parsing.
//!
//! This module handles:
//! - Dispatching a raw JSON document to the parser for its dataset's format
//! - Span-graph documents (OpenStack)
//! - Causal-chain documents (X-Trace)
//! - The filename identity cross-check both formats share

pub mod causal_chain;
pub mod span_graph;

pub use causal_chain::parse_causal_chain;
pub use span_graph::parse_span_graph;

use crate::model::{Dataset, SourceFormat, Trace};
use crate::utils::error::TraceError;
use log::debug;
use std::fs;
use std::path::Path;

/// Parse one raw JSON document into a canonical trace
///
/// **Public** - main entry point for parsing
///
/// # Arguments
/// * `dataset` - Dataset the document belongs to; selects the source format
/// * `json` - Raw document text
/// * `filename` - Name of the file the document came from
pub fn parse_document(dataset: Dataset, json: &str, filename: &str) -> Result<Trace, TraceError> {
    match dataset.source_format() {
        SourceFormat::SpanGraph => parse_span_graph(json, filename),
        SourceFormat::CausalChain => parse_causal_chain(json, filename),
    }
}

/// Read and parse a JSON trace file
///
/// The file name (not the directory part of the path) is used for the
/// identity cross-check.
pub fn parse_trace_file(dataset: Dataset, path: impl AsRef<Path>) -> Result<Trace, TraceError> {
    let path = path.as_ref();
    debug!("Reading {} trace from {}", dataset, path.display());

    let json = fs::read_to_string(path)?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    parse_document(dataset, &json, &filename)
}

/// A trace's declared id must appear verbatim in its source filename
pub(crate) fn check_identity(id: &str, filename: &str) -> Result<(), TraceError> {
    if id.is_empty() || !filename.contains(id) {
        return Err(TraceError::IdentityMismatch {
            id: id.to_string(),
            filename: filename.to_string(),
        });
    }
    Ok(())
}
