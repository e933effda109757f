//! Format A: the whole batch as one graph.
//!
//! ```text
//! # t 1
//! v 0000000 0003      <- every node of every trace, renumbered globally
//! e 0000000 0000001   <- every edge, using the global numbers
//! ```

use super::labels::LabelIndex;
use crate::model::Trace;
use crate::utils::config::{GRAMI_HEADER, GRAMI_SUFFIX};
use crate::utils::error::OutputError;
use crate::utils::fs::{validate_path, write_atomic};
use log::info;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name for a request type's Format A graph
pub fn grami_filename(request_type: &str) -> String {
    format!("{}{}", request_type, GRAMI_SUFFIX)
}

/// Write a batch as a single Format A graph
///
/// Node numbers are assigned in traversal order across the concatenated
/// traces.
///
/// # Panics
/// If the same trace appears twice in `traces`: its nodes would be
/// renumbered twice, which the batch grouping must never produce.
pub fn write_grami<W: Write>(
    writer: &mut W,
    traces: &[&Trace],
    labels: &LabelIndex,
) -> Result<(), OutputError> {
    writeln!(writer, "{}", GRAMI_HEADER)?;

    let mut seen: HashSet<*const Trace> = HashSet::with_capacity(traces.len());
    let mut offsets = Vec::with_capacity(traces.len());
    let mut next = 0usize;

    for trace in traces {
        assert!(
            seen.insert(*trace as *const Trace),
            "trace {} encountered twice while renumbering nodes",
            trace.base_id()
        );
        offsets.push(next);

        for node in trace.nodes() {
            let label = labels.label(node.name())?;
            writeln!(writer, "v {:07} {:04}", next + node.index, label)?;
        }
        next += trace.nodes().len();
    }

    for (trace, offset) in traces.iter().zip(offsets) {
        for edge in trace.edges() {
            writeln!(
                writer,
                "e {:07} {:07}",
                offset + edge.source,
                offset + edge.destination
            )?;
        }
    }

    Ok(())
}

/// Write `<dir>/<request_type>-grami.lg` (all-or-nothing)
pub fn export_grami(
    dir: impl AsRef<Path>,
    request_type: &str,
    traces: &[&Trace],
    labels: &LabelIndex,
) -> Result<PathBuf, OutputError> {
    let path = dir.as_ref().join(grami_filename(request_type));
    validate_path(&path)?;

    write_atomic(&path, |w| write_grami(w, traces, labels))?;

    info!("Format A graph written to {} ({} traces)", path.display(), traces.len());
    Ok(path)
}
