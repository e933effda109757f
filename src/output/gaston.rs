//! Format B: one transaction per trace.
//!
//! ```text
//! t # 0
//! v 0000000 0003      <- the trace's own node indices
//! e 0000000 0000001
//! t # 1
//! ...
//! ```

use super::labels::LabelIndex;
use crate::model::Trace;
use crate::utils::config::GASTON_SUFFIX;
use crate::utils::error::OutputError;
use crate::utils::fs::{validate_path, write_atomic};
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name for a request type's Format B graph set
pub fn gaston_filename(request_type: &str) -> String {
    format!("{}{}", request_type, GASTON_SUFFIX)
}

/// Write a batch as independent Format B transactions
pub fn write_gaston<W: Write>(
    writer: &mut W,
    traces: &[&Trace],
    labels: &LabelIndex,
) -> Result<(), OutputError> {
    for (trace_index, trace) in traces.iter().enumerate() {
        writeln!(writer, "t # {}", trace_index)?;

        for node in trace.nodes() {
            let label = labels.label(node.name())?;
            writeln!(writer, "v {:07} {:04}", node.index, label)?;
        }

        for edge in trace.edges() {
            writeln!(writer, "e {:07} {:07}", edge.source, edge.destination)?;
        }
    }

    Ok(())
}

/// Write `<dir>/<request_type>-gaston.lg` (all-or-nothing)
pub fn export_gaston(
    dir: impl AsRef<Path>,
    request_type: &str,
    traces: &[&Trace],
    labels: &LabelIndex,
) -> Result<PathBuf, OutputError> {
    let path = dir.as_ref().join(gaston_filename(request_type));
    validate_path(&path)?;

    write_atomic(&path, |w| write_gaston(w, traces, labels))?;

    info!("Format B graph written to {} ({} traces)", path.display(), traces.len());
    Ok(path)
}
