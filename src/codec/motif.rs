//! Binary motif file codec.
//!
//! ```text
//! motif_count
//!   motif* = node_count || node_index{node_count} || motif_index
//! ```
//!
//! Nodes are stored by their index in the owning trace, so decoding needs
//! the already-loaded trace to bind motifs back to.

use super::{Decoder, Encoder};
use crate::model::{Dataset, Motif, Trace};
use crate::utils::config::MOTIF_EXTENSION;
use crate::utils::error::TraceError;
use crate::utils::fs::write_atomic;
use log::debug;
use std::io::Write;
use std::path::{Path, PathBuf};

/// node_count + one index + motif_index
const MIN_MOTIF_SIZE: usize = 3 * 8;

/// `<motif_dir>/<dataset>/<base_id>.motifs`
pub fn motif_path(motif_dir: impl AsRef<Path>, dataset: Dataset, base_id: &str) -> PathBuf {
    motif_dir
        .as_ref()
        .join(dataset.name())
        .join(format!("{}.{}", base_id, MOTIF_EXTENSION))
}

/// Encode motifs in the order given
pub fn encode_motifs(motifs: &[Motif<'_>]) -> Vec<u8> {
    let mut enc = Encoder::new();
    enc.usize(motifs.len());
    for motif in motifs {
        enc.usize(motif.size());
        for &index in motif.node_indices() {
            enc.usize(index);
        }
        enc.i64(motif.motif_index());
    }
    enc.finish()
}

/// Decode motifs and bind them to `trace`
///
/// # Errors
/// * `TraceError::FormatIntegrity` - malformed payload, an empty motif, or
///   a node index outside `trace`
pub fn decode_motifs<'a>(bytes: &[u8], trace: &'a Trace) -> Result<Vec<Motif<'a>>, TraceError> {
    let mut dec = Decoder::new(bytes);

    let motif_count = dec.count("motif count", MIN_MOTIF_SIZE)?;
    let mut motifs = Vec::with_capacity(motif_count);
    for _ in 0..motif_count {
        let node_count = dec.count("motif node count", 8)?;
        let mut nodes = Vec::with_capacity(node_count);
        for _ in 0..node_count {
            nodes.push(dec.index("motif node index")?);
        }
        let motif_index = dec.i64("motif index")?;
        motifs.push(Motif::new(trace, nodes, motif_index)?);
    }

    dec.finish()?;
    Ok(motifs)
}

/// Write the motifs found in one trace (all-or-nothing)
pub fn write_motifs(path: impl AsRef<Path>, motifs: &[Motif<'_>]) -> Result<(), TraceError> {
    let path = path.as_ref();
    let bytes = encode_motifs(motifs);
    write_atomic(path, |w| w.write_all(&bytes).map_err(TraceError::from))?;
    debug!("{} motifs written to {}", motifs.len(), path.display());
    Ok(())
}

/// Read a motif file back against the trace it was mined from
pub fn read_motifs<'a>(path: impl AsRef<Path>, trace: &'a Trace) -> Result<Vec<Motif<'a>>, TraceError> {
    let bytes = std::fs::read(path)?;
    decode_motifs(&bytes, trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dataset, Node, NodeVariant};

    fn trace() -> Trace {
        let nodes = (0..4)
            .map(|i| Node::new(i.to_string(), "f", i * 10, NodeVariant::Event))
            .collect();
        Trace::new(nodes, Vec::new(), "ls", "t", Dataset::XTrace, None).unwrap()
    }

    #[test]
    fn test_layout() {
        let trace = trace();
        let motifs = vec![Motif::new(&trace, vec![3, 1], 9).unwrap()];
        let bytes = encode_motifs(&motifs);

        let words: Vec<i64> = bytes
            .chunks(8)
            .map(|c| i64::from_le_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(words, vec![1, 2, 3, 1, 9]);
    }

    #[test]
    fn test_decode_binds_to_trace() {
        let trace = trace();
        let motifs = vec![
            Motif::new(&trace, vec![0, 1], 4).unwrap(),
            Motif::new(&trace, vec![2, 3, 1], 5).unwrap(),
        ];

        let decoded = decode_motifs(&encode_motifs(&motifs), &trace).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[1].node_indices(), &[2, 3, 1]);
        assert_eq!(decoded[1].motif_index(), 5);
        assert_eq!(decoded[1].minimum_timestamp(), 10);
        assert!(std::ptr::eq(decoded[0].trace(), &trace));
    }

    #[test]
    fn test_index_out_of_range() {
        let trace = trace();
        let mut enc = Encoder::new();
        enc.usize(1);
        enc.usize(1);
        enc.usize(4);
        enc.i64(0);

        assert!(matches!(
            decode_motifs(&enc.finish(), &trace),
            Err(TraceError::FormatIntegrity(_))
        ));
    }
}
