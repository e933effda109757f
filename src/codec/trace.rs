//! Binary trace file codec.
//!
//! ```text
//! node_count
//!   node*   = index || id:string || timestamp || variant_tag || function_id:string
//! edge_count
//!   edge*   = source || destination || duration || variant:opt string
//! request_type:string || base_id:string || dataset_tag || request:opt string
//! ```

use super::{Decoder, Encoder};
use crate::model::{Dataset, Edge, Node, NodeVariant, Trace};
use crate::utils::error::TraceError;
use crate::utils::fs::write_atomic;
use log::debug;
use std::io::Write;
use std::path::Path;

const MIN_NODE_SIZE: usize = 5 * 8;
const MIN_EDGE_SIZE: usize = 4 * 8;

/// Encode a trace into its binary form
pub fn encode_trace(trace: &Trace) -> Vec<u8> {
    let mut enc = Encoder::new();

    enc.usize(trace.nodes().len());
    for node in trace.nodes() {
        enc.usize(node.index);
        enc.str(&node.id);
        enc.i64(node.timestamp);
        enc.i64(node.variant.tag());
        enc.str(&node.function_id);
    }

    enc.usize(trace.edges().len());
    for edge in trace.edges() {
        enc.usize(edge.source);
        enc.usize(edge.destination);
        enc.i64(edge.duration);
        enc.opt_str(edge.variant.as_deref());
    }

    enc.str(trace.request_type());
    enc.str(trace.base_id());
    enc.i64(trace.dataset().tag());
    enc.opt_str(trace.request());

    enc.finish()
}

/// Decode a trace from its binary form
///
/// # Errors
/// * `TraceError::FormatIntegrity` - declared counts or lengths disagree
///   with the payload, unknown tags, or out-of-range references
pub fn decode_trace(bytes: &[u8]) -> Result<Trace, TraceError> {
    let mut dec = Decoder::new(bytes);

    let node_count = dec.count("node count", MIN_NODE_SIZE)?;
    let mut nodes = Vec::with_capacity(node_count);
    for position in 0..node_count {
        let index = dec.index("node index")?;
        if index != position {
            return Err(TraceError::FormatIntegrity(format!(
                "node at position {} claims index {}",
                position, index
            )));
        }
        let id = dec.str("node id")?;
        let timestamp = dec.i64("node timestamp")?;
        let tag = dec.i64("node variant")?;
        let variant = NodeVariant::from_tag(tag)
            .ok_or_else(|| TraceError::FormatIntegrity(format!("unknown node variant tag {}", tag)))?;
        let function_id = dec.str("node function id")?;
        nodes.push(Node::new(id, function_id, timestamp, variant));
    }

    let edge_count = dec.count("edge count", MIN_EDGE_SIZE)?;
    let mut edges = Vec::with_capacity(edge_count);
    for _ in 0..edge_count {
        let source = dec.index("edge source")?;
        let destination = dec.index("edge destination")?;
        let duration = dec.i64("edge duration")?;
        let variant = dec.opt_str("edge variant")?;
        edges.push(Edge::new(source, destination, duration, variant));
    }

    let request_type = dec.str("request type")?;
    let base_id = dec.str("base id")?;
    let tag = dec.i64("dataset")?;
    let dataset = Dataset::from_tag(tag)
        .ok_or_else(|| TraceError::FormatIntegrity(format!("unknown dataset tag {}", tag)))?;
    let request = dec.opt_str("request")?;

    dec.finish()?;

    Trace::new(nodes, edges, request_type, base_id, dataset, request).map_err(|e| match e {
        TraceError::Schema(msg) => TraceError::FormatIntegrity(msg),
        other => other,
    })
}

/// Persist a trace to `path` (all-or-nothing)
pub fn write_trace(path: impl AsRef<Path>, trace: &Trace) -> Result<(), TraceError> {
    let path = path.as_ref();
    let bytes = encode_trace(trace);
    write_atomic(path, |w| w.write_all(&bytes).map_err(TraceError::from))?;
    debug!("Trace {} written ({} bytes)", trace.base_id(), bytes.len());
    Ok(())
}

/// Load a trace written by [`write_trace`]
pub fn read_trace(path: impl AsRef<Path>) -> Result<Trace, TraceError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    decode_trace(&bytes).map_err(|e| match e {
        TraceError::FormatIntegrity(msg) => {
            TraceError::FormatIntegrity(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_trace() -> Trace {
        Trace::new(
            vec![
                Node::new("1", "nova:boot", 100, NodeVariant::Entry),
                Node::new("2", "nova:note", 150, NodeVariant::Annotation),
                Node::new("1", "nova:boot", 400, NodeVariant::Exit),
            ],
            vec![
                Edge::new(0, 1, 50, Some("ChildOf".to_string())),
                Edge::new(1, 2, 250, None),
            ],
            "boot_delete",
            "abc-123",
            Dataset::OpenStack,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip() {
        let trace = sample_trace();
        let decoded = decode_trace(&encode_trace(&trace)).unwrap();

        assert_eq!(decoded, trace);
        assert_eq!(decoded.duration(), 300);
    }

    #[test]
    fn test_layout_starts_with_node_count() {
        let bytes = encode_trace(&sample_trace());
        assert_eq!(&bytes[..8], &3i64.to_le_bytes());
        // first node's index follows
        assert_eq!(&bytes[8..16], &0i64.to_le_bytes());
    }

    #[test]
    fn test_truncation_is_rejected() {
        let bytes = encode_trace(&sample_trace());
        for cut in [1, 8, bytes.len() / 2, bytes.len() - 1] {
            let result = decode_trace(&bytes[..bytes.len() - cut]);
            assert!(matches!(result, Err(TraceError::FormatIntegrity(_))), "cut {}", cut);
        }
    }

    #[test]
    fn test_trailing_bytes_are_rejected() {
        let mut bytes = encode_trace(&sample_trace());
        bytes.extend_from_slice(&[0; 8]);
        assert!(matches!(decode_trace(&bytes), Err(TraceError::FormatIntegrity(_))));
    }

    #[test]
    fn test_inflated_node_count_is_rejected() {
        let mut bytes = encode_trace(&sample_trace());
        bytes[..8].copy_from_slice(&4i64.to_le_bytes());
        assert!(matches!(decode_trace(&bytes), Err(TraceError::FormatIntegrity(_))));
    }

    #[test]
    fn test_out_of_range_edge_is_format_error() {
        let trace = sample_trace();
        let mut enc = Encoder::new();
        enc.usize(1);
        let node = &trace.nodes()[0];
        enc.usize(0);
        enc.str(&node.id);
        enc.i64(node.timestamp);
        enc.i64(node.variant.tag());
        enc.str(&node.function_id);
        enc.usize(1);
        enc.usize(0);
        enc.usize(5);
        enc.i64(0);
        enc.opt_str(None);
        enc.str("boot");
        enc.str("x");
        enc.i64(0);
        enc.opt_str(None);

        assert!(matches!(
            decode_trace(&enc.finish()),
            Err(TraceError::FormatIntegrity(_))
        ));
    }
}
