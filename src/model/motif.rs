//! Motif instances: mined subgraph patterns bound back to a trace.

use super::node::Node;
use super::trace::Trace;
use crate::utils::error::TraceError;
use std::cmp::Ordering;

/// One occurrence of a recurring subgraph pattern inside a trace
///
/// Holds a borrowed reference to its trace and the indices of the nodes
/// taking part, in the order the miner reported them.
#[derive(Debug, Clone)]
pub struct Motif<'a> {
    trace: &'a Trace,
    nodes: Vec<usize>,
    motif_index: i64,
    minimum_timestamp: i64,
    maximum_timestamp: i64,
}

impl<'a> Motif<'a> {
    /// Bind a motif to a trace
    ///
    /// # Errors
    /// * `TraceError::FormatIntegrity` - no nodes, or an index outside the trace
    pub fn new(trace: &'a Trace, nodes: Vec<usize>, motif_index: i64) -> Result<Self, TraceError> {
        let mut timestamps = Vec::with_capacity(nodes.len());
        for &index in &nodes {
            let node = trace.node(index).ok_or_else(|| {
                TraceError::FormatIntegrity(format!(
                    "motif {} references node {} but trace {} has {} nodes",
                    motif_index,
                    index,
                    trace.base_id(),
                    trace.nodes().len()
                ))
            })?;
            timestamps.push(node.timestamp);
        }

        let (Some(&minimum_timestamp), Some(&maximum_timestamp)) =
            (timestamps.iter().min(), timestamps.iter().max())
        else {
            return Err(TraceError::FormatIntegrity(format!(
                "motif {} has no nodes",
                motif_index
            )));
        };

        Ok(Self {
            trace,
            nodes,
            motif_index,
            minimum_timestamp,
            maximum_timestamp,
        })
    }

    pub fn trace(&self) -> &'a Trace {
        self.trace
    }

    /// Indices of the participating nodes
    pub fn node_indices(&self) -> &[usize] {
        &self.nodes
    }

    pub fn nodes(&self) -> impl Iterator<Item = &'a Node> + '_ {
        let trace = self.trace;
        self.nodes.iter().filter_map(move |&i| trace.node(i))
    }

    /// Pattern identifier shared by every instance of the same pattern
    pub fn motif_index(&self) -> i64 {
        self.motif_index
    }

    pub fn minimum_timestamp(&self) -> i64 {
        self.minimum_timestamp
    }

    pub fn maximum_timestamp(&self) -> i64 {
        self.maximum_timestamp
    }

    pub fn duration(&self) -> i64 {
        self.maximum_timestamp - self.minimum_timestamp
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Rank order: smaller motifs first, then later-starting motifs first
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        self.size()
            .cmp(&other.size())
            .then_with(|| other.minimum_timestamp.cmp(&self.minimum_timestamp))
    }
}

/// Sort motifs by size, breaking ties by descending start time
pub fn sort_motifs(motifs: &mut [Motif<'_>]) {
    motifs.sort_by(Motif::rank_cmp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dataset, NodeVariant};
    use pretty_assertions::assert_eq;

    fn trace_with_timestamps(timestamps: &[i64]) -> Trace {
        let nodes = timestamps
            .iter()
            .enumerate()
            .map(|(i, &t)| Node::new(i.to_string(), "f", t, NodeVariant::Event))
            .collect();
        Trace::new(nodes, Vec::new(), "ls", "t1", Dataset::XTrace, None).unwrap()
    }

    #[test]
    fn test_derived_fields() {
        let trace = trace_with_timestamps(&[50, 10, 30]);
        let motif = Motif::new(&trace, vec![0, 2, 1], 7).unwrap();

        assert_eq!(motif.size(), 3);
        assert_eq!(motif.minimum_timestamp(), 10);
        assert_eq!(motif.maximum_timestamp(), 50);
        assert_eq!(motif.duration(), 40);
        assert_eq!(motif.motif_index(), 7);
    }

    #[test]
    fn test_sort_by_size_then_later_start() {
        // node timestamps chosen so each motif's minimum is as listed
        let trace = trace_with_timestamps(&[10, 11, 5, 6, 7, 20, 21]);
        let mut motifs = vec![
            Motif::new(&trace, vec![0, 1], 1).unwrap(),    // size 2, ts 10
            Motif::new(&trace, vec![2, 3, 4], 2).unwrap(), // size 3, ts 5
            Motif::new(&trace, vec![5, 6], 3).unwrap(),    // size 2, ts 20
        ];

        sort_motifs(&mut motifs);

        let order: Vec<(usize, i64)> = motifs
            .iter()
            .map(|m| (m.size(), m.minimum_timestamp()))
            .collect();
        assert_eq!(order, vec![(2, 20), (2, 10), (3, 5)]);
    }

    #[test]
    fn test_equal_rank_is_equivalent() {
        let trace = trace_with_timestamps(&[10, 12, 10, 15]);
        let a = Motif::new(&trace, vec![0, 1], 1).unwrap();
        let b = Motif::new(&trace, vec![2, 3], 2).unwrap();

        assert_eq!(a.rank_cmp(&b), Ordering::Equal);
        assert_eq!(b.rank_cmp(&a), Ordering::Equal);
    }

    #[test]
    fn test_rejects_out_of_range_and_empty() {
        let trace = trace_with_timestamps(&[1, 2]);
        assert!(Motif::new(&trace, vec![0, 2], 1).is_err());
        assert!(Motif::new(&trace, Vec::new(), 1).is_err());
    }
}
