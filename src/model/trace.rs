//! The canonical trace graph.
//!
//! A `Trace` owns its nodes and edges exclusively. Edges refer to nodes by
//! position, so a trace can be encoded, decoded and exported without any
//! cross-structure references.

use super::dataset::Dataset;
use super::edge::Edge;
use super::node::{Node, NodeVariant};
use crate::utils::error::TraceError;
use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One complete request execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    request_type: String,
    base_id: String,
    dataset: Dataset,
    request: Option<String>,
    minimum_timestamp: i64,
    maximum_timestamp: i64,
}

/// Entry/Exit pairing result for one trace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionSpans {
    /// Entry-to-Exit durations per function, in node order
    pub durations: BTreeMap<String, Vec<i64>>,

    /// Ids of entries that never saw their Exit
    pub unclosed: Vec<String>,
}

impl Trace {
    /// Build a trace from fully parsed parts
    ///
    /// **Public** - the only constructor; traces are never mutated afterwards
    ///
    /// Nodes are re-indexed to their position. Fails with
    /// `TraceError::Schema` for an empty node list or an edge endpoint that
    /// is not a node of this trace.
    pub fn new(
        mut nodes: Vec<Node>,
        edges: Vec<Edge>,
        request_type: impl Into<String>,
        base_id: impl Into<String>,
        dataset: Dataset,
        request: Option<String>,
    ) -> Result<Self, TraceError> {
        let base_id = base_id.into();

        if nodes.is_empty() {
            return Err(TraceError::Schema(format!("trace {} has no nodes", base_id)));
        }

        for (position, node) in nodes.iter_mut().enumerate() {
            node.index = position;
        }

        for edge in &edges {
            if edge.source >= nodes.len() || edge.destination >= nodes.len() {
                return Err(TraceError::Schema(format!(
                    "edge {} -> {} references a node outside 0..{}",
                    edge.source,
                    edge.destination,
                    nodes.len()
                )));
            }
        }

        let minimum_timestamp = nodes.iter().map(|n| n.timestamp).min().unwrap_or(0);
        let maximum_timestamp = nodes.iter().map(|n| n.timestamp).max().unwrap_or(0);

        // Every duration inside the trace is bounded by this span
        if maximum_timestamp.checked_sub(minimum_timestamp).is_none() {
            return Err(TraceError::Schema(format!(
                "trace {} spans {}..{}, which does not fit in 64 bits",
                base_id, minimum_timestamp, maximum_timestamp
            )));
        }

        Ok(Self {
            nodes,
            edges,
            request_type: request_type.into(),
            base_id,
            dataset,
            request,
            minimum_timestamp,
            maximum_timestamp,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Source and destination nodes of an edge, if both belong to this trace
    pub fn endpoints(&self, edge: &Edge) -> Option<(&Node, &Node)> {
        Some((self.node(edge.source)?, self.node(edge.destination)?))
    }

    pub fn request_type(&self) -> &str {
        &self.request_type
    }

    pub fn base_id(&self) -> &str {
        &self.base_id
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    /// Full causal tag for causal-chain traces
    pub fn request(&self) -> Option<&str> {
        self.request.as_deref()
    }

    pub fn minimum_timestamp(&self) -> i64 {
        self.minimum_timestamp
    }

    pub fn maximum_timestamp(&self) -> i64 {
        self.maximum_timestamp
    }

    /// Wall-clock span of the trace in nanoseconds
    pub fn duration(&self) -> i64 {
        self.maximum_timestamp - self.minimum_timestamp
    }

    /// Pair every Exit with the open Entry of the same id
    ///
    /// **Public** - used by the span-graph parser for validation and by
    /// statistics consumers for per-function durations
    ///
    /// # Errors
    /// * `TraceError::Causality` - an Exit without an open Entry, or a
    ///   second Entry while one is still open for the same id
    pub fn function_spans(&self) -> Result<FunctionSpans, TraceError> {
        let mut open: HashMap<&str, i64> = HashMap::new();
        let mut spans = FunctionSpans::default();

        for node in &self.nodes {
            match node.variant {
                NodeVariant::Entry => {
                    if open.insert(node.id.as_str(), node.timestamp).is_some() {
                        return Err(TraceError::Causality(format!(
                            "entry {} (node {}) opened twice",
                            node.id, node.index
                        )));
                    }
                }
                NodeVariant::Exit => {
                    let Some(entered) = open.remove(node.id.as_str()) else {
                        return Err(TraceError::Causality(format!(
                            "exit {} (node {}) has no open entry",
                            node.id, node.index
                        )));
                    };
                    spans
                        .durations
                        .entry(node.function_id.clone())
                        .or_default()
                        .push(node.timestamp - entered);
                }
                NodeVariant::Annotation | NodeVariant::Event => {}
            }
        }

        let mut unclosed: Vec<String> = open.into_keys().map(str::to_string).collect();
        unclosed.sort();
        if !unclosed.is_empty() {
            debug!("Trace {} has {} unclosed entries", self.base_id, unclosed.len());
        }
        spans.unclosed = unclosed;

        Ok(spans)
    }

    /// Entry-to-Exit durations per function
    pub fn function_durations(&self) -> Result<BTreeMap<String, Vec<i64>>, TraceError> {
        Ok(self.function_spans()?.durations)
    }
}

/// Every distinct node name across a set of traces, sorted
pub fn unique_names<'a>(traces: impl IntoIterator<Item = &'a Trace>) -> BTreeSet<String> {
    traces
        .into_iter()
        .flat_map(|trace| trace.nodes().iter().map(|node| node.name().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_trace(nodes: Vec<Node>) -> Result<Trace, TraceError> {
        Trace::new(nodes, Vec::new(), "boot", "abc", Dataset::OpenStack, None)
    }

    #[test]
    fn test_reindexes_nodes() {
        let mut node = Node::new("1", "f", 5, NodeVariant::Entry);
        node.index = 42;
        let trace = span_trace(vec![node, Node::new("1", "f", 9, NodeVariant::Exit)]).unwrap();

        assert_eq!(trace.nodes()[0].index, 0);
        assert_eq!(trace.nodes()[1].index, 1);
    }

    #[test]
    fn test_derived_timestamps() {
        let trace = span_trace(vec![
            Node::new("a", "f", 30, NodeVariant::Annotation),
            Node::new("b", "g", 10, NodeVariant::Annotation),
            Node::new("c", "h", 25, NodeVariant::Annotation),
        ])
        .unwrap();

        assert_eq!(trace.minimum_timestamp(), 10);
        assert_eq!(trace.maximum_timestamp(), 30);
        assert_eq!(trace.duration(), 20);
    }

    #[test]
    fn test_rejects_dangling_edge() {
        let result = Trace::new(
            vec![Node::new("a", "f", 0, NodeVariant::Event)],
            vec![Edge::new(0, 3, 0, None)],
            "ls",
            "abc",
            Dataset::XTrace,
            None,
        );
        assert!(matches!(result, Err(TraceError::Schema(_))));
    }

    #[test]
    fn test_rejects_span_wider_than_i64() {
        let result = span_trace(vec![
            Node::new("a", "f", i64::MIN, NodeVariant::Annotation),
            Node::new("b", "f", i64::MAX, NodeVariant::Annotation),
        ]);
        assert!(matches!(result, Err(TraceError::Schema(_))));

        let widest = span_trace(vec![
            Node::new("a", "f", -1, NodeVariant::Annotation),
            Node::new("b", "f", i64::MAX - 1, NodeVariant::Annotation),
        ])
        .unwrap();
        assert_eq!(widest.duration(), i64::MAX);
    }

    #[test]
    fn test_extreme_entry_exit_pair_is_rejected_at_construction() {
        let result = span_trace(vec![
            Node::new("1", "f", i64::MIN, NodeVariant::Entry),
            Node::new("1", "f", i64::MAX, NodeVariant::Exit),
        ]);
        assert!(matches!(result, Err(TraceError::Schema(_))));
    }

    #[test]
    fn test_endpoints_of_foreign_edge() {
        let trace = span_trace(vec![
            Node::new("a", "f", 0, NodeVariant::Annotation),
            Node::new("b", "g", 5, NodeVariant::Annotation),
        ])
        .unwrap();

        let (source, destination) = trace.endpoints(&Edge::new(0, 1, 5, None)).unwrap();
        assert_eq!((source.id.as_str(), destination.id.as_str()), ("a", "b"));
        assert!(trace.endpoints(&Edge::new(1, 9, 0, None)).is_none());
    }

    #[test]
    fn test_rejects_empty_trace() {
        assert!(matches!(span_trace(Vec::new()), Err(TraceError::Schema(_))));
    }

    #[test]
    fn test_function_duration_entry_exit() {
        let trace = span_trace(vec![
            Node::new("1", "nova:boot", 0, NodeVariant::Entry),
            Node::new("1", "nova:boot", 100, NodeVariant::Exit),
        ])
        .unwrap();

        let durations = trace.function_durations().unwrap();
        assert_eq!(durations["nova:boot"], vec![100]);
    }

    #[test]
    fn test_unmatched_exit_is_causality_error() {
        let trace = span_trace(vec![Node::new("2", "f", 7, NodeVariant::Exit)]).unwrap();
        assert!(matches!(trace.function_spans(), Err(TraceError::Causality(_))));
    }

    #[test]
    fn test_double_entry_is_causality_error() {
        let trace = span_trace(vec![
            Node::new("1", "f", 0, NodeVariant::Entry),
            Node::new("1", "f", 1, NodeVariant::Entry),
        ])
        .unwrap();
        assert!(matches!(trace.function_spans(), Err(TraceError::Causality(_))));
    }

    #[test]
    fn test_reentry_after_exit_is_allowed() {
        let trace = span_trace(vec![
            Node::new("1", "f", 0, NodeVariant::Entry),
            Node::new("1", "f", 4, NodeVariant::Exit),
            Node::new("1", "f", 10, NodeVariant::Entry),
            Node::new("1", "f", 13, NodeVariant::Exit),
            Node::new("9", "g", 20, NodeVariant::Entry),
        ])
        .unwrap();

        let spans = trace.function_spans().unwrap();
        assert_eq!(spans.durations["f"], vec![4, 3]);
        assert_eq!(spans.unclosed, vec!["9".to_string()]);
    }
}
