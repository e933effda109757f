//! Parser for span-graph traces (the OpenStack dataset).
//!
//! The document is a serialized directed graph: a node array of spans
//! (Entry/Exit/Annotation events) and an edge array of
//! `[source, destination, weight]` triples indexing into it. The schema is
//! closed; any missing or extra top-level or graph key is an error.

use super::check_identity;
use crate::model::{Dataset, Edge, Node, NodeVariant, Trace};
use crate::utils::config::{ANOMALOUS_EDGE_DURATION, NANOS_PER_SECOND};
use crate::utils::error::TraceError;
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, warn};
use serde::Deserialize;

/// Top-level span-graph document
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpanGraphDocument {
    #[serde(rename = "g", alias = "graph")]
    graph: GraphBody,
    base_id: String,
    start_node: usize,
    end_node: usize,
    request_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GraphBody {
    nodes: Vec<JsonNode>,
    node_holes: Vec<serde_json::Value>,
    edge_property: String,
    edges: Vec<(usize, usize, JsonEdgeWeight)>,
}

#[derive(Debug, Deserialize)]
struct JsonNode {
    span: JsonSpan,
}

#[derive(Debug, Deserialize)]
struct JsonSpan {
    /// Identifier shared by a span's Entry and Exit
    trace_id: JsonId,
    /// The function being traced
    tracepoint_id: String,
    timestamp: JsonTimestamp,
    variant: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonId {
    Text(String),
    Number(serde_json::Number),
}

impl JsonId {
    fn into_string(self) -> String {
        match self {
            JsonId::Text(s) => s,
            JsonId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonTimestamp {
    Nanos(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct JsonEdgeWeight {
    duration: JsonDuration,
    variant: String,
}

#[derive(Debug, Deserialize)]
struct JsonDuration {
    secs: i64,
    nanos: i64,
}

/// Parse a span-graph JSON document into a canonical trace
///
/// **Public** - entry point used by the format dispatcher
///
/// # Arguments
/// * `json` - Raw document text
/// * `filename` - Source file name; must contain the document's `base_id`
///
/// # Errors
/// * `TraceError::Schema` - closed-schema violation, node holes, undirected
///   graph, unparseable timestamp, 1ns edge, out-of-range index
/// * `TraceError::IdentityMismatch` - `base_id` absent from `filename`
/// * `TraceError::Causality` - negative edge duration, unmatched Entry/Exit
pub fn parse_span_graph(json: &str, filename: &str) -> Result<Trace, TraceError> {
    let document: SpanGraphDocument = serde_json::from_str(json)?;
    let graph = document.graph;

    check_identity(&document.base_id, filename)?;

    if !graph.node_holes.is_empty() {
        return Err(TraceError::Schema(format!(
            "{} node holes present; sparse node indices are unsupported",
            graph.node_holes.len()
        )));
    }

    if graph.edge_property != "directed" {
        return Err(TraceError::Schema(format!(
            "edge_property must be 'directed', found '{}'",
            graph.edge_property
        )));
    }

    for (key, position) in [("start_node", document.start_node), ("end_node", document.end_node)] {
        if position >= graph.nodes.len() {
            return Err(TraceError::Schema(format!(
                "{} {} is outside the {} graph nodes",
                key,
                position,
                graph.nodes.len()
            )));
        }
    }

    let nodes = graph
        .nodes
        .into_iter()
        .map(convert_node)
        .collect::<Result<Vec<_>, _>>()?;

    let edges = graph
        .edges
        .into_iter()
        .map(|(source, destination, weight)| convert_edge(source, destination, weight))
        .collect::<Result<Vec<_>, _>>()?;

    let trace = Trace::new(
        nodes,
        edges,
        document.request_type,
        document.base_id,
        Dataset::OpenStack,
        None,
    )?;

    let spans = trace.function_spans()?;
    if !spans.unclosed.is_empty() {
        warn!(
            "Trace {}: {} entries never exit ({})",
            trace.base_id(),
            spans.unclosed.len(),
            spans.unclosed.join(", ")
        );
    }

    debug!(
        "Parsed span graph {}: {} nodes, {} edges",
        trace.base_id(),
        trace.nodes().len(),
        trace.edges().len()
    );

    Ok(trace)
}

fn convert_node(json_node: JsonNode) -> Result<Node, TraceError> {
    let span = json_node.span;
    let variant: NodeVariant = span.variant.parse().map_err(TraceError::Schema)?;
    let timestamp = parse_timestamp(&span.timestamp)?;

    Ok(Node::new(
        span.trace_id.into_string(),
        span.tracepoint_id,
        timestamp,
        variant,
    ))
}

fn convert_edge(source: usize, destination: usize, weight: JsonEdgeWeight) -> Result<Edge, TraceError> {
    let JsonDuration { secs, nanos } = weight.duration;
    let duration = secs
        .checked_mul(NANOS_PER_SECOND)
        .and_then(|d| d.checked_add(nanos))
        .ok_or_else(|| {
            TraceError::Schema(format!("edge {} -> {} duration overflows", source, destination))
        })?;

    if duration < 0 {
        return Err(TraceError::Causality(format!(
            "edge {} -> {} has negative duration {}",
            source, destination, duration
        )));
    }

    if duration == ANOMALOUS_EDGE_DURATION {
        return Err(TraceError::Schema(format!(
            "edge {} -> {} has an anomalous {}ns duration",
            source, destination, duration
        )));
    }

    Ok(Edge::new(source, destination, duration, Some(weight.variant)))
}

/// Convert a span timestamp to nanoseconds since the epoch
///
/// Accepts RFC 3339 strings, offset-less ISO 8601 strings (read as UTC)
/// and raw integer nanoseconds.
pub fn parse_timestamp_str(raw: &str) -> Result<i64, TraceError> {
    let datetime = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .map_err(|e| TraceError::Schema(format!("invalid timestamp '{}': {}", raw, e)))?
            .and_utc(),
    };

    datetime
        .timestamp_nanos_opt()
        .ok_or_else(|| TraceError::Schema(format!("timestamp '{}' out of range", raw)))
}

fn parse_timestamp(raw: &JsonTimestamp) -> Result<i64, TraceError> {
    match raw {
        JsonTimestamp::Nanos(n) => Ok(*n),
        JsonTimestamp::Text(s) => parse_timestamp_str(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp_str("1970-01-01T00:00:01.5").unwrap(), 1_500_000_000);
        assert_eq!(parse_timestamp_str("1970-01-01 00:00:02").unwrap(), 2_000_000_000);
        assert_eq!(
            parse_timestamp_str("1970-01-01T01:00:00+01:00").unwrap(),
            0
        );
        assert_eq!(
            parse_timestamp_str("1970-01-01T00:00:00.000000100Z").unwrap(),
            100
        );
        assert!(parse_timestamp_str("yesterday").is_err());
    }

    #[test]
    fn test_edge_duration_conversion() {
        let weight = JsonEdgeWeight {
            duration: JsonDuration { secs: 2, nanos: 5 },
            variant: "ChildOf".to_string(),
        };
        let edge = convert_edge(0, 1, weight).unwrap();
        assert_eq!(edge.duration, 2_000_000_005);
        assert_eq!(edge.variant.as_deref(), Some("ChildOf"));
    }

    #[test]
    fn test_one_nanosecond_edge_is_rejected() {
        let weight = JsonEdgeWeight {
            duration: JsonDuration { secs: 0, nanos: 1 },
            variant: "ChildOf".to_string(),
        };
        assert!(matches!(convert_edge(0, 1, weight), Err(TraceError::Schema(_))));
    }

    #[test]
    fn test_zero_duration_edge_is_valid() {
        let weight = JsonEdgeWeight {
            duration: JsonDuration { secs: 0, nanos: 0 },
            variant: "FollowsFrom".to_string(),
        };
        assert_eq!(convert_edge(3, 4, weight).unwrap().duration, 0);
    }

    #[test]
    fn test_numeric_node_id() {
        let node: JsonNode = serde_json::from_str(
            r#"{"span": {"trace_id": 17, "tracepoint_id": "f", "timestamp": 5, "variant": "Annotation"}}"#,
        )
        .unwrap();
        let node = convert_node(node).unwrap();
        assert_eq!(node.id, "17");
        assert_eq!(node.timestamp, 5);
        assert_eq!(node.variant, NodeVariant::Annotation);
    }
}
