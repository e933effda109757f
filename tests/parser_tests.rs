use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use trace_motifs::model::{Dataset, NodeVariant};
use trace_motifs::parser::{parse_causal_chain, parse_document, parse_span_graph};
use trace_motifs::utils::error::TraceError;

fn span(id: &str, function: &str, ts: i64, variant: &str) -> Value {
    json!({"span": {"trace_id": id, "tracepoint_id": function, "timestamp": ts, "variant": variant}})
}

fn weight(secs: i64, nanos: i64) -> Value {
    json!({"duration": {"secs": secs, "nanos": nanos}, "variant": "ChildOf"})
}

fn span_doc(nodes: Vec<Value>, edges: Vec<Value>) -> Value {
    let end = nodes.len().saturating_sub(1);
    json!({
        "g": {
            "nodes": nodes,
            "node_holes": [],
            "edge_property": "directed",
            "edges": edges,
        },
        "base_id": "abc123",
        "start_node": 0,
        "end_node": end,
        "request_type": "boot_delete",
    })
}

fn entry_exit_doc() -> Value {
    span_doc(
        vec![span("1", "nova:boot", 0, "Entry"), span("1", "nova:boot", 100, "Exit")],
        vec![json!([0, 1, weight(0, 100)])],
    )
}

fn report(event: &str, parents: &[&str], ts: i64, tag: Option<&str>) -> Value {
    let mut value = json!({
        "EventID": event,
        "ParentEventID": parents,
        "Source": "DataNode",
        "Label": "op",
        "Timestamp": ts,
    });
    if let Some(tag) = tag {
        value["Tag"] = json!([tag]);
    }
    value
}

#[test]
fn test_span_graph_entry_exit() {
    let trace = parse_span_graph(&entry_exit_doc().to_string(), "trace-abc123.json").unwrap();

    assert_eq!(trace.dataset(), Dataset::OpenStack);
    assert_eq!(trace.request_type(), "boot_delete");
    assert_eq!(trace.base_id(), "abc123");
    assert_eq!(trace.request(), None);
    assert_eq!(trace.nodes()[0].variant, NodeVariant::Entry);
    assert_eq!(trace.edges()[0].duration, 100);
    assert_eq!(trace.duration(), 100);

    let durations = trace.function_durations().unwrap();
    assert_eq!(durations["nova:boot"], vec![100]);
}

#[test]
fn test_span_graph_accepts_graph_key() {
    let mut doc = entry_exit_doc();
    let body = doc["g"].take();
    let doc = json!({
        "graph": body,
        "base_id": "abc123",
        "start_node": 0,
        "end_node": 1,
        "request_type": "boot_delete",
    });

    assert!(parse_span_graph(&doc.to_string(), "abc123.json").is_ok());
}

#[test]
fn test_node_holes_rejected() {
    let mut doc = entry_exit_doc();
    doc["g"]["node_holes"] = json!([3]);

    let result = parse_span_graph(&doc.to_string(), "abc123.json");
    assert!(matches!(result, Err(TraceError::Schema(_))));
}

#[test]
fn test_undirected_rejected() {
    let mut doc = entry_exit_doc();
    doc["g"]["edge_property"] = json!("undirected");

    let result = parse_span_graph(&doc.to_string(), "abc123.json");
    assert!(matches!(result, Err(TraceError::Schema(_))));
}

#[test]
fn test_extra_top_level_key_rejected() {
    let mut doc = entry_exit_doc();
    doc["comment"] = json!("hello");

    let result = parse_span_graph(&doc.to_string(), "abc123.json");
    assert!(matches!(result, Err(TraceError::Schema(_))));
}

#[test]
fn test_extra_graph_key_rejected() {
    let mut doc = entry_exit_doc();
    doc["g"]["weights"] = json!([]);

    let result = parse_span_graph(&doc.to_string(), "abc123.json");
    assert!(matches!(result, Err(TraceError::Schema(_))));
}

#[test]
fn test_missing_key_rejected() {
    let mut doc = entry_exit_doc();
    doc.as_object_mut().unwrap().remove("request_type");

    let result = parse_span_graph(&doc.to_string(), "abc123.json");
    assert!(matches!(result, Err(TraceError::Schema(_))));
}

#[test]
fn test_span_identity_mismatch() {
    let result = parse_span_graph(&entry_exit_doc().to_string(), "trace-zzz.json");
    assert!(matches!(result, Err(TraceError::IdentityMismatch { .. })));
}

#[test]
fn test_lone_exit_is_causality_error() {
    let doc = span_doc(vec![span("2", "nova:boot", 50, "Exit")], vec![]);

    let result = parse_span_graph(&doc.to_string(), "abc123.json");
    assert!(matches!(result, Err(TraceError::Causality(_))));
}

#[test]
fn test_unclosed_entry_is_tolerated() {
    let doc = span_doc(
        vec![span("1", "f", 0, "Entry"), span("9", "g", 5, "Annotation")],
        vec![json!([0, 1, weight(0, 5)])],
    );

    assert!(parse_span_graph(&doc.to_string(), "abc123.json").is_ok());
}

#[test]
fn test_one_nanosecond_edge_rejected() {
    let doc = span_doc(
        vec![span("1", "f", 0, "Entry"), span("1", "f", 1, "Exit")],
        vec![json!([0, 1, weight(0, 1)])],
    );

    let result = parse_span_graph(&doc.to_string(), "abc123.json");
    assert!(matches!(result, Err(TraceError::Schema(_))));
}

#[test]
fn test_edge_out_of_range_rejected() {
    let doc = span_doc(
        vec![span("1", "f", 0, "Entry"), span("1", "f", 10, "Exit")],
        vec![json!([0, 7, weight(0, 10)])],
    );

    let result = parse_span_graph(&doc.to_string(), "abc123.json");
    assert!(matches!(result, Err(TraceError::Schema(_))));
}

#[test]
fn test_causal_chain_edges_are_derived() {
    let doc = json!({
        "id": "x42",
        "reports": [
            report("a", &["0"], 100, Some("-ls /user")),
            report("b", &["a"], 130, Some("-ls /user")),
            report("c", &["a", "b"], 150, None),
        ]
    });

    let trace = parse_causal_chain(&doc.to_string(), "x42.json").unwrap();

    assert_eq!(trace.dataset(), Dataset::XTrace);
    assert_eq!(trace.request_type(), "ls");
    assert_eq!(trace.request(), Some("-ls /user"));
    let edges: Vec<(usize, usize, i64)> = trace
        .edges()
        .iter()
        .map(|e| (e.source, e.destination, e.duration))
        .collect();
    assert_eq!(edges, vec![(0, 1, 30), (0, 2, 50), (1, 2, 20)]);
    for edge in trace.edges() {
        let (parent, child) = trace.endpoints(edge).unwrap();
        assert_eq!(child.timestamp - parent.timestamp, edge.duration);
    }
}

#[test]
fn test_two_tags_is_cardinality_error() {
    let doc = json!({
        "id": "x42",
        "reports": [
            report("a", &[], 1, Some("-ls /a")),
            report("b", &["a"], 2, Some("-cat /b")),
        ]
    });

    let result = parse_causal_chain(&doc.to_string(), "x42.json");
    assert!(matches!(result, Err(TraceError::Cardinality(_))));
}

#[test]
fn test_no_tag_is_cardinality_error() {
    let doc = json!({"id": "x42", "reports": [report("a", &[], 1, None)]});

    let result = parse_causal_chain(&doc.to_string(), "x42.json");
    assert!(matches!(result, Err(TraceError::Cardinality(_))));
}

#[test]
fn test_negative_duration_is_causality_error() {
    let doc = json!({
        "id": "x42",
        "reports": [
            report("a", &[], 100, Some("-ls")),
            report("b", &["a"], 90, None),
        ]
    });

    let result = parse_causal_chain(&doc.to_string(), "x42.json");
    assert!(matches!(result, Err(TraceError::Causality(_))));
}

#[test]
fn test_dangling_parent_is_dropped() {
    let doc = json!({
        "id": "x42",
        "reports": [
            report("a", &[], 100, Some("-ls")),
            report("b", &["a", "ghost"], 110, None),
        ]
    });

    let trace = parse_causal_chain(&doc.to_string(), "x42.json").unwrap();
    assert_eq!(trace.edges().len(), 1);
}

#[test]
fn test_causal_identity_mismatch() {
    let doc = json!({"id": "x42", "reports": [report("a", &[], 1, Some("-ls"))]});

    let result = parse_causal_chain(&doc.to_string(), "x43.json");
    assert!(matches!(result, Err(TraceError::IdentityMismatch { .. })));
}

#[test]
fn test_dispatch_by_dataset() {
    let span_json = entry_exit_doc().to_string();

    assert!(parse_document(Dataset::OpenStack, &span_json, "abc123.json").is_ok());
    // a span graph is not a causal chain
    assert!(matches!(
        parse_document(Dataset::XTrace, &span_json, "abc123.json"),
        Err(TraceError::Schema(_))
    ));
}
