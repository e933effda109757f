//! Parser for causal-chain traces (the X-Trace dataset).
//!
//! Each report is a point event naming its parents by event id. Edges are
//! derived from those links and their durations computed from timestamps.
//! All reports of one trace carry the same causal tag, which names the
//! request.

use super::check_identity;
use crate::model::{Dataset, Edge, Node, NodeVariant, Trace};
use crate::utils::config::{IGNORED_TAG, ROOT_PARENT_ID, SOURCELESS_LABELS};
use crate::utils::error::TraceError;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CausalChainDocument {
    id: String,
    reports: Vec<Report>,
}

/// One X-Trace report; unknown report fields (host, process, ...) are ignored
#[derive(Debug, Deserialize)]
struct Report {
    #[serde(rename = "EventID")]
    event_id: String,

    #[serde(rename = "ParentEventID")]
    parent_event_ids: Vec<String>,

    #[serde(rename = "Tag", default)]
    tag: Option<Vec<String>>,

    #[serde(rename = "Source", default)]
    source: Option<String>,

    #[serde(rename = "Label")]
    label: String,

    #[serde(rename = "Timestamp")]
    timestamp: JsonInteger,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonInteger {
    Number(i64),
    Text(String),
}

impl JsonInteger {
    fn to_i64(&self) -> Result<i64, TraceError> {
        match self {
            JsonInteger::Number(n) => Ok(*n),
            JsonInteger::Text(s) => s
                .trim()
                .parse()
                .map_err(|e| TraceError::Schema(format!("invalid timestamp '{}': {}", s, e))),
        }
    }
}

/// Parse a causal-chain JSON document into a canonical trace
///
/// **Public** - entry point used by the format dispatcher
///
/// Edges whose parent id never appears as a report are dropped rather
/// than rejected; every other deviation is fatal.
///
/// # Errors
/// * `TraceError::Schema` - missing/extra keys, bad label/source pairing,
///   unparseable timestamp
/// * `TraceError::IdentityMismatch` - `id` absent from `filename`
/// * `TraceError::Cardinality` - zero or several causal tags, duplicate event id
/// * `TraceError::Causality` - a child that precedes its parent
pub fn parse_causal_chain(json: &str, filename: &str) -> Result<Trace, TraceError> {
    let document: CausalChainDocument = serde_json::from_str(json)?;

    check_identity(&document.id, filename)?;

    let mut tags: BTreeSet<String> = BTreeSet::new();
    let mut nodes: Vec<Node> = Vec::with_capacity(document.reports.len());
    let mut position_of: HashMap<String, usize> = HashMap::new();
    let mut links: Vec<(String, usize)> = Vec::new();

    for report in document.reports {
        collect_tag(&report, &mut tags)?;

        let function_id = report_function(&report)?;
        let timestamp = report.timestamp.to_i64()?;

        if position_of.contains_key(&report.event_id) {
            return Err(TraceError::Cardinality(format!(
                "event id {} reported twice",
                report.event_id
            )));
        }

        let position = nodes.len();
        position_of.insert(report.event_id.clone(), position);

        links.extend(
            report
                .parent_event_ids
                .into_iter()
                .filter(|parent| parent != ROOT_PARENT_ID)
                .map(|parent| (parent, position)),
        );

        nodes.push(Node::new(report.event_id, function_id, timestamp, NodeVariant::Event));
    }

    let mut edges = Vec::with_capacity(links.len());
    let mut dropped = 0usize;
    for (parent_id, child) in links {
        let Some(&parent) = position_of.get(&parent_id) else {
            dropped += 1;
            continue;
        };

        let Some(duration) = nodes[child].timestamp.checked_sub(nodes[parent].timestamp) else {
            return Err(TraceError::Schema(format!(
                "event {} and its parent {} are too far apart to measure",
                nodes[child].id, parent_id
            )));
        };
        if duration < 0 {
            return Err(TraceError::Causality(format!(
                "event {} precedes its parent {} by {}ns",
                nodes[child].id,
                parent_id,
                duration.unsigned_abs()
            )));
        }

        edges.push(Edge::new(parent, child, duration, None));
    }

    if dropped > 0 {
        warn!("Trace {}: dropped {} edges to unreported parents", document.id, dropped);
    }

    if tags.len() != 1 {
        return Err(TraceError::Cardinality(format!(
            "expected exactly one causal tag, found {} ({:?})",
            tags.len(),
            tags
        )));
    }
    let request = tags.into_iter().next().unwrap_or_default();
    let request_type = request_type_from_tag(&request)?;

    let trace = Trace::new(
        nodes,
        edges,
        request_type,
        document.id,
        Dataset::XTrace,
        Some(request),
    )?;

    debug!(
        "Parsed causal chain {}: {} nodes, {} edges",
        trace.base_id(),
        trace.nodes().len(),
        trace.edges().len()
    );

    Ok(trace)
}

/// Record the report's causal tag, ignoring the shell wrapper's tag
fn collect_tag(report: &Report, tags: &mut BTreeSet<String>) -> Result<(), TraceError> {
    match report.tag.as_deref() {
        None => Ok(()),
        Some([first, ..]) if first == IGNORED_TAG => Ok(()),
        Some([only]) => {
            tags.insert(only.clone());
            Ok(())
        }
        Some(values) => Err(TraceError::Cardinality(format!(
            "event {} carries {} tags, expected one",
            report.event_id,
            values.len()
        ))),
    }
}

/// The function a report belongs to: its source, or the label for the
/// few events that are legitimately sourceless
fn report_function(report: &Report) -> Result<String, TraceError> {
    let sourceless = SOURCELESS_LABELS.contains(&report.label.as_str());
    match (&report.source, sourceless) {
        (Some(source), false) => Ok(source.clone()),
        (None, true) => Ok(report.label.clone()),
        (Some(_), true) => Err(TraceError::Schema(format!(
            "event {} has a source but label '{}' is sourceless",
            report.event_id, report.label
        ))),
        (None, false) => Err(TraceError::Schema(format!(
            "event {} with label '{}' has no source",
            report.event_id, report.label
        ))),
    }
}

/// First word of the tag with surrounding hyphens removed (`-ls /x` -> `ls`)
pub fn request_type_from_tag(tag: &str) -> Result<String, TraceError> {
    let request_type = tag.split(' ').next().unwrap_or_default().trim_matches('-');
    if request_type.is_empty() {
        return Err(TraceError::Schema(format!("causal tag '{}' names no request type", tag)));
    }
    Ok(request_type.to_string())
}
