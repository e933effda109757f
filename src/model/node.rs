//! Trace events (graph nodes).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What kind of event a node records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeVariant {
    /// A function was entered (span-graph)
    Entry,
    /// A function returned (span-graph)
    Exit,
    /// A point annotation inside a span (span-graph)
    Annotation,
    /// A causal-chain report
    Event,
}

impl NodeVariant {
    pub fn tag(self) -> i64 {
        match self {
            NodeVariant::Entry => 0,
            NodeVariant::Exit => 1,
            NodeVariant::Annotation => 2,
            NodeVariant::Event => 3,
        }
    }

    pub fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            0 => Some(NodeVariant::Entry),
            1 => Some(NodeVariant::Exit),
            2 => Some(NodeVariant::Annotation),
            3 => Some(NodeVariant::Event),
            _ => None,
        }
    }
}

impl fmt::Display for NodeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeVariant::Entry => "Entry",
            NodeVariant::Exit => "Exit",
            NodeVariant::Annotation => "Annotation",
            NodeVariant::Event => "Event",
        };
        f.pad(name)
    }
}

impl FromStr for NodeVariant {
    type Err = String;

    /// Only the span-graph variants have a textual form in source documents
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Entry" => Ok(NodeVariant::Entry),
            "Exit" => Ok(NodeVariant::Exit),
            "Annotation" => Ok(NodeVariant::Annotation),
            other => Err(format!("unknown node variant '{}'", other)),
        }
    }
}

/// One traced event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Dense position within the owning trace
    pub index: usize,

    /// Source-native identifier (span id or event id)
    pub id: String,

    /// Nanoseconds since the epoch
    pub timestamp: i64,

    pub variant: NodeVariant,

    /// Logical operation this event belongs to
    pub function_id: String,
}

impl Node {
    /// Create a node; the index is assigned when the trace is built
    pub fn new(
        id: impl Into<String>,
        function_id: impl Into<String>,
        timestamp: i64,
        variant: NodeVariant,
    ) -> Self {
        Self {
            index: 0,
            id: id.into(),
            timestamp,
            variant,
            function_id: function_id.into(),
        }
    }

    /// Name used for label lookup in exported graphs
    pub fn name(&self) -> &str {
        &self.function_id
    }
}
