//! Dataset families and the source format each one is recorded in.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which dataset family a trace belongs to
///
/// The dataset decides the source JSON shape and a few downstream
/// formatting choices (e.g. how readable function names are).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    /// OpenStack traces recorded as span graphs
    #[value(name = "openstack")]
    OpenStack,
    /// Hadoop X-Trace traces recorded as causal report chains
    #[value(name = "xtrace")]
    XTrace,
}

/// The two incompatible source JSON shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Explicit node/edge graph with Entry/Exit/Annotation nodes
    SpanGraph,
    /// Reports linked by parent event ids, one causal tag per trace
    CausalChain,
}

impl Dataset {
    pub const ALL: [Dataset; 2] = [Dataset::OpenStack, Dataset::XTrace];

    /// Directory and file-name friendly name
    pub fn name(self) -> &'static str {
        match self {
            Dataset::OpenStack => "openstack",
            Dataset::XTrace => "xtrace",
        }
    }

    /// Title used in human-facing summaries
    pub fn human_readable(self) -> &'static str {
        match self {
            Dataset::OpenStack => "OpenStack",
            Dataset::XTrace => "XTrace",
        }
    }

    pub fn source_format(self) -> SourceFormat {
        match self {
            Dataset::OpenStack => SourceFormat::SpanGraph,
            Dataset::XTrace => SourceFormat::CausalChain,
        }
    }

    /// Tag written into binary trace files
    pub fn tag(self) -> i64 {
        match self {
            Dataset::OpenStack => 0,
            Dataset::XTrace => 1,
        }
    }

    pub fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            0 => Some(Dataset::OpenStack),
            1 => Some(Dataset::XTrace),
            _ => None,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openstack" => Ok(Dataset::OpenStack),
            "xtrace" => Ok(Dataset::XTrace),
            other => Err(format!("unknown dataset: {}", other)),
        }
    }
}
