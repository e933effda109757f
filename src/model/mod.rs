//! Canonical trace graph model.
//!
//! Both source formats are normalized into these types:
//! - `Trace` owns an ordered list of `Node`s and `Edge`s
//! - `Edge` endpoints are positions into the trace's node list
//! - `Motif` borrows a trace and names a subset of its nodes

pub mod dataset;
pub mod edge;
pub mod motif;
pub mod node;
pub mod trace;

pub use dataset::{Dataset, SourceFormat};
pub use edge::Edge;
pub use motif::{sort_motifs, Motif};
pub use node::{Node, NodeVariant};
pub use trace::{unique_names, FunctionSpans, Trace};
