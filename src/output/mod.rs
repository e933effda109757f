//! Graph exporters for external subgraph miners.
//!
//! This module handles writing trace batches to disk in:
//! - Format A (`*-grami.lg`): the batch as one graph
//! - Format B (`*-gaston.lg`): one transaction per trace
//! - The label index both formats share

pub mod gaston;
pub mod grami;
pub mod labels;

// Re-export main functions
pub use gaston::{export_gaston, gaston_filename, write_gaston};
pub use grami::{export_grami, grami_filename, write_grami};
pub use labels::{LabelIndex, LabelIndexBuilder};
