//! Trace Motifs
//!
//! Ingestion of distributed-system execution traces into one canonical
//! graph form, compact binary persistence, and export for external
//! frequent-subgraph miners.
//!
//! This crate provides the core implementation for the
//! `trace-motifs` CLI tool.
//!
//! ## Pipeline
//!
//! ```text
//! JSON document -> parser -> Trace -> store (binary .trace)
//!                                  -> output (Format A / Format B + labels.txt)
//! miner results -> codec::motif -> Motif bound to its Trace
//! ```
//!
//! ## Getting Started
//!
//! ```bash
//! trace-motifs convert --dataset xtrace
//! trace-motifs export --dataset xtrace
//! ```

pub mod aggregator;
pub mod codec;
pub mod commands;
pub mod model;
pub mod output;
pub mod parser;
pub mod store;
pub mod utils;

pub use model::{Dataset, Motif, Node, NodeVariant, Trace};
pub use utils::error::{OutputError, TraceError};
