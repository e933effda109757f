//! Dataset-wide node label index.
//!
//! Miners only see small integers, so every distinct node name gets one.
//! The index is built in two passes: collect every name with a
//! [`LabelIndexBuilder`], then [`freeze`](LabelIndexBuilder::freeze) it into
//! an immutable [`LabelIndex`] that export workers share by reference.

use crate::model::{unique_names, Trace};
use crate::utils::error::OutputError;
use crate::utils::fs::{validate_path, write_atomic};
use std::collections::{BTreeSet, HashMap};
use std::io::{self, Write};
use std::path::Path;

/// Collects names before labels are assigned
#[derive(Debug, Default)]
pub struct LabelIndexBuilder {
    names: BTreeSet<String>,
}

impl LabelIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_name(&mut self, name: &str) {
        if !self.names.contains(name) {
            self.names.insert(name.to_string());
        }
    }

    /// Assign labels in sorted name order
    pub fn freeze(self) -> LabelIndex {
        let names: Vec<String> = self.names.into_iter().collect();
        let index_of = names
            .iter()
            .enumerate()
            .map(|(label, name)| (name.clone(), label))
            .collect();
        LabelIndex { names, index_of }
    }
}

/// Frozen bijection between node names and labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelIndex {
    names: Vec<String>,
    index_of: HashMap<String, usize>,
}

impl LabelIndex {
    /// Build the index over every node of every trace given
    pub fn from_traces<'a>(traces: impl IntoIterator<Item = &'a Trace>) -> Self {
        LabelIndexBuilder {
            names: unique_names(traces),
        }
        .freeze()
    }

    /// Label of a node name
    pub fn label(&self, name: &str) -> Result<usize, OutputError> {
        self.index_of
            .get(name)
            .copied()
            .ok_or_else(|| OutputError::UnknownLabel(name.to_string()))
    }

    /// Name behind a label
    pub fn name(&self, label: usize) -> Option<&str> {
        self.names.get(label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// One `<label> <name>` line per entry
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for (label, name) in self.names.iter().enumerate() {
            writeln!(writer, "{:04} {}", label, name)?;
        }
        Ok(())
    }

    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<(), OutputError> {
        let path = path.as_ref();
        validate_path(path)?;
        write_atomic(path, |w| self.write_to(w).map_err(OutputError::from))
    }
}
