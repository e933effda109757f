//! On-disk trace store.
//!
//! Layout: `<root>/<dataset>/<request_type>/<base_id>.trace`, one binary
//! file per trace. Grouping by request type in the directory tree lets
//! exporters list a batch without decoding every file first.

use crate::codec::{read_trace, write_trace};
use crate::model::{Dataset, Trace};
use crate::utils::config::TRACE_EXTENSION;
use crate::utils::error::TraceError;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory-backed store of binary trace files
#[derive(Debug, Clone)]
pub struct TraceStore {
    root: PathBuf,
}

impl TraceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dataset_dir(&self, dataset: Dataset) -> PathBuf {
        self.root.join(dataset.name())
    }

    /// Where a trace with these keys lives
    pub fn path_for(&self, dataset: Dataset, request_type: &str, base_id: &str) -> PathBuf {
        self.dataset_dir(dataset)
            .join(request_type)
            .join(format!("{}.{}", base_id, TRACE_EXTENSION))
    }

    /// Persist a trace, replacing any earlier file for the same trace
    ///
    /// **Public** - called right after parsing
    ///
    /// # Errors
    /// * `TraceError::Schema` - request type or base id cannot be used as a
    ///   path component
    /// * `TraceError::Io` - the write failed; no file is left behind
    pub fn save(&self, trace: &Trace) -> Result<PathBuf, TraceError> {
        check_path_component("request type", trace.request_type())?;
        check_path_component("base id", trace.base_id())?;

        let path = self.path_for(trace.dataset(), trace.request_type(), trace.base_id());
        write_trace(&path, trace)?;
        Ok(path)
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<Trace, TraceError> {
        read_trace(path)
    }

    /// Request types present on disk for a dataset, sorted
    pub fn request_types(&self, dataset: Dataset) -> Result<Vec<String>, TraceError> {
        let dir = self.dataset_dir(dataset);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut types = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                types.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        types.sort();
        Ok(types)
    }

    /// Trace files for one `(dataset, request_type)`, sorted by path
    pub fn list(&self, dataset: Dataset, request_type: &str) -> Result<Vec<PathBuf>, TraceError> {
        let dir = self.dataset_dir(dataset).join(request_type);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == TRACE_EXTENSION) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Every trace file of a dataset, sorted by path
    pub fn list_dataset(&self, dataset: Dataset) -> Result<Vec<PathBuf>, TraceError> {
        let mut paths = Vec::new();
        for request_type in self.request_types(dataset)? {
            paths.extend(self.list(dataset, &request_type)?);
        }
        Ok(paths)
    }

    /// Load one `(dataset, request_type)` batch in path order
    pub fn load_request_type(&self, dataset: Dataset, request_type: &str) -> Result<Vec<Trace>, TraceError> {
        let paths = self.list(dataset, request_type)?;
        debug!("Loading {} {} {} traces", paths.len(), dataset, request_type);
        paths.iter().map(|p| self.load(p)).collect()
    }

    /// Load a whole dataset grouped by request type
    pub fn load_dataset(&self, dataset: Dataset) -> Result<BTreeMap<String, Vec<Trace>>, TraceError> {
        let mut groups = BTreeMap::new();
        let mut total = 0usize;
        for request_type in self.request_types(dataset)? {
            let traces = self.load_request_type(dataset, &request_type)?;
            total += traces.len();
            groups.insert(request_type, traces);
        }
        info!("Loaded {} {} traces in {} request types", total, dataset, groups.len());
        Ok(groups)
    }
}

fn check_path_component(what: &str, value: &str) -> Result<(), TraceError> {
    let bad = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);
    if bad {
        return Err(TraceError::Schema(format!(
            "{} '{}' cannot be used as a file name",
            what, value
        )));
    }
    Ok(())
}
