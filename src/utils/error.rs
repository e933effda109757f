//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while converting, persisting or loading a trace
///
/// None of these are retryable: they mean the source data (or a file on
/// disk) does not have the shape this pipeline expects.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("schema violation: {0}")]
    Schema(String),

    #[error("trace id '{id}' does not occur in filename '{filename}'")]
    IdentityMismatch { id: String, filename: String },

    #[error("causality violation: {0}")]
    Causality(String),

    #[error("cardinality violation: {0}")]
    Cardinality(String),

    #[error("corrupt binary file: {0}")]
    FormatIntegrity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("conversion panicked: {0}")]
    Panicked(String),
}

impl TraceError {
    /// Short name of the violated invariant family, used in batch reports
    pub fn kind(&self) -> &'static str {
        match self {
            TraceError::Schema(_) => "schema",
            TraceError::IdentityMismatch { .. } => "identity-mismatch",
            TraceError::Causality(_) => "causality",
            TraceError::Cardinality(_) => "cardinality",
            TraceError::FormatIntegrity(_) => "format-integrity",
            TraceError::Io(_) => "io",
            TraceError::Panicked(_) => "panic",
        }
    }
}

impl From<serde_json::Error> for TraceError {
    fn from(err: serde_json::Error) -> Self {
        TraceError::Schema(err.to_string())
    }
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("Node name '{0}' is missing from the label index")]
    UnknownLabel(String),
}

/// A trace that failed to convert, with the file it came from
#[derive(Debug)]
pub struct ConversionFailure {
    pub path: PathBuf,
    pub error: TraceError,
}

impl fmt::Display for ConversionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

impl std::error::Error for ConversionFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
