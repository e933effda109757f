//! Utility modules for configuration, error handling, and file output.

pub mod config;
pub mod error;
pub mod fs;

// Re-export commonly used error types for convenience
pub use error::{ConversionFailure, OutputError, TraceError};
