//! All-or-nothing file writing shared by the trace store and exporters.
//!
//! Content is written into a temporary file created next to the target and
//! renamed over it only once the write has completed, so a crash or an
//! error mid-write never leaves a truncated file at the final path.

use crate::utils::error::OutputError;
use log::debug;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Write a file through a temporary sibling and rename it into place
///
/// **Public** - used by every writer in the crate
///
/// # Arguments
/// * `path` - Final destination
/// * `write` - Callback producing the file content
///
/// # Errors
/// Whatever `write` returns, or the IO error from creating, flushing or
/// renaming the temporary file. On error the destination is untouched.
pub fn write_atomic<E, F>(path: &Path, write: F) -> Result<(), E>
where
    E: From<io::Error>,
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<(), E>,
{
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    if !parent.exists() {
        debug!("Creating parent directories: {}", parent.display());
        std::fs::create_dir_all(parent)?;
    }

    let mut tmp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| E::from(e.error))?;

    debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path_empty() {
        assert!(validate_path(Path::new("")).is_err());
    }

    #[test]
    fn test_validate_path_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(validate_path(temp_dir.path()).is_err());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("nested/dirs/out.txt");

        write_atomic::<io::Error, _>(&nested, |w| w.write_all(b"hello")).unwrap();

        assert_eq!(std::fs::read_to_string(&nested).unwrap(), "hello");
    }

    #[test]
    fn test_failed_write_leaves_nothing_behind() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out.txt");

        let result = write_atomic::<io::Error, _>(&path, |w| {
            w.write_all(b"partial")?;
            Err(io::Error::new(io::ErrorKind::Other, "boom"))
        });

        assert!(result.is_err());
        assert!(!path.exists());
        // the temporary file is cleaned up on drop as well
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
