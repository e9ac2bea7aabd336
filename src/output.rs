//! # Output Sinks
//!
//! Where the finished PDF goes. The report hands over bytes and a file name
//! exactly once, after the whole document has been laid out and serialized.

use std::path::PathBuf;

use tracing::info;

use crate::error::{ReportError, Result};

/// Persists a finished report.
pub trait OutputSink {
    /// Store `bytes` under `name` and return where they ended up.
    fn write_output(&self, bytes: &[u8], name: &str) -> Result<PathBuf>;
}

/// Writes reports into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl OutputSink for DirectorySink {
    fn write_output(&self, bytes: &[u8], name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.root).map_err(|source| ReportError::Io {
            path: self.root.clone(),
            source,
        })?;
        let path = self.root.join(name);
        std::fs::write(&path, bytes).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), bytes = bytes.len(), "report written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("nested").join("reports"));
        let path = sink.write_output(b"%PDF-1.7", "audit.pdf").unwrap();
        assert_eq!(path, dir.path().join("nested/reports/audit.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
    }

    #[test]
    fn test_unwritable_destination_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let sink = DirectorySink::new(blocker.join("reports"));
        assert!(matches!(
            sink.write_output(b"x", "audit.pdf"),
            Err(ReportError::Io { .. })
        ));
    }
}
