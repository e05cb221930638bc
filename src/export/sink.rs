use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}

/// Terminal side effect of an export. The serializer never touches the
/// filesystem itself; it hands the finished bytes to whatever sink the host
/// wires in, which keeps the pipeline testable without one.
pub trait ExportSink: Send + Sync {
    /// Persist the file and report where it ended up.
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, SinkError>;
}

/// Writes exports into a target directory, creating it when missing.
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl ExportSink for FileSink {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, SinkError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, bytes)?;
        info!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}
