use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{RegistryError, Result};

/// A physical variant file as it exists on disk right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentFile {
    pub path: PathBuf,
    /// Filesystem identity; survives rename, changes on copy or recreate
    pub inode: u64,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl ComponentFile {
    /// Stat a component file
    pub async fn stat(path: &Path) -> Result<Self> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| RegistryError::io(path, e))?;

        let modified: DateTime<Utc> = metadata
            .modified()
            .map_err(|e| RegistryError::io(path, e))?
            .into();

        // Not every filesystem records birth time
        let created = match metadata.created() {
            Ok(created) => created.into(),
            Err(e) => {
                debug!(
                    "No birth time for {}, using modification time: {}",
                    path.display(),
                    e
                );
                modified
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            inode: inode_of(path, &metadata)?,
            created,
            modified,
        })
    }

    /// File name without its extension
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }
}

#[cfg(unix)]
fn inode_of(_path: &Path, metadata: &std::fs::Metadata) -> Result<u64> {
    use std::os::unix::fs::MetadataExt;
    Ok(metadata.ino())
}

#[cfg(not(unix))]
fn inode_of(path: &Path, _metadata: &std::fs::Metadata) -> Result<u64> {
    Err(RegistryError::Unsupported(format!(
        "inode identity is not available for {}",
        path.display()
    )))
}
