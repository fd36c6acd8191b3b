//! Phase 1: rewrite every block folder's annotation store from disk state

use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::component::ComponentFile;
use super::metadata::{AnnotationStore, FolderLabels, FolderMetadata};
use super::reconcile::reconcile;
use super::scanner::{find_metadata_files, scan_block_folders, ScanOptions};
use super::summary::RunSummary;
use crate::config::BuildConfig;
use crate::{RegistryError, Result};

/// Reconciles annotation stores against the current file tree
#[derive(Debug, Clone)]
pub struct MetadataSynchronizer {
    config: Arc<BuildConfig>,
    options: ScanOptions,
}

impl MetadataSynchronizer {
    pub fn new(config: BuildConfig) -> Result<Self> {
        let options = ScanOptions::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            options,
        })
    }

    /// Sync every block folder under the root.
    ///
    /// Folders run in parallel. A folder that fails keeps its old store and
    /// is reported in the summary; only a failed scan aborts the run.
    /// Folders that still own a store but no longer hold any component are
    /// synced too, which empties their variant list.
    pub async fn sync_all(&self) -> Result<RunSummary> {
        let mut folders = scan_block_folders(&self.config.root, &self.options)?;
        for store_path in find_metadata_files(&self.config.root, &self.config.metadata_file)? {
            if let Some(folder) = store_path.parent() {
                folders.entry(folder.to_path_buf()).or_default();
            }
        }
        info!("Syncing metadata for {} block folders", folders.len());

        let mut tasks = JoinSet::new();
        for (folder, files) in folders {
            let this = self.clone();
            tasks.spawn(async move {
                let result = this.sync_folder(&folder, &files).await;
                (folder, result)
            });
        }

        let mut summary = RunSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((folder, Ok(_))) => summary.record_success(folder),
                Ok((folder, Err(e))) => {
                    warn!("Skipping {}: {}", folder.display(), e);
                    summary.record_failure(folder, e);
                }
                Err(e) => {
                    return Err(RegistryError::Task(e.to_string()));
                }
            }
        }

        let summary = summary.finish();
        info!("Metadata sync finished: {}", summary);
        Ok(summary)
    }

    /// Reconcile one folder and write its store back.
    ///
    /// The store is only written once every file has been stat'ed, so a
    /// folder never loses annotations to a transient error.
    pub async fn sync_folder(&self, folder: &Path, files: &[PathBuf]) -> Result<FolderMetadata> {
        let store_path = self.config.metadata_path(folder);
        let previous = match AnnotationStore::read(&store_path) {
            Ok(Some(store)) => store,
            Ok(None) => {
                debug!("No annotation store in {}, starting empty", folder.display());
                AnnotationStore::default()
            }
            Err(e) => {
                warn!("Discarding unreadable annotation store: {}", e);
                AnnotationStore::default()
            }
        };

        let components = try_join_all(files.iter().map(|path| ComponentFile::stat(path))).await?;

        let header = previous.header(
            || FolderLabels::classify(&self.config.root, folder, &self.config.layout),
            self.config.default_col_span,
        )?;
        let metadata = FolderMetadata {
            header,
            variants: reconcile(&previous.variants, &components),
        };

        metadata.save(&store_path)?;
        debug!(
            "Wrote {} variants to {}",
            metadata.variants.len(),
            store_path.display()
        );
        Ok(metadata)
    }
}
