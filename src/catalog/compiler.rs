//! Phase 2: compile every annotation store into one flat, sorted registry

use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::component::ComponentFile;
use super::metadata::{AnnotationStore, FolderLabels};
use super::reconcile::reconcile;
use super::record::{registry_order, RegistryRecord};
use super::scanner::{find_metadata_files, list_component_files, ScanOptions};
use super::summary::RunSummary;
use crate::config::BuildConfig;
use crate::io::PathUtils;
use crate::{RegistryError, Result};

/// Output of a compile run
#[derive(Debug, Clone, Default)]
pub struct CompiledRegistry {
    /// Records sorted newest first
    pub records: Vec<RegistryRecord>,
    pub summary: RunSummary,
}

/// Flattens annotation stores and disk state into registry records
#[derive(Debug, Clone)]
pub struct RegistryCompiler {
    config: Arc<BuildConfig>,
    options: ScanOptions,
}

impl RegistryCompiler {
    pub fn new(config: BuildConfig) -> Result<Self> {
        let options = ScanOptions::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            options,
        })
    }

    /// Compile all folders that have an annotation store.
    ///
    /// A folder whose store cannot be parsed, or whose files cannot be
    /// stat'ed, contributes no records and is reported in the summary.
    pub async fn compile(&self) -> Result<CompiledRegistry> {
        let stores = find_metadata_files(&self.config.root, &self.config.metadata_file)?;
        info!("Compiling registry from {} annotation stores", stores.len());

        let mut tasks = JoinSet::new();
        for store_path in stores {
            let this = self.clone();
            tasks.spawn(async move {
                let result = this.compile_folder(&store_path).await;
                (store_path, result)
            });
        }

        let mut records = Vec::new();
        let mut summary = RunSummary::default();
        while let Some(joined) = tasks.join_next().await {
            let (store_path, result) = joined.map_err(|e| RegistryError::Task(e.to_string()))?;
            let folder = folder_of(&store_path);
            match result {
                Ok(folder_records) => {
                    records.extend(folder_records);
                    summary.record_success(folder);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", folder.display(), e);
                    summary.record_failure(folder, e);
                }
            }
        }

        // Task completion order is arbitrary; the sort makes output stable
        records.sort_by(registry_order);

        Ok(CompiledRegistry {
            records,
            summary: summary.finish(),
        })
    }

    /// Records for the folder owning `store_path`, in file-name order
    pub async fn compile_folder(&self, store_path: &Path) -> Result<Vec<RegistryRecord>> {
        let folder = folder_of(store_path);
        let store = AnnotationStore::read(store_path)?.ok_or_else(|| {
            RegistryError::io(
                store_path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "annotation store vanished"),
            )
        })?;

        let header = store.header(
            || FolderLabels::classify(&self.config.root, &folder, &self.config.layout),
            self.config.default_col_span,
        )?;

        let paths = list_component_files(&folder, &self.options).await?;
        let files = try_join_all(paths.iter().map(|path| ComponentFile::stat(path))).await?;
        let annotations = reconcile(&store.variants, &files);

        let mut records = Vec::with_capacity(files.len());
        for (annotation, file) in annotations.into_iter().zip(&files) {
            let href = PathUtils::href_for(&self.config.root, &file.path, &self.config.href_prefix)?;
            records.push(RegistryRecord::new(&header, annotation, file, href));
        }

        debug!("Compiled {} records from {}", records.len(), folder.display());
        Ok(records)
    }

    /// Compile and persist the registry.
    ///
    /// The file is replaced in one rename, so readers never see a partial
    /// registry.
    pub async fn compile_and_write(&self) -> Result<CompiledRegistry> {
        let compiled = self.compile().await?;
        let path = self.config.registry_path();
        write_registry(&path, &compiled.records)?;
        info!(
            "Wrote {} records to {} ({})",
            compiled.records.len(),
            path.display(),
            compiled.summary
        );
        Ok(compiled)
    }
}

/// Write records as a pretty JSON array via a sibling temp file
pub fn write_registry(path: &Path, records: &[RegistryRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| RegistryError::io(parent, e))?;
    }

    let mut content = serde_json::to_string_pretty(records)?;
    content.push('\n');

    let staging = staging_path(path);
    std::fs::write(&staging, content).map_err(|e| RegistryError::io(&staging, e))?;
    std::fs::rename(&staging, path).map_err(|e| RegistryError::io(path, e))
}

/// Sibling temp file the registry is written to before the rename
pub(crate) fn staging_path(path: &Path) -> PathBuf {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    PathBuf::from(staging)
}

fn folder_of(store_path: &Path) -> PathBuf {
    store_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}
