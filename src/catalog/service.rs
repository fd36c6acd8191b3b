//! Lazily loaded, injectable registry service

use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::query::RegistryQuery;
use super::record::RegistryRecord;
use crate::{RegistryError, Result};

/// Where the service gets its records from
pub trait RegistrySource: Send + Sync {
    fn load(&self) -> Result<Vec<RegistryRecord>>;
}

/// Reads a compiled `registry.json`
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegistrySource for FileSource {
    fn load(&self) -> Result<Vec<RegistryRecord>> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| RegistryError::io(&self.path, e))?;
        serde_json::from_str(&content).map_err(|e| RegistryError::json(&self.path, e))
    }
}

/// In-memory fixture records
impl RegistrySource for Vec<RegistryRecord> {
    fn load(&self) -> Result<Vec<RegistryRecord>> {
        Ok(self.clone())
    }
}

/// Read-only registry, loaded at most once per service
pub struct RegistryService {
    source: Box<dyn RegistrySource>,
    loaded: OnceCell<RegistryQuery>,
}

impl RegistryService {
    pub fn new(source: impl RegistrySource + 'static) -> Self {
        Self {
            source: Box::new(source),
            loaded: OnceCell::new(),
        }
    }

    /// Service backed by a `registry.json` on disk
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::new(FileSource::new(path))
    }

    /// Load the registry now; later calls return the same collection
    pub fn load(&self) -> Result<&RegistryQuery> {
        self.loaded.get_or_try_init(|| {
            let records = self.source.load()?;
            debug!("Loaded {} registry records", records.len());
            Ok(RegistryQuery::new(records))
        })
    }

    /// The collection, if it has been loaded
    pub fn get(&self) -> Option<&RegistryQuery> {
        self.loaded.get()
    }
}

impl std::fmt::Debug for RegistryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryService")
            .field("loaded", &self.loaded.get().map(RegistryQuery::len))
            .finish()
    }
}
