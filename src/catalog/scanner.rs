//! File system scanner for discovering block folders and their component files

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use super::compiler::staging_path;
use crate::config::BuildConfig;
use crate::{RegistryError, Result};

/// What the scanner treats as a component file
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub pattern: glob::Pattern,
    pub metadata_file: String,
    /// Compiled registry output, never a component even if the glob matches
    pub registry_path: PathBuf,
}

impl ScanOptions {
    pub fn from_config(config: &BuildConfig) -> Result<Self> {
        let pattern = glob::Pattern::new(&config.component_glob).map_err(|e| {
            RegistryError::Config(format!(
                "Invalid component_glob {}: {}",
                config.component_glob, e
            ))
        })?;
        Ok(Self {
            pattern,
            metadata_file: config.metadata_file.clone(),
            registry_path: config.registry_path(),
        })
    }

    /// Check a file against the component pattern
    pub fn is_component(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        file_name != self.metadata_file
            && !self.is_registry_output(path)
            && self.pattern.matches(file_name)
    }

    fn is_registry_output(&self, path: &Path) -> bool {
        path == self.registry_path || path == staging_path(&self.registry_path)
    }
}

/// Block folders under `root`, each with its component files sorted by name
pub fn scan_block_folders(
    root: &Path,
    options: &ScanOptions,
) -> Result<BTreeMap<PathBuf, Vec<PathBuf>>> {
    ensure_dir(root)?;
    info!("Scanning for component files in: {}", root.display());

    let mut folders: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for entry in walk(root) {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if !options.is_component(entry.path()) {
            continue;
        }
        if let Some(parent) = entry.path().parent() {
            debug!("Found component file: {}", entry.path().display());
            folders
                .entry(parent.to_path_buf())
                .or_default()
                .push(entry.path().to_path_buf());
        }
    }

    for files in folders.values_mut() {
        files.sort();
    }

    info!("Scan complete: found {} block folders", folders.len());
    Ok(folders)
}

/// Component files directly inside one folder, sorted by name
pub async fn list_component_files(folder: &Path, options: &ScanOptions) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(folder)
        .await
        .map_err(|e| RegistryError::io(folder, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| RegistryError::io(folder, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| RegistryError::io(entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }
        let path = entry.path();
        if options.is_component(&path) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Every annotation store under `root`, sorted by path
pub fn find_metadata_files(root: &Path, metadata_file: &str) -> Result<Vec<PathBuf>> {
    ensure_dir(root)?;

    let mut found = Vec::new();
    for entry in walk(root) {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if entry.file_type().is_file() && entry.file_name() == metadata_file {
            found.push(entry.into_path());
        }
    }

    found.sort();
    Ok(found)
}

fn walk(root: &Path) -> impl Iterator<Item = walkdir::Result<DirEntry>> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn ensure_dir(root: &Path) -> Result<()> {
    if !root.is_dir() {
        return Err(RegistryError::io(
            root,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "component root is not a directory",
            ),
        ));
    }
    Ok(())
}

fn walk_error(root: &Path, error: walkdir::Error) -> RegistryError {
    let path = error.path().unwrap_or(root).to_path_buf();
    let source = error
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
    RegistryError::io(path, source)
}
