use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::types::{BuildConfig, LayoutSegment};
use crate::io::PathUtils;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "blockreg.yaml";

/// Loads and validates the build configuration
pub struct ConfigLoader {
    /// Explicit config path from the command line
    explicit: Option<PathBuf>,
    /// Root override from the command line
    root_override: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader that searches the working directory
    pub fn new() -> Self {
        Self {
            explicit: None,
            root_override: None,
        }
    }

    /// Use a specific config file; it must exist
    pub fn with_config_file(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    /// Override the component root from the config file
    pub fn with_root(mut self, root: Option<PathBuf>) -> Self {
        self.root_override = root;
        self
    }

    /// Resolve the configuration relative to `cwd`
    pub fn load_from(&self, cwd: &Path) -> Result<BuildConfig> {
        let mut config = match &self.explicit {
            Some(path) => Self::load_file(path)?,
            None => {
                let candidate = cwd.join(DEFAULT_CONFIG_FILE);
                if candidate.exists() {
                    Self::load_file(&candidate)?
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    BuildConfig::default()
                }
            }
        };

        if let Some(root) = &self.root_override {
            config.root = root.clone();
        }
        if config.root.is_relative() {
            config.root = cwd.join(&config.root);
        }

        validate(&config)?;
        Ok(config)
    }

    /// Resolve the configuration relative to the current directory
    pub fn load(&self) -> Result<BuildConfig> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        self.load_from(&cwd)
    }

    fn load_file(path: &Path) -> Result<BuildConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject configurations the pipeline cannot run with
pub fn validate(config: &BuildConfig) -> Result<()> {
    for role in [
        LayoutSegment::Website,
        LayoutSegment::Category,
        LayoutSegment::Block,
    ] {
        let count = config.layout.iter().filter(|s| **s == role).count();
        if count != 1 {
            bail!(
                "layout must contain {:?} exactly once (found {})",
                role,
                count
            );
        }
    }
    if config.default_col_span == 0 {
        bail!("default_col_span must be at least 1");
    }
    if config.metadata_file.is_empty() {
        bail!("metadata_file must not be empty");
    }
    if !PathUtils::is_safe_path(&config.registry_file) {
        bail!(
            "registry_file must not traverse upwards: {}",
            config.registry_file.display()
        );
    }
    glob::Pattern::new(&config.component_glob)
        .with_context(|| format!("Invalid component_glob: {}", config.component_glob))?;
    Ok(())
}
