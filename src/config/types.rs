use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default file name for the per-folder annotation store
pub const DEFAULT_METADATA_FILE: &str = "metadata.json";

/// Default file name for the compiled registry
pub const DEFAULT_REGISTRY_FILE: &str = "registry.json";

/// Default component file pattern
pub const DEFAULT_COMPONENT_GLOB: &str = "*.tsx";

/// What a single folder path segment means for classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LayoutSegment {
    Website,
    Category,
    Block,
    /// Segment present on disk but not used as a label
    #[serde(rename = "_")]
    Skip,
}

/// Build configuration, read from `blockreg.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Root of the component tree
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// File name pattern that identifies component files
    #[serde(default = "default_component_glob")]
    pub component_glob: String,

    /// Annotation store file name inside each block folder
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,

    /// Compiled registry path, relative to `root` unless absolute
    #[serde(default = "default_registry_file")]
    pub registry_file: PathBuf,

    /// Role of each root-relative path segment of a block folder, outermost first
    #[serde(default = "default_layout")]
    pub layout: Vec<LayoutSegment>,

    /// Column span given to folders that do not declare one
    #[serde(default = "default_col_span")]
    pub default_col_span: u32,

    /// Prefix prepended to every record href
    #[serde(default)]
    pub href_prefix: String,
}

fn default_root() -> PathBuf {
    PathBuf::from("components")
}

fn default_component_glob() -> String {
    DEFAULT_COMPONENT_GLOB.to_string()
}

fn default_metadata_file() -> String {
    DEFAULT_METADATA_FILE.to_string()
}

fn default_registry_file() -> PathBuf {
    PathBuf::from(DEFAULT_REGISTRY_FILE)
}

fn default_layout() -> Vec<LayoutSegment> {
    vec![
        LayoutSegment::Website,
        LayoutSegment::Category,
        LayoutSegment::Block,
    ]
}

fn default_col_span() -> u32 {
    1
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            component_glob: default_component_glob(),
            metadata_file: default_metadata_file(),
            registry_file: default_registry_file(),
            layout: default_layout(),
            default_col_span: default_col_span(),
            href_prefix: String::new(),
        }
    }
}

impl BuildConfig {
    /// Config rooted at `root` with every other field defaulted
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Resolved location of the compiled registry
    pub fn registry_path(&self) -> PathBuf {
        if self.registry_file.is_absolute() {
            self.registry_file.clone()
        } else {
            self.root.join(&self.registry_file)
        }
    }

    /// Location of the annotation store for a block folder
    pub fn metadata_path(&self, folder: &Path) -> PathBuf {
        folder.join(&self.metadata_file)
    }
}
