//! Per-folder annotation store (`metadata.json`)
//!
//! The store is the durable, hand-authored half of the pipeline. Each block
//! folder owns one file describing the folder (labels, tags, column span) and
//! one annotation per variant, keyed by inode.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::LayoutSegment;
use crate::io::PathUtils;
use crate::{RegistryError, Result};

/// Hand-authored facts about one variant file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAnnotation {
    /// Identity key
    pub inode: u64,
    /// Display name, always the current file name
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub elements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<bool>,
}

impl VariantAnnotation {
    /// Annotation for an inode seen for the first time
    pub fn fresh(inode: u64, name: impl Into<String>) -> Self {
        Self {
            inode,
            name: name.into(),
            description: String::new(),
            elements: Vec::new(),
            bookmark: Some(false),
        }
    }
}

/// Path-derived classification of a block folder
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FolderLabels {
    pub website: String,
    pub category: String,
    pub block: String,
}

impl FolderLabels {
    /// Classify `folder` by matching its root-relative segments to `layout`
    pub fn classify(root: &Path, folder: &Path, layout: &[LayoutSegment]) -> Result<Self> {
        let segments = PathUtils::relative_segments(root, folder)?;
        if segments.len() != layout.len() {
            return Err(RegistryError::Classification {
                path: folder.to_path_buf(),
                reason: format!(
                    "expected {} path segments below the root, found {}",
                    layout.len(),
                    segments.len()
                ),
            });
        }

        let mut labels = FolderLabels::default();
        for (role, segment) in layout.iter().zip(segments) {
            match role {
                LayoutSegment::Website => labels.website = segment,
                LayoutSegment::Category => labels.category = segment,
                LayoutSegment::Block => labels.block = segment,
                LayoutSegment::Skip => {}
            }
        }
        Ok(labels)
    }
}

/// Folder-level fields shared by the store and every registry record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderHeader {
    pub website: String,
    pub category: String,
    pub block: String,
    pub tags: Vec<String>,
    pub col_span: u32,
}

/// A complete, resolved annotation store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderMetadata {
    #[serde(flatten)]
    pub header: FolderHeader,
    #[serde(rename = "data", alias = "variants")]
    pub variants: Vec<VariantAnnotation>,
}

impl FolderMetadata {
    /// Write the store as pretty JSON with a trailing newline
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        std::fs::write(path, content).map_err(|e| RegistryError::io(path, e))
    }
}

/// The store as found on disk; every field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationStore {
    pub website: Option<String>,
    pub category: Option<String>,
    pub block: Option<String>,
    pub tags: Option<Vec<String>>,
    pub col_span: Option<u32>,
    #[serde(default, rename = "data", alias = "variants")]
    pub variants: Vec<VariantAnnotation>,
}

impl AnnotationStore {
    /// Read a store; `Ok(None)` when the file does not exist
    pub fn read(path: &Path) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RegistryError::io(path, e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| RegistryError::json(path, e))
    }

    /// Resolve folder fields: declared values win, the rest are computed.
    ///
    /// `classify` is only consulted when a label is missing, so a folder that
    /// declares all three labels may live at any depth.
    pub fn header(
        &self,
        classify: impl FnOnce() -> Result<FolderLabels>,
        default_col_span: u32,
    ) -> Result<FolderHeader> {
        let labels = match (&self.website, &self.category, &self.block) {
            (Some(website), Some(category), Some(block)) => FolderLabels {
                website: website.clone(),
                category: category.clone(),
                block: block.clone(),
            },
            _ => {
                let computed = classify()?;
                FolderLabels {
                    website: self.website.clone().unwrap_or(computed.website),
                    category: self.category.clone().unwrap_or(computed.category),
                    block: self.block.clone().unwrap_or(computed.block),
                }
            }
        };

        Ok(FolderHeader {
            website: labels.website,
            category: labels.category,
            block: labels.block,
            tags: self.tags.clone().unwrap_or_default(),
            col_span: self.col_span.unwrap_or(default_col_span),
        })
    }
}
