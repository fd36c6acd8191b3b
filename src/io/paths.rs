use crate::{RegistryError, Result};
use std::path::{Component, Path};

/// Utilities for working with paths under the component root
pub struct PathUtils;

impl PathUtils {
    /// Root-relative path segments of `path`, outermost first
    pub fn relative_segments(root: &Path, path: &Path) -> Result<Vec<String>> {
        let relative = path
            .strip_prefix(root)
            .map_err(|_| RegistryError::Classification {
                path: path.to_path_buf(),
                reason: format!("not under root {}", root.display()),
            })?;

        relative
            .components()
            .map(|component| match component {
                Component::Normal(segment) => segment
                    .to_str()
                    .map(str::to_string)
                    .ok_or_else(|| RegistryError::Classification {
                        path: path.to_path_buf(),
                        reason: "path segment is not valid UTF-8".to_string(),
                    }),
                _ => Err(RegistryError::Classification {
                    path: path.to_path_buf(),
                    reason: "path contains non-normal components".to_string(),
                }),
            })
            .collect()
    }

    /// Root-relative href for a component file: forward slashes, no extension
    pub fn href_for(root: &Path, file: &Path, prefix: &str) -> Result<String> {
        let mut segments = Self::relative_segments(root, file)?;
        if let Some(last) = segments.last_mut() {
            if let Some(stem) = Path::new(last.as_str()).file_stem().and_then(|s| s.to_str()) {
                *last = stem.to_string();
            }
        }
        Ok(format!(
            "{}/{}",
            prefix.trim_end_matches('/'),
            segments.join("/")
        ))
    }

    /// Check if path is safe (no traversal)
    pub fn is_safe_path(path: &Path) -> bool {
        !path
            .components()
            .any(|c| matches!(c, Component::ParentDir))
    }
}
