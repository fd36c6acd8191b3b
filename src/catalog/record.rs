use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::component::ComponentFile;
use super::metadata::{FolderHeader, VariantAnnotation};

/// Variant used for files without a `<variant>-<NN>` name
pub const DEFAULT_VARIANT: &str = "default";

static NUMBERED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<variant>.+)-\d+$").expect("numbered name pattern is valid")
});

/// One flattened registry entry: folder fields plus one variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryRecord {
    #[serde(flatten)]
    pub folder: FolderHeader,
    pub variant: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub elements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<bool>,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso8601")]
    pub updated_at: DateTime<Utc>,
    pub href: String,
}

impl RegistryRecord {
    pub fn new(
        folder: &FolderHeader,
        annotation: VariantAnnotation,
        file: &ComponentFile,
        href: String,
    ) -> Self {
        Self {
            folder: folder.clone(),
            variant: derive_variant(&annotation.name),
            name: annotation.name,
            description: annotation.description,
            elements: annotation.elements,
            bookmark: annotation.bookmark,
            created_at: file.created,
            updated_at: file.modified,
            href,
        }
    }

    pub fn is_bookmarked(&self) -> bool {
        self.bookmark.unwrap_or(false)
    }
}

/// Variant family of a file name: `minimal-06` is `minimal`.
///
/// A name without a hyphen is `default`; a hyphenated name without a
/// numeric suffix is its own variant.
pub fn derive_variant(name: &str) -> String {
    if !name.contains('-') {
        return DEFAULT_VARIANT.to_string();
    }
    match NUMBERED_NAME.captures(name) {
        Some(captures) => captures["variant"].to_string(),
        None => name.to_string(),
    }
}

/// Newest first; equal timestamps fall back to href
pub fn registry_order(a: &RegistryRecord, b: &RegistryRecord) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.href.cmp(&b.href))
}

/// ISO-8601 timestamps with millisecond precision
mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
