//! Block catalog build pipeline
//!
//! # Overview
//!
//! The catalog is a tree of block folders, each holding interchangeable
//! component variants and one hand-authored `metadata.json`. Building it
//! runs in two phases:
//!
//! ```text
//! component files on disk
//!         │
//!         ▼
//! MetadataSynchronizer   ← reconcile by inode, rewrite metadata.json
//!         │
//!         ▼
//! RegistryCompiler       ← flatten + timestamps + sort → registry.json
//!         │
//!         ▼
//! RegistryService / RegistryQuery
//! ```
//!
//! Both phases share [`reconcile`], so annotation carry-over cannot drift
//! between them, and both isolate failures per folder.

mod compiler;
mod component;
mod metadata;
mod query;
mod reconcile;
mod record;
mod scanner;
mod service;
mod summary;
mod synchronizer;

pub use compiler::{write_registry, CompiledRegistry, RegistryCompiler};
pub use component::ComponentFile;
pub use metadata::{AnnotationStore, FolderHeader, FolderLabels, FolderMetadata, VariantAnnotation};
pub use query::{DateBound, FieldQuery, ListField, RegistryQuery, ScalarField, SortOrder};
pub use reconcile::reconcile;
pub use record::{derive_variant, registry_order, RegistryRecord, DEFAULT_VARIANT};
pub use scanner::{find_metadata_files, list_component_files, scan_block_folders, ScanOptions};
pub use service::{FileSource, RegistryService, RegistrySource};
pub use summary::{RunSummary, UnitFailure};
pub use synchronizer::MetadataSynchronizer;
