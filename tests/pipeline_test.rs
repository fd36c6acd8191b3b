//! End-to-end tests for the two build phases on a real temp tree
#![cfg(unix)]

use blockreg::catalog::{
    AnnotationStore, MetadataSynchronizer, RegistryCompiler, RegistryRecord, RegistryService,
    VariantAnnotation,
};
use blockreg::config::BuildConfig;
use pretty_assertions::assert_eq;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    _temp_dir: TempDir,
    root: PathBuf,
    folder: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("components");
        let folder = root.join("shop/marketing/hero");
        fs::create_dir_all(&folder).unwrap();
        Self {
            _temp_dir: temp_dir,
            root,
            folder,
        }
    }

    fn config(&self) -> BuildConfig {
        BuildConfig::for_root(&self.root)
    }

    fn component(&self, name: &str) -> PathBuf {
        let path = self.folder.join(format!("{name}.tsx"));
        fs::write(&path, format!("export const {} = null;", name.replace('-', "_"))).unwrap();
        path
    }

    fn store(&self) -> AnnotationStore {
        AnnotationStore::read(&self.folder.join("metadata.json"))
            .unwrap()
            .expect("metadata.json should exist")
    }

    /// Hand-edit the store, the way an author would
    fn annotate(&self, name: &str, description: &str, elements: &[&str]) {
        let path = self.folder.join("metadata.json");
        let mut raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        for entry in raw["data"].as_array_mut().unwrap() {
            if entry["name"] == name {
                entry["description"] = description.into();
                entry["elements"] = serde_json::json!(elements);
            }
        }
        fs::write(&path, serde_json::to_string_pretty(&raw).unwrap()).unwrap();
    }

    async fn sync(&self) {
        let summary = MetadataSynchronizer::new(self.config())
            .unwrap()
            .sync_all()
            .await
            .unwrap();
        assert!(!summary.has_failures(), "{summary}");
    }

    async fn compile(&self) -> Vec<RegistryRecord> {
        let compiled = RegistryCompiler::new(self.config())
            .unwrap()
            .compile_and_write()
            .await
            .unwrap();
        assert!(!compiled.summary.has_failures(), "{}", compiled.summary);
        compiled.records
    }
}

fn inode(path: &Path) -> u64 {
    fs::metadata(path).unwrap().ino()
}

fn find<'a>(store: &'a AnnotationStore, name: &str) -> &'a VariantAnnotation {
    store
        .variants
        .iter()
        .find(|v| v.name == name)
        .unwrap_or_else(|| panic!("no variant named {name}"))
}

#[tokio::test]
async fn test_added_file_gets_fresh_annotation_and_record() {
    let fx = Fixture::new();
    let hero_01 = fx.component("hero-01");
    let hero_02 = fx.component("hero-02");
    fx.sync().await;
    fx.annotate("hero-01", "Landing hero", &["button"]);

    let hero_03 = fx.component("hero-03");
    fx.sync().await;

    let store = fx.store();
    assert_eq!(store.variants.len(), 3);
    assert_eq!(find(&store, "hero-01").inode, inode(&hero_01));
    assert_eq!(find(&store, "hero-01").description, "Landing hero");
    assert_eq!(find(&store, "hero-02").inode, inode(&hero_02));
    assert_eq!(find(&store, "hero-02").description, "");
    assert_eq!(find(&store, "hero-03").inode, inode(&hero_03));
    assert_eq!(find(&store, "hero-03").description, "");

    let records = fx.compile().await;
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.variant == "hero"));
    let mut hrefs: Vec<_> = records.iter().map(|r| r.href.clone()).collect();
    hrefs.sort();
    hrefs.dedup();
    assert_eq!(hrefs.len(), 3);
    let landing = records.iter().find(|r| r.name == "hero-01").unwrap();
    assert_eq!(landing.description, "Landing hero");
    assert_eq!(landing.elements, vec!["button"]);
}

#[tokio::test]
async fn test_rename_preserves_annotation() {
    let fx = Fixture::new();
    let original = fx.component("hero-01");
    fx.sync().await;
    fx.annotate("hero-01", "D", &[]);

    let renamed = fx.folder.join("hero-split-01.tsx");
    fs::rename(&original, &renamed).unwrap();
    fx.sync().await;

    let store = fx.store();
    assert_eq!(store.variants.len(), 1);
    assert_eq!(store.variants[0].name, "hero-split-01");
    assert_eq!(store.variants[0].description, "D");
    assert_eq!(store.variants[0].inode, inode(&renamed));

    let records = fx.compile().await;
    assert_eq!(records[0].variant, "hero-split");
    assert_eq!(records[0].href, "/shop/marketing/hero/hero-split-01");
}

#[tokio::test]
async fn test_recreated_file_does_not_inherit_annotation() {
    let fx = Fixture::new();
    let original = fx.component("hero-01");
    fx.sync().await;
    fx.annotate("hero-01", "Old hero", &["badge"]);
    let old_inode = inode(&original);

    // Write the replacement before removing the old file so the inode cannot be reused
    let replacement = fx.folder.join("replacement.tmp");
    fs::write(&replacement, "new").unwrap();
    fs::remove_file(&original).unwrap();
    fs::rename(&replacement, &original).unwrap();
    assert_ne!(inode(&original), old_inode);

    fx.sync().await;

    let store = fx.store();
    assert_eq!(store.variants.len(), 1);
    assert_eq!(store.variants[0].description, "");
    assert!(store.variants[0].elements.is_empty());
}

#[tokio::test]
async fn test_deleted_file_leaves_no_orphans() {
    let fx = Fixture::new();
    fx.component("hero-01");
    let doomed = fx.component("hero-02");
    fx.sync().await;
    assert_eq!(fx.compile().await.len(), 2);

    fs::remove_file(&doomed).unwrap();
    fx.sync().await;

    assert_eq!(fx.store().variants.len(), 1);
    let records = fx.compile().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "hero-01");
}

#[tokio::test]
async fn test_deleting_last_file_empties_store() {
    let fx = Fixture::new();
    let only = fx.component("hero-01");
    fx.sync().await;
    fx.annotate("hero-01", "Gone soon", &["button"]);
    assert_eq!(fx.compile().await.len(), 1);

    fs::remove_file(&only).unwrap();
    fx.sync().await;

    let store = fx.store();
    assert!(store.variants.is_empty());
    assert!(fx.compile().await.is_empty());

    // A later file in the same folder starts blank
    fx.component("hero-02");
    fx.sync().await;
    let store = fx.store();
    assert_eq!(store.variants.len(), 1);
    assert_eq!(store.variants[0].description, "");
}

#[tokio::test]
async fn test_rebuild_without_changes_is_idempotent() {
    let fx = Fixture::new();
    fx.component("hero-01");
    fx.component("hero-02");
    fx.sync().await;
    fx.annotate("hero-02", "Split", &["image"]);
    fx.sync().await;
    fx.compile().await;

    let metadata_before = fs::read(fx.folder.join("metadata.json")).unwrap();
    let registry_before = fs::read(fx.root.join("registry.json")).unwrap();

    fx.sync().await;
    fx.compile().await;

    assert_eq!(fs::read(fx.folder.join("metadata.json")).unwrap(), metadata_before);
    assert_eq!(fs::read(fx.root.join("registry.json")).unwrap(), registry_before);
}

#[tokio::test]
async fn test_compiler_sees_changes_made_after_sync() {
    let fx = Fixture::new();
    fx.component("hero-01");
    fx.sync().await;

    // A file added between the phases still gets exactly one record
    fx.component("hero-02");
    let records = fx.compile().await;
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_registry_loads_through_service() {
    let fx = Fixture::new();
    fx.component("hero-01");
    fx.component("panel");
    fx.sync().await;
    fx.annotate("panel", "Side panel", &["avatar", "badge", "button"]);
    fx.compile().await;

    let service = RegistryService::from_file(fx.config().registry_path());
    let registry = service.load().unwrap();

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.by_variant("default").len(), 1);
    assert_eq!(registry.elements(&["badge", "avatar"]).len(), 1);
    assert_eq!(registry.elements(&["badge", "icon"]).len(), 0);
    assert_eq!(registry.by_website("shop").by_block("hero").len(), 2);
}

#[tokio::test]
async fn test_multiple_folders_flatten_into_one_registry() {
    let fx = Fixture::new();
    fx.component("hero-01");
    let footer = fx.root.join("blog/layout/footer");
    fs::create_dir_all(&footer).unwrap();
    fs::write(footer.join("minimal-06.tsx"), "x").unwrap();
    fs::write(footer.join("minimal-07.tsx"), "y").unwrap();

    fx.sync().await;
    let records = fx.compile().await;

    assert_eq!(records.len(), 3);
    let footers: Vec<_> = records.iter().filter(|r| r.folder.block == "footer").collect();
    assert_eq!(footers.len(), 2);
    assert!(footers.iter().all(|r| r.variant == "minimal" && r.folder.website == "blog"));
    assert!(records
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));
}
