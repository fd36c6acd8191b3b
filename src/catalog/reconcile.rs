//! Inode-keyed reconciliation shared by both build phases

use std::collections::HashMap;

use super::component::ComponentFile;
use super::metadata::VariantAnnotation;

/// Reconcile the previous annotations against the files on disk now.
///
/// Output has one annotation per file, in `files` order. A file whose inode
/// was annotated before keeps its description, elements and bookmark; any
/// other file gets a fresh annotation. `name` always follows the current
/// file name. Annotations whose inode no longer exists are dropped.
pub fn reconcile(previous: &[VariantAnnotation], files: &[ComponentFile]) -> Vec<VariantAnnotation> {
    // First annotation wins if a hand-edited store repeats an inode
    let mut by_inode: HashMap<u64, &VariantAnnotation> = HashMap::with_capacity(previous.len());
    for annotation in previous {
        by_inode.entry(annotation.inode).or_insert(annotation);
    }

    files
        .iter()
        .map(|file| match by_inode.get(&file.inode) {
            Some(known) => VariantAnnotation {
                inode: file.inode,
                name: file.stem().to_string(),
                description: known.description.clone(),
                elements: known.elements.clone(),
                bookmark: known.bookmark,
            },
            None => VariantAnnotation::fresh(file.inode, file.stem()),
        })
        .collect()
}
