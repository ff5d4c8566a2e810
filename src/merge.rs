use std::collections::BTreeMap;

use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use log::trace;

use crate::error::Result;
use crate::paths;
use crate::pending::ChangeNode;
use crate::store::ObjectStore;
use crate::types::{ObjectId, ObjectKind, TreeEntry, MODE_BLOB};

/// The outcome of merging one directory level.
#[derive(Debug, Clone)]
pub struct MergedTree {
    /// Id of the newly persisted tree object.
    pub id: ObjectId,
    /// The merged directory's own path (the root is spelled `"/"`).
    pub path: String,
    /// The tree this one was derived from, threaded upward as lineage.
    pub parent_id: Option<ObjectId>,
}

/// Merge a set of pending changes into the tree at `base`, recursively, and
/// persist the resulting tree objects bottom-up.
///
/// Entries of the base tree absent from `pending` are carried over
/// unchanged, so untouched files are never dropped. A pending file replaces
/// an existing entry's object id but keeps its mode (preserving the
/// executable bit or symlink mode); a pending directory recurses into the
/// existing subtree. Pending names with no existing entry become new
/// entries with mode "100644" (files) or "040000" (directories).
///
/// When a pending name and an existing entry disagree on kind, the pending
/// kind wins: a file overwrites a directory entry outright, and a directory
/// is merged against an empty base. Descendants orphaned by such an
/// overwrite are not cleaned up; they stay unreferenced in the object
/// store.
///
/// Sibling subdirectory merges run concurrently; the first failure aborts
/// the whole merge. Nothing becomes visible to other readers until the
/// caller advances a ref, so partially uploaded trees are harmless.
///
/// `base = None` means an empty base (a brand-new directory). Directories
/// that end up empty are still persisted; there is no pruning.
pub fn merge_tree<'a, S>(
    store: &'a S,
    base: Option<ObjectId>,
    path: String,
    pending: &'a BTreeMap<String, ChangeNode<'a>>,
) -> BoxFuture<'a, Result<MergedTree>>
where
    S: ObjectStore + ?Sized,
{
    async move {
        let existing = match &base {
            Some(id) => store.get_tree(id).await?,
            None => Vec::new(),
        };
        trace!(
            "merge {}: {} existing, {} pending",
            path,
            existing.len(),
            pending.len()
        );

        let mut entries: Vec<TreeEntry> = Vec::new();
        let mut consumed: Vec<String> = Vec::new();
        let mut subdirs: Vec<(String, BoxFuture<'a, Result<MergedTree>>)> = Vec::new();

        // Pass 1: walk the existing tree, applying overrides and recursing
        // into changed subdirectories. Untouched entries are copied as-is.
        for entry in existing {
            match pending.get(&entry.name) {
                Some(ChangeNode::File(file)) => {
                    let id = file.require_blob_id()?.clone();
                    let mode = if entry.kind == ObjectKind::Tree {
                        MODE_BLOB.to_string()
                    } else {
                        entry.mode
                    };
                    consumed.push(entry.name.clone());
                    entries.push(TreeEntry {
                        name: entry.name,
                        mode,
                        kind: ObjectKind::Blob,
                        id,
                    });
                }
                Some(ChangeNode::Dir(sub)) => {
                    let child_base = (entry.kind == ObjectKind::Tree).then(|| entry.id.clone());
                    let child_path = paths::join(&path, &entry.name);
                    consumed.push(entry.name.clone());
                    subdirs.push((entry.name, merge_tree(store, child_base, child_path, sub)));
                }
                None => entries.push(entry),
            }
        }

        // Pass 2: pending names with no existing counterpart.
        for (name, node) in pending {
            if consumed.iter().any(|c| c == name) {
                continue;
            }
            match node {
                ChangeNode::File(file) => {
                    entries.push(TreeEntry::blob(name.clone(), file.require_blob_id()?.clone()));
                }
                ChangeNode::Dir(sub) => {
                    let child_path = paths::join(&path, name);
                    subdirs.push((name.clone(), merge_tree(store, None, child_path, sub)));
                }
            }
        }

        // Fan out the subtree merges and collect their new ids.
        let (names, jobs): (Vec<_>, Vec<_>) = subdirs.into_iter().unzip();
        let merged = try_join_all(jobs).await?;
        for (name, sub) in names.into_iter().zip(merged) {
            entries.push(TreeEntry::dir(name, sub.id));
        }

        let id = store.create_tree(entries, base.as_ref()).await?;
        Ok(MergedTree {
            id,
            path,
            parent_id: base,
        })
    }
    .boxed()
}
