use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::paths;
use crate::types::ObjectId;

/// A file queued for inclusion in the next commit.
///
/// `blob_id` starts out `None` and is filled in once the content has been
/// uploaded; it must be set before the file is referenced by a tree entry.
#[derive(Debug, Clone)]
pub struct PendingFile {
    /// Slash-separated path relative to the repository root.
    pub path: String,
    /// Raw content to upload.
    pub content: Vec<u8>,
    /// Object id assigned by the blob upload, if it has happened.
    pub blob_id: Option<ObjectId>,
}

impl PendingFile {
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            blob_id: None,
        }
    }

    pub fn from_text(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(path, text.into().into_bytes())
    }

    /// Whether the content has been uploaded as a blob.
    pub fn is_uploaded(&self) -> bool {
        self.blob_id.is_some()
    }

    /// The uploaded blob id, or [`Error::UploadIncomplete`] if the upload
    /// step was skipped.
    pub fn require_blob_id(&self) -> Result<&ObjectId> {
        self.blob_id
            .as_ref()
            .ok_or_else(|| Error::upload_incomplete(&self.path))
    }
}

/// One node of the transient change tree built for a single update call:
/// either a file leaf or a nested directory. Borrows the caller's files so
/// that blob ids assigned during upload stay with the caller even when the
/// update later fails.
#[derive(Debug)]
pub enum ChangeNode<'a> {
    File(&'a PendingFile),
    Dir(BTreeMap<String, ChangeNode<'a>>),
}

impl ChangeNode<'_> {
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

/// Group a flat list of pending files into a nested directory structure
/// keyed by normalized path segment.
///
/// A later file at the same path replaces an earlier one. A path that is
/// both a file and a directory prefix within the same change set (e.g.
/// `a.txt` and `a.txt/b`) is rejected.
///
/// # Errors
/// Returns [`Error::InvalidPath`] for malformed paths or file/directory
/// conflicts within the change set.
pub fn group_changes(files: &[PendingFile]) -> Result<BTreeMap<String, ChangeNode<'_>>> {
    let mut root: BTreeMap<String, ChangeNode<'_>> = BTreeMap::new();

    for file in files {
        let path = paths::normalize_path(&file.path)?;
        if path.is_empty() {
            return Err(Error::invalid_path("file path must not be the root"));
        }

        let segs: Vec<&str> = paths::segments(&path).collect();
        let (leaf, dirs) = segs.split_last().expect("normalized path has segments");

        let mut node = &mut root;
        for (i, seg) in dirs.iter().enumerate() {
            let child = node
                .entry(seg.to_string())
                .or_insert_with(|| ChangeNode::Dir(BTreeMap::new()));
            node = match child {
                ChangeNode::Dir(map) => map,
                ChangeNode::File(_) => {
                    return Err(Error::invalid_path(format!(
                        "'{}' is both a file and a directory in this change set",
                        segs[..=i].join("/")
                    )));
                }
            };
        }

        match node.get(*leaf) {
            Some(ChangeNode::Dir(_)) => {
                return Err(Error::invalid_path(format!(
                    "'{}' is both a file and a directory in this change set",
                    path
                )));
            }
            // Same path written twice: last one wins.
            _ => {
                node.insert(leaf.to_string(), ChangeNode::File(file));
            }
        }
    }

    Ok(root)
}
