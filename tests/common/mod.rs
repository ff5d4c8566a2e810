#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sha1::{Digest, Sha1};

use forgestore::*;

/// In-memory content-addressed object store with one mutable ref table.
///
/// Mirrors the remote contract closely enough to exercise the merge and
/// commit paths: identical content hashes to identical ids, and a ref
/// update is rejected unless the current head is an ancestor of the new
/// commit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    blobs: HashMap<ObjectId, Vec<u8>>,
    trees: HashMap<ObjectId, Vec<TreeEntry>>,
    commits: HashMap<ObjectId, StoredCommit>,
    branches: HashMap<String, ObjectId>,
    fail_commit_create: bool,
    hijack_ref: Option<ObjectId>,
}

#[derive(Debug, Clone)]
pub struct StoredCommit {
    pub message: String,
    pub tree: ObjectId,
    pub parents: Vec<ObjectId>,
}

fn oid(kind: &str, payload: &[u8]) -> ObjectId {
    let mut hasher = Sha1::new();
    hasher.update(kind.as_bytes());
    hasher.update(b"\0");
    hasher.update(payload);
    ObjectId::new(hex::encode(hasher.finalize()))
}

fn is_ancestor(state: &State, ancestor: &ObjectId, descendant: &ObjectId) -> bool {
    let mut stack = vec![descendant.clone()];
    while let Some(id) = stack.pop() {
        if &id == ancestor {
            return true;
        }
        if let Some(commit) = state.commits.get(&id) {
            stack.extend(commit.parents.iter().cloned());
        }
    }
    false
}

impl MemoryStore {
    /// Point `branch` at `commit` directly, bypassing the fast-forward
    /// check. Test setup only.
    pub fn set_branch(&self, branch: &str, commit: ObjectId) {
        self.state
            .lock()
            .unwrap()
            .branches
            .insert(branch.to_string(), commit);
    }

    pub fn branch_commit(&self, branch: &str) -> Option<ObjectId> {
        self.state.lock().unwrap().branches.get(branch).cloned()
    }

    pub fn commit(&self, id: &ObjectId) -> Option<StoredCommit> {
        self.state.lock().unwrap().commits.get(id).cloned()
    }

    pub fn blob(&self, id: &ObjectId) -> Option<Vec<u8>> {
        self.state.lock().unwrap().blobs.get(id).cloned()
    }

    /// Make the next `create_commit` fail with an injected HTTP 500.
    pub fn fail_next_commit(&self) {
        self.state.lock().unwrap().fail_commit_create = true;
    }

    /// Move the branch to `commit` at the start of the next `update_ref`,
    /// simulating a concurrent writer racing the caller.
    pub fn hijack_ref_with(&self, commit: ObjectId) {
        self.state.lock().unwrap().hijack_ref = Some(commit);
    }

    fn walk<'a>(
        state: &'a State,
        tree_id: &ObjectId,
        path: &str,
    ) -> Result<Option<&'a TreeEntry>> {
        let mut tree = state
            .trees
            .get(tree_id)
            .ok_or_else(|| Error::not_found(format!("tree {}", tree_id)))?;
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let mut found: Option<&TreeEntry> = None;
        for (i, segment) in segments.iter().enumerate() {
            let entry = match tree.iter().find(|e| &e.name == segment) {
                Some(entry) => entry,
                None => return Ok(None),
            };
            if i < segments.len() - 1 {
                if entry.kind != ObjectKind::Tree {
                    return Err(Error::not_a_directory(segments[..=i].join("/")));
                }
                tree = state
                    .trees
                    .get(&entry.id)
                    .ok_or_else(|| Error::not_found(format!("tree {}", entry.id)))?;
            } else {
                found = Some(entry);
            }
        }
        Ok(found)
    }

    fn head_tree(state: &State, branch: &str) -> Result<ObjectId> {
        let commit_id = state
            .branches
            .get(branch)
            .ok_or_else(|| Error::not_found(format!("branch '{}'", branch)))?;
        let commit = state
            .commits
            .get(commit_id)
            .ok_or_else(|| Error::not_found(format!("commit {}", commit_id)))?;
        Ok(commit.tree.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get_branch(&self, branch: &str) -> Result<BranchHead> {
        let state = self.state.lock().unwrap();
        let commit_id = state
            .branches
            .get(branch)
            .ok_or_else(|| Error::not_found(format!("branch '{}'", branch)))?
            .clone();
        let commit = state
            .commits
            .get(&commit_id)
            .ok_or_else(|| Error::not_found(format!("commit {}", commit_id)))?;
        Ok(BranchHead {
            name: branch.to_string(),
            commit_id: commit_id.clone(),
            tree_id: commit.tree.clone(),
        })
    }

    async fn get_tree(&self, id: &ObjectId) -> Result<Vec<TreeEntry>> {
        self.state
            .lock()
            .unwrap()
            .trees
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("tree {}", id)))
    }

    async fn create_blob(&self, content: &[u8]) -> Result<ObjectId> {
        let id = oid("blob", content);
        self.state
            .lock()
            .unwrap()
            .blobs
            .insert(id.clone(), content.to_vec());
        Ok(id)
    }

    async fn create_tree(
        &self,
        entries: Vec<TreeEntry>,
        _base: Option<&ObjectId>,
    ) -> Result<ObjectId> {
        let mut sorted = entries.clone();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        for pair in sorted.windows(2) {
            assert_ne!(pair[0].name, pair[1].name, "duplicate tree entry name");
        }
        let payload = serde_json::to_vec(&sorted)?;
        let id = oid("tree", &payload);
        self.state.lock().unwrap().trees.insert(id.clone(), entries);
        Ok(id)
    }

    async fn create_commit(
        &self,
        message: &str,
        tree: &ObjectId,
        parents: &[ObjectId],
    ) -> Result<ObjectId> {
        let mut state = self.state.lock().unwrap();
        if state.fail_commit_create {
            state.fail_commit_create = false;
            return Err(Error::http(500, "injected commit failure"));
        }
        let payload = format!(
            "{}\0{}\0{}",
            message,
            tree,
            parents
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(",")
        );
        let id = oid("commit", payload.as_bytes());
        state.commits.insert(
            id.clone(),
            StoredCommit {
                message: message.to_string(),
                tree: tree.clone(),
                parents: parents.to_vec(),
            },
        );
        Ok(id)
    }

    async fn update_ref(&self, branch: &str, commit: &ObjectId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(hijack) = state.hijack_ref.take() {
            state.branches.insert(branch.to_string(), hijack);
        }

        let current = state
            .branches
            .get(branch)
            .ok_or_else(|| Error::not_found(format!("branch '{}'", branch)))?
            .clone();
        if &current != commit && !is_ancestor(&state, &current, commit) {
            return Err(Error::not_fast_forward(format!(
                "branch '{}' is at {}, not an ancestor of {}",
                branch, current, commit
            )));
        }
        state.branches.insert(branch.to_string(), commit.clone());
        Ok(())
    }

    async fn read_file(&self, branch: &str, path: &str) -> Result<Vec<u8>> {
        let state = self.state.lock().unwrap();
        let tree_id = Self::head_tree(&state, branch)?;
        let entry = Self::walk(&state, &tree_id, path)?
            .ok_or_else(|| Error::not_found(path))?;
        if entry.kind == ObjectKind::Tree {
            return Err(Error::is_a_directory(path));
        }
        state
            .blobs
            .get(&entry.id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("blob {}", entry.id)))
    }

    async fn list_dir(&self, branch: &str, path: &str) -> Result<Vec<DirEntry>> {
        let state = self.state.lock().unwrap();
        let tree_id = Self::head_tree(&state, branch)?;

        let target = if path.is_empty() {
            tree_id
        } else {
            let entry = Self::walk(&state, &tree_id, path)?
                .ok_or_else(|| Error::not_found(path))?;
            if entry.kind != ObjectKind::Tree {
                return Err(Error::not_a_directory(path));
            }
            entry.id.clone()
        };

        let tree = state
            .trees
            .get(&target)
            .ok_or_else(|| Error::not_found(format!("tree {}", target)))?;
        Ok(tree
            .iter()
            .map(|e| {
                let full = if path.is_empty() {
                    e.name.clone()
                } else {
                    format!("{}/{}", path, e.name)
                };
                let json = serde_json::json!({
                    "name": e.name,
                    "path": full,
                    "sha": e.id,
                    "type": if e.kind == ObjectKind::Tree { "dir" } else { "file" },
                    "size": state.blobs.get(&e.id).map(|b| b.len()).unwrap_or(0),
                });
                serde_json::from_value(json).expect("dir entry shape")
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A store with an empty-tree initial commit on `branch`.
pub async fn init_store(branch: &str) -> MemoryStore {
    let store = MemoryStore::default();
    let tree = store.create_tree(vec![], None).await.unwrap();
    let commit = store.create_commit("init", &tree, &[]).await.unwrap();
    store.set_branch(branch, commit);
    store
}

/// A `RemoteFs` on `main` over a freshly initialized store.
pub async fn empty_fs() -> RemoteFs<MemoryStore> {
    RemoteFs::new(init_store("main").await, "main").unwrap()
}

/// A `RemoteFs` on `main` seeded with a few files.
pub async fn seeded_fs() -> RemoteFs<MemoryStore> {
    let fs = empty_fs().await;
    let mut files = [
        PendingFile::from_text("hello.txt", "hello"),
        PendingFile::from_text("dir/a.txt", "aaa"),
        PendingFile::from_text("dir/b.txt", "bbb"),
    ];
    fs.update_files(&mut files, CommitOptions::new("seed"))
        .await
        .unwrap();
    fs
}

/// A pending file whose content is already uploaded to `store`.
pub async fn uploaded(store: &MemoryStore, path: &str, content: &str) -> PendingFile {
    let mut file = PendingFile::from_text(path, content);
    file.blob_id = Some(store.create_blob(&file.content).await.unwrap());
    file
}
