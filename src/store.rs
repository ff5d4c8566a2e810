use async_trait::async_trait;

use crate::error::Result;
use crate::types::{BranchHead, DirEntry, ObjectId, TreeEntry};

/// The narrow contract the tree merge and commit orchestration run against.
///
/// Everything except [`update_ref`](ObjectStore::update_ref) is an operation
/// on immutable, content-addressed objects: objects are only ever created
/// and referenced, never mutated. The ref update is the single mutable
/// operation and the linearization point that makes a commit visible.
///
/// [`crate::client::ForgeClient`] implements this against a hosting
/// service's HTTP API; tests implement it in memory.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Current head commit and root tree of a branch.
    async fn get_branch(&self, branch: &str) -> Result<BranchHead>;

    /// The entries of the tree object with the given id.
    async fn get_tree(&self, id: &ObjectId) -> Result<Vec<TreeEntry>>;

    /// Upload raw content as a blob object, returning its id.
    async fn create_blob(&self, content: &[u8]) -> Result<ObjectId>;

    /// Persist a tree object with the given entries.
    ///
    /// `base` is a hint naming the tree this one was derived from; backing
    /// stores may use it to diff efficiently. It does not affect the
    /// resulting object.
    async fn create_tree(&self, entries: Vec<TreeEntry>, base: Option<&ObjectId>)
        -> Result<ObjectId>;

    /// Persist a commit object.
    async fn create_commit(
        &self,
        message: &str,
        tree: &ObjectId,
        parents: &[ObjectId],
    ) -> Result<ObjectId>;

    /// Fast-forward a branch to a new commit.
    ///
    /// # Errors
    /// Returns [`crate::Error::NotFastForward`] if the branch has moved
    /// since it was read; implementations must not force the update.
    async fn update_ref(&self, branch: &str, commit: &ObjectId) -> Result<()>;

    /// Raw content of the file at `path` on the branch's current head.
    async fn read_file(&self, branch: &str, path: &str) -> Result<Vec<u8>>;

    /// Directory listing at `path` on the branch's current head.
    async fn list_dir(&self, branch: &str, path: &str) -> Result<Vec<DirEntry>>;
}
