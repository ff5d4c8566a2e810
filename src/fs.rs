use futures::future::try_join_all;
use log::debug;

use crate::error::{Error, Result};
use crate::merge::merge_tree;
use crate::paths;
use crate::pending::{group_changes, PendingFile};
use crate::store::ObjectStore;
use crate::types::{BranchHead, CommitOptions, DirEntry, ObjectId};

/// A file-level view of one branch of a remote repository.
///
/// Reads go straight to the branch's current head. [`update_files`]
/// publishes a set of changed files as one atomic commit: the branch ref
/// either advances to a commit containing every file, or nothing visible
/// changes.
///
/// [`update_files`]: RemoteFs::update_files
#[derive(Debug)]
pub struct RemoteFs<S> {
    store: S,
    branch: String,
}

impl<S: ObjectStore> RemoteFs<S> {
    /// Create a view of `branch` backed by `store`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRefName`] for a malformed branch name.
    pub fn new(store: S, branch: impl Into<String>) -> Result<Self> {
        let branch = branch.into();
        paths::validate_ref_name(&branch)?;
        Ok(Self { store, branch })
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current head commit and root tree of the branch.
    pub async fn head(&self) -> Result<BranchHead> {
        self.store.get_branch(&self.branch).await
    }

    // -- Write path ---------------------------------------------------------

    /// Commit a set of added/changed files to the branch as one commit.
    ///
    /// Steps, in order: upload the content of every file that does not yet
    /// carry a blob id (concurrently, all-or-nothing); group the files into
    /// a directory structure; read the branch head; merge the changes into
    /// the head's tree; create a commit whose parent is the previous head;
    /// fast-forward the branch ref.
    ///
    /// The ref update is the only externally visible effect. Any failure
    /// aborts the whole call, leaving the branch untouched; already
    /// uploaded blobs and trees stay behind unreferenced, which is
    /// harmless. Blob ids are written back into `files` as uploads finish,
    /// so files uploaded by a failed attempt keep their ids and are not
    /// re-uploaded when the same slice is passed again.
    ///
    /// Returns the new commit id, or `None` when `files` is empty.
    ///
    /// # Errors
    /// Returns [`Error::NotFastForward`] if the branch advanced while the
    /// commit was being built; the caller decides whether to retry.
    pub async fn update_files(
        &self,
        files: &mut [PendingFile],
        options: CommitOptions,
    ) -> Result<Option<ObjectId>> {
        if files.is_empty() {
            return Ok(None);
        }

        let uploads: Vec<_> = files
            .iter_mut()
            .filter(|f| !f.is_uploaded())
            .map(|f| async move {
                let id = self.store.create_blob(&f.content).await?;
                f.blob_id = Some(id);
                Ok::<_, Error>(())
            })
            .collect();
        let uploaded = uploads.len();
        try_join_all(uploads).await?;
        debug!("uploaded {} blobs ({} files total)", uploaded, files.len());

        let pending = group_changes(files)?;
        let head = self.store.get_branch(&self.branch).await?;

        let merged = merge_tree(
            &self.store,
            Some(head.tree_id.clone()),
            "/".to_string(),
            &pending,
        )
        .await?;
        debug!("merged root tree {} (base {})", merged.id, head.tree_id);

        let commit = self
            .store
            .create_commit(
                &options.message,
                &merged.id,
                std::slice::from_ref(&head.commit_id),
            )
            .await?;

        self.store.update_ref(&self.branch, &commit).await?;
        debug!("branch {} advanced to {}", self.branch, commit);

        Ok(Some(commit))
    }

    // -- Read path ----------------------------------------------------------

    /// Raw content of the file at `path` on the branch's current head.
    pub async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let path = paths::normalize_path(path)?;
        if path.is_empty() {
            return Err(Error::is_a_directory("/"));
        }
        self.store.read_file(&self.branch, &path).await
    }

    /// UTF-8 content of the file at `path`.
    pub async fn read_text(&self, path: &str) -> Result<String> {
        let data = self.read(path).await?;
        String::from_utf8(data)
            .map_err(|e| Error::decode(format!("{}: not valid utf-8: {}", path, e)))
    }

    /// Directory listing at `path` on the branch's current head. Pass an
    /// empty or root path to list the top level.
    pub async fn list(&self, path: &str) -> Result<Vec<DirEntry>> {
        let path = paths::normalize_path(path)?;
        self.store.list_dir(&self.branch, &path).await
    }
}
