//! A versioned file store backed by a remote git hosting HTTP API.
//!
//! `forgestore` lets an application persist file changes into a Git
//! repository hosted on a service like GitHub, using the service's
//! tree/blob/commit REST endpoints instead of local git tooling. A set of
//! added or changed files is merged into the repository's existing tree
//! recursively — untouched files are never disturbed — and published as a
//! single commit; the branch ref update at the end is the one atomic,
//! externally visible step.
//!
//! # Key types
//!
//! - [`ForgeClient`] — authenticated HTTP access to one repository's
//!   object store.
//! - [`RemoteFs`] — a file-level view of one branch: read, list, and
//!   [`update_files`](RemoteFs::update_files) for atomic multi-file
//!   commits.
//! - [`ObjectStore`] — the narrow object-store contract the merge runs
//!   against; swap in your own implementation for testing or another
//!   backend.
//! - [`PendingFile`] — one file queued for the next commit.
//!
//! # Quick example
//!
//! ```rust,no_run
//! use forgestore::{CommitOptions, ForgeClient, PendingFile, RepoConfig};
//!
//! # async fn demo() -> forgestore::Result<()> {
//! let config = RepoConfig::new("octo/widgets", "t0ken").with_branch("main");
//! let fs = ForgeClient::new(config)?.fs()?;
//!
//! let mut files = vec![
//!     PendingFile::from_text("docs/intro.md", "# Intro"),
//!     PendingFile::from_text("docs/img/logo.svg", "<svg/>"),
//! ];
//! fs.update_files(&mut files, CommitOptions::new("Update docs")).await?;
//!
//! let intro = fs.read_text("docs/intro.md").await?;
//! # let _ = intro;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod fs;
pub mod merge;
pub mod paths;
pub mod pending;
pub mod store;
pub mod types;

// Re-export primary public types at crate root.
pub use client::ForgeClient;
pub use config::RepoConfig;
pub use encode::ContentEncoding;
pub use error::{Error, Result};
pub use fs::RemoteFs;
pub use merge::{merge_tree, MergedTree};
pub use pending::{group_changes, ChangeNode, PendingFile};
pub use store::ObjectStore;
pub use types::*;
