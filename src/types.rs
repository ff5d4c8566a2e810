use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Mode constants
// ---------------------------------------------------------------------------

// Tree entry modes as they appear on the wire: POSIX-style permission
// strings, not octal integers.
pub const MODE_BLOB: &str = "100644";
pub const MODE_BLOB_EXEC: &str = "100755";
pub const MODE_LINK: &str = "120000";
pub const MODE_TREE: &str = "040000";

// ---------------------------------------------------------------------------
// ObjectId
// ---------------------------------------------------------------------------

/// Content-address (hex hash) of an immutable blob, tree, or commit object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// ObjectKind / FileType
// ---------------------------------------------------------------------------

/// The kind of object a tree entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Blob,
    Tree,
}

impl ObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
        }
    }
}

/// The type of a tree entry, derived from its mode string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Blob,
    Executable,
    Link,
    Tree,
}

impl FileType {
    /// Parse a wire mode string into a `FileType`.
    pub fn from_mode(mode: &str) -> Option<Self> {
        match mode {
            MODE_BLOB => Some(Self::Blob),
            MODE_BLOB_EXEC => Some(Self::Executable),
            MODE_LINK => Some(Self::Link),
            MODE_TREE => Some(Self::Tree),
            _ => None,
        }
    }

    /// The wire mode string for this type.
    pub fn to_mode(self) -> &'static str {
        match self {
            Self::Blob => MODE_BLOB,
            Self::Executable => MODE_BLOB_EXEC,
            Self::Link => MODE_LINK,
            Self::Tree => MODE_TREE,
        }
    }

    /// The object kind this type is stored as.
    pub fn object_kind(self) -> ObjectKind {
        match self {
            Self::Tree => ObjectKind::Tree,
            _ => ObjectKind::Blob,
        }
    }

    pub fn is_file(self) -> bool {
        matches!(self, Self::Blob | Self::Executable)
    }

    pub fn is_dir(self) -> bool {
        matches!(self, Self::Tree)
    }

    pub fn is_link(self) -> bool {
        matches!(self, Self::Link)
    }
}

// ---------------------------------------------------------------------------
// TreeEntry
// ---------------------------------------------------------------------------

/// One child of a tree object, in its wire shape.
///
/// Field names follow the hosting API's tree endpoint: `path` is the entry
/// name (a single path segment, not a full path), `sha` the object id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    #[serde(rename = "path")]
    pub name: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    #[serde(rename = "sha")]
    pub id: ObjectId,
}

impl TreeEntry {
    /// A regular-file blob entry.
    pub fn blob(name: impl Into<String>, id: ObjectId) -> Self {
        Self {
            name: name.into(),
            mode: MODE_BLOB.to_string(),
            kind: ObjectKind::Blob,
            id,
        }
    }

    /// A subdirectory entry.
    pub fn dir(name: impl Into<String>, id: ObjectId) -> Self {
        Self {
            name: name.into(),
            mode: MODE_TREE.to_string(),
            kind: ObjectKind::Tree,
            id,
        }
    }

    pub fn file_type(&self) -> Option<FileType> {
        FileType::from_mode(&self.mode)
    }
}

// ---------------------------------------------------------------------------
// BranchHead
// ---------------------------------------------------------------------------

/// The current state of a branch: its head commit and that commit's root tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchHead {
    pub name: String,
    pub commit_id: ObjectId,
    pub tree_id: ObjectId,
}

// ---------------------------------------------------------------------------
// DirEntry
// ---------------------------------------------------------------------------

/// An entry in a directory listing from the read path.
#[derive(Debug, Clone, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "sha")]
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub size: u64,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == "dir" || self.kind == "tree"
    }

    pub fn is_file(&self) -> bool {
        self.kind == "file" || self.kind == "blob"
    }
}

// ---------------------------------------------------------------------------
// CommitOptions
// ---------------------------------------------------------------------------

/// Options for creating a commit through [`crate::fs::RemoteFs::update_files`].
#[derive(Debug, Clone)]
pub struct CommitOptions {
    pub message: String,
}

impl CommitOptions {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
