/// All errors produced by forgestore.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("is a directory: {0}")]
    IsADirectory(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),

    #[error("invalid config: {0}")]
    Config(String),

    /// A pending file reached the tree merge without an uploaded blob id.
    /// Indicates a step-ordering bug in the caller, not a remote failure.
    #[error("upload incomplete: {0} has no blob id")]
    UploadIncomplete(String),

    /// The branch advanced while we were building the commit. Surfaced to
    /// the caller; never retried or force-pushed internally.
    #[error("not a fast-forward: {0}")]
    NotFastForward(String),

    /// The server returned a partial tree listing. Merging against it
    /// would silently drop the entries that were cut off, so the whole
    /// operation aborts instead.
    #[error("truncated tree listing: {0}")]
    TruncatedTree(String),

    #[error("http {status}: {body}")]
    Http { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }

    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    pub fn invalid_ref_name(name: impl Into<String>) -> Self {
        Self::InvalidRefName(name.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn upload_incomplete(path: impl Into<String>) -> Self {
        Self::UploadIncomplete(path.into())
    }

    pub fn not_fast_forward(msg: impl Into<String>) -> Self {
        Self::NotFastForward(msg.into())
    }

    pub fn truncated_tree(msg: impl Into<String>) -> Self {
        Self::TruncatedTree(msg.into())
    }

    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }

    pub fn transport_msg(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into().into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// HTTP status of the underlying response, when this is an HTTP error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
