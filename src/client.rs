use async_trait::async_trait;
use log::trace;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::config::RepoConfig;
use crate::encode::{decode_base64, ContentEncoding};
use crate::error::{Error, Result};
use crate::fs::RemoteFs;
use crate::store::ObjectStore;
use crate::types::{BranchHead, DirEntry, ObjectId, TreeEntry};

const USER_AGENT: &str = concat!("forgestore/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github.v3+json";

/// [`ObjectStore`] implementation over a GitHub-style REST API.
///
/// Holds the repository configuration and an HTTP connection pool; cheap to
/// pass around by reference. Every request carries the access token — there
/// is no shared global client or token.
///
/// Failures map as follows: network errors become [`Error::Transport`],
/// non-2xx responses become [`Error::Http`] (404s on known lookups become
/// [`Error::NotFound`]), and a rejected ref update becomes
/// [`Error::NotFastForward`]. Nothing is retried internally.
pub struct ForgeClient {
    http: reqwest::Client,
    config: RepoConfig,
    encoding: ContentEncoding,
}

impl ForgeClient {
    /// Build a client for the repository named in `config`.
    pub fn new(config: RepoConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(Error::transport)?;
        Ok(Self {
            http,
            config,
            encoding: ContentEncoding::default(),
        })
    }

    /// Use a different blob upload encoding (default is base64).
    pub fn with_encoding(mut self, encoding: ContentEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// Consume the client and return a [`RemoteFs`] view of the configured
    /// branch.
    pub fn fs(self) -> Result<RemoteFs<ForgeClient>> {
        let branch = self.config.branch.clone();
        RemoteFs::new(self, branch)
    }

    fn repo_url(&self, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.repository,
            tail
        )
    }

    /// Send an authenticated JSON request and parse the response body.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        trace!("{} {}", method, url);

        let mut req = self
            .http
            .request(method, &url)
            .header("Authorization", format!("token {}", self.config.token))
            .header("User-Agent", USER_AGENT)
            .header("Accept", ACCEPT);
        if let Some(body) = &body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(Error::transport)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::http(status.as_u16(), body));
        }

        resp.json::<T>().await.map_err(Error::transport)
    }

    async fn contents(&self, branch: &str, path: &str) -> Result<serde_json::Value> {
        // Segments can contain characters with URL meaning (`#`, `?`,
        // spaces); escape each one but keep the `/` separators literal.
        let escaped: Vec<_> = path.split('/').map(urlencoding::encode).collect();
        let url = self.repo_url(&format!(
            "contents/{}?ref={}",
            escaped.join("/"),
            urlencoding::encode(branch)
        ));
        self.request(Method::GET, url, None)
            .await
            .map_err(|e| match e.status() {
                Some(404) => Error::not_found(path),
                _ => e,
            })
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ShaObject {
    sha: ObjectId,
}

#[derive(Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct BranchResponse {
    commit: BranchCommit,
}

#[derive(Deserialize)]
struct BranchCommit {
    sha: ObjectId,
    commit: BranchCommitDetail,
}

#[derive(Deserialize)]
struct BranchCommitDetail {
    tree: ShaObject,
}

#[derive(Deserialize)]
struct ContentsFile {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

// ---------------------------------------------------------------------------
// ObjectStore
// ---------------------------------------------------------------------------

#[async_trait]
impl ObjectStore for ForgeClient {
    async fn get_branch(&self, branch: &str) -> Result<BranchHead> {
        let url = self.repo_url(&format!("branches/{}", branch));
        let resp: BranchResponse =
            self.request(Method::GET, url, None)
                .await
                .map_err(|e| match e.status() {
                    Some(404) => Error::not_found(format!("branch '{}'", branch)),
                    _ => e,
                })?;
        Ok(BranchHead {
            name: branch.to_string(),
            commit_id: resp.commit.sha,
            tree_id: resp.commit.commit.tree.sha,
        })
    }

    async fn get_tree(&self, id: &ObjectId) -> Result<Vec<TreeEntry>> {
        let url = self.repo_url(&format!("git/trees/{}", id));
        let resp: TreeResponse =
            self.request(Method::GET, url, None)
                .await
                .map_err(|e| match e.status() {
                    Some(404) => Error::not_found(format!("tree {}", id)),
                    _ => e,
                })?;
        if resp.truncated {
            // A partial listing would make the merge drop whatever was cut
            // off, so refuse to proceed with it.
            return Err(Error::truncated_tree(format!(
                "tree {} has more entries than the server returns in one response",
                id
            )));
        }
        Ok(resp.tree)
    }

    async fn create_blob(&self, content: &[u8]) -> Result<ObjectId> {
        let url = self.repo_url("git/blobs");
        let body = json!({
            "content": self.encoding.encode(content)?,
            "encoding": self.encoding.wire_name(),
        });
        let resp: ShaObject = self.request(Method::POST, url, Some(body)).await?;
        Ok(resp.sha)
    }

    async fn create_tree(
        &self,
        entries: Vec<TreeEntry>,
        base: Option<&ObjectId>,
    ) -> Result<ObjectId> {
        let url = self.repo_url("git/trees");
        let mut body = json!({ "tree": entries });
        if let Some(base) = base {
            body["base_tree"] = json!(base);
        }
        let resp: ShaObject = self.request(Method::POST, url, Some(body)).await?;
        Ok(resp.sha)
    }

    async fn create_commit(
        &self,
        message: &str,
        tree: &ObjectId,
        parents: &[ObjectId],
    ) -> Result<ObjectId> {
        let url = self.repo_url("git/commits");
        let body = json!({
            "message": message,
            "tree": tree,
            "parents": parents,
        });
        let resp: ShaObject = self.request(Method::POST, url, Some(body)).await?;
        Ok(resp.sha)
    }

    async fn update_ref(&self, branch: &str, commit: &ObjectId) -> Result<()> {
        let url = self.repo_url(&format!("git/refs/heads/{}", branch));
        let body = json!({ "sha": commit, "force": false });
        let _: serde_json::Value = self
            .request(Method::PATCH, url, Some(body))
            .await
            .map_err(|e| match e {
                // The ref endpoint rejects a non-fast-forward update with a
                // conflict status; surface it instead of forcing.
                Error::Http { status, body } if status == 409 || status == 422 => {
                    Error::not_fast_forward(format!("branch '{}' has moved: {}", branch, body))
                }
                other => other,
            })?;
        Ok(())
    }

    async fn read_file(&self, branch: &str, path: &str) -> Result<Vec<u8>> {
        let value = self.contents(branch, path).await?;
        if value.is_array() {
            return Err(Error::is_a_directory(path));
        }

        let file: ContentsFile = serde_json::from_value(value)?;
        match file.encoding.as_str() {
            "base64" => decode_base64(&file.content),
            "utf-8" => Ok(file.content.into_bytes()),
            other => Err(Error::decode(format!(
                "{}: unsupported content encoding '{}'",
                path, other
            ))),
        }
    }

    async fn list_dir(&self, branch: &str, path: &str) -> Result<Vec<DirEntry>> {
        let value = self.contents(branch, path).await?;
        if !value.is_array() {
            return Err(Error::not_a_directory(path));
        }
        Ok(serde_json::from_value(value)?)
    }
}
