use serde::Deserialize;

use crate::error::{Error, Result};
use crate::paths;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_BRANCH: &str = "main";

/// Connection settings for one remote repository.
///
/// No hidden global state: a config is constructed explicitly and handed to
/// [`crate::client::ForgeClient`], which carries it by value.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoConfig {
    /// Base URL of the hosting service's REST API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Repository identifier in `owner/name` form.
    pub repository: String,
    /// Branch all reads and writes go against.
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Access token sent with every request.
    pub token: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

impl RepoConfig {
    pub fn new(repository: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_url: default_api_url(),
            repository: repository.into(),
            branch: default_branch(),
            token: token.into(),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Load settings from `FORGESTORE_REPOSITORY`, `FORGESTORE_TOKEN`, and
    /// optionally `FORGESTORE_BRANCH` / `FORGESTORE_API_URL`.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when a required variable is missing.
    pub fn from_env() -> Result<Self> {
        let require = |var: &str| {
            std::env::var(var).map_err(|_| Error::config(format!("{} is not set", var)))
        };

        let mut config = Self::new(require("FORGESTORE_REPOSITORY")?, require("FORGESTORE_TOKEN")?);
        if let Ok(branch) = std::env::var("FORGESTORE_BRANCH") {
            config.branch = branch;
        }
        if let Ok(api_url) = std::env::var("FORGESTORE_API_URL") {
            config.api_url = api_url;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check the config for obvious mistakes before any request is made.
    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() {
            return Err(Error::config("api_url must not be empty"));
        }
        let (owner, name) = self
            .repository
            .split_once('/')
            .ok_or_else(|| Error::config("repository must be in owner/name form"))?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(Error::config("repository must be in owner/name form"));
        }
        if self.token.is_empty() {
            return Err(Error::config("token must not be empty"));
        }
        paths::validate_ref_name(&self.branch)
    }
}
