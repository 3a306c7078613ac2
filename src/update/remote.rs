//! Read-only access to the remote game repository.
//!
//! [`RemoteRepository`] is the seam the orchestrator talks to. [`GitHubClient`]
//! implements it on top of the GitHub REST API and the raw content host:
//!
//! - `GET {api_base}/repos/{owner}/{repo}/commits/{branch}` for the latest revision
//! - `GET {api_base}/repos/{owner}/{repo}/git/trees/{revision}?recursive=1` for the listing
//! - `GET {raw_base}/{owner}/{repo}/{branch}/{path}` for file content
//!
//! API requests that fail transiently (transport errors, 429, 5xx) are retried
//! with exponential backoff. Content fetches are not retried; a failed file is
//! reported to the caller, which skips it.

use crate::config::UpdaterConfig;
use crate::constants::{
    RETRY_BACKOFF_BASE_MS, RETRY_BACKOFF_FACTOR, RETRY_MAX_DELAY, SHORT_REVISION_LEN, USER_AGENT,
};
use crate::core::{Result, UpdaterError};
use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

/// The head revision of the tracked branch.
#[derive(Debug, Clone, PartialEq)]
pub struct RevisionDescriptor {
    /// Full revision id (commit sha).
    pub id: String,
    /// The complete commit payload as returned by the API.
    pub raw: Value,
}

impl RevisionDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            raw: Value::Null,
        }
    }

    /// Parse a commit payload; only `sha` is required.
    pub fn from_payload(raw: Value) -> Result<Self> {
        let id = raw
            .get("sha")
            .and_then(Value::as_str)
            .filter(|sha| !sha.is_empty())
            .ok_or_else(|| UpdaterError::Parse {
                what: "commit response".to_string(),
                reason: "missing `sha`".to_string(),
            })?
            .to_string();
        Ok(Self { id, raw })
    }

    /// The id abbreviated for display.
    pub fn short_id(&self) -> &str {
        short_revision(&self.id)
    }

    /// First line of the commit message, when the payload carries one.
    pub fn summary(&self) -> Option<&str> {
        self.raw
            .pointer("/commit/message")
            .and_then(Value::as_str)
            .and_then(|message| message.lines().next())
    }
}

/// Abbreviate a revision id for display.
pub fn short_revision(id: &str) -> &str {
    id.get(..SHORT_REVISION_LEN).unwrap_or(id)
}

/// Kind of a listing entry. Only blobs are downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    #[serde(other)]
    Other,
}

/// One entry of the recursive repository listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFileEntry {
    /// Path relative to the repository root, `/`-separated.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl RemoteFileEntry {
    pub fn blob(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
        }
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Tree,
        }
    }
}

/// Downloaded file content with the server's declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl FileContent {
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: Option<&str>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.map(str::to_string),
        }
    }
}

/// Read-only view of the repository that publishes game files.
pub trait RemoteRepository {
    /// Head revision of the tracked branch.
    fn latest_revision(&self) -> impl Future<Output = Result<RevisionDescriptor>> + Send;

    /// Every entry of the repository at `revision_id`, recursively.
    fn list_files(
        &self,
        revision_id: &str,
    ) -> impl Future<Output = Result<Vec<RemoteFileEntry>>> + Send;

    /// Content of one file on the tracked branch.
    fn fetch_file(&self, path: &str) -> impl Future<Output = Result<FileContent>> + Send;
}

#[derive(Deserialize)]
struct TreeResponse {
    tree: Vec<RemoteFileEntry>,
    #[serde(default)]
    truncated: bool,
}

/// [`RemoteRepository`] backed by GitHub.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: Url,
    raw_base: Url,
    owner: String,
    repo: String,
    branch: String,
    token: Option<String>,
    max_retries: usize,
}

impl GitHubClient {
    /// Build a client from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Config`] for unusable base URLs and
    /// [`UpdaterError::Network`] if the HTTP client cannot be constructed.
    pub fn new(config: &UpdaterConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| UpdaterError::network("create HTTP client", "", &e))?;

        Ok(Self {
            http,
            api_base: parse_base(&config.api_base, "api_base")?,
            raw_base: parse_base(&config.raw_base, "raw_base")?,
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
            token: config.resolved_token(),
            max_retries: config.max_retries,
        })
    }

    /// `owner/repo@branch`, for display.
    pub fn describe(&self) -> String {
        format!("{}/{}@{}", self.owner, self.repo, self.branch)
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| cannot_be_base("api_base"))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn commit_url(&self) -> Result<Url> {
        self.api_url(&["commits", self.branch.as_str()])
    }

    fn tree_url(&self, revision_id: &str) -> Result<Url> {
        let mut url = self.api_url(&["git", "trees", revision_id])?;
        url.query_pairs_mut().append_pair("recursive", "1");
        Ok(url)
    }

    fn raw_url(&self, path: &str) -> Result<Url> {
        let mut url = self.raw_base.clone();
        url.path_segments_mut()
            .map_err(|()| cannot_be_base("raw_base"))?
            .pop_if_empty()
            .extend([self.owner.as_str(), self.repo.as_str(), self.branch.as_str()])
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    async fn send(&self, operation: &str, url: &Url, api: bool) -> Result<reqwest::Response> {
        let mut request = self.http.get(url.clone());
        if api {
            request = request.header(ACCEPT, "application/vnd.github+json");
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| UpdaterError::network(operation, url.as_str(), &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdaterError::HttpStatus {
                operation: operation.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn get_json_once<T>(&self, operation: &str, url: &Url) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.send(operation, url, true).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| UpdaterError::network(operation, url.as_str(), &e))?;
        serde_json::from_slice(&body).map_err(|e| UpdaterError::Parse {
            what: format!("{operation} response"),
            reason: e.to_string(),
        })
    }

    /// GET a JSON document from the API, retrying transient failures.
    async fn get_json<T>(&self, operation: &str, url: &Url) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let strategy = ExponentialBackoff::from_millis(RETRY_BACKOFF_BASE_MS)
            .factor(RETRY_BACKOFF_FACTOR)
            .max_delay(RETRY_MAX_DELAY)
            .map(jitter)
            .take(self.max_retries);

        RetryIf::spawn(
            strategy,
            || self.get_json_once(operation, url),
            |e: &UpdaterError| {
                let retry = e.is_transient();
                if retry {
                    debug!("Retrying {} after transient error: {}", operation, e);
                }
                retry
            },
        )
        .await
    }
}

impl RemoteRepository for GitHubClient {
    async fn latest_revision(&self) -> Result<RevisionDescriptor> {
        let url = self.commit_url()?;
        debug!("Fetching latest commit from {}", url);
        let payload: Value = self.get_json("fetch latest commit", &url).await?;
        RevisionDescriptor::from_payload(payload)
    }

    async fn list_files(&self, revision_id: &str) -> Result<Vec<RemoteFileEntry>> {
        let url = self.tree_url(revision_id)?;
        debug!("Fetching file tree from {}", url);
        let listing: TreeResponse = self.get_json("list repository files", &url).await?;
        if listing.truncated {
            warn!(
                "Repository listing for {} was truncated by the server; some files will not be updated",
                short_revision(revision_id)
            );
        }
        Ok(listing.tree)
    }

    async fn fetch_file(&self, path: &str) -> Result<FileContent> {
        let url = self.raw_url(path)?;
        let operation = format!("download {path}");
        let response = self.send(&operation, &url, false).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpdaterError::network(&operation, url.as_str(), &e))?;
        Ok(FileContent {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

fn parse_base(value: &str, field: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| UpdaterError::Config {
        message: format!("`{field}` is not a valid URL ({value}): {e}"),
    })
}

fn cannot_be_base(field: &str) -> UpdaterError {
    UpdaterError::Config {
        message: format!("`{field}` cannot be used as a base URL"),
    }
}
