//! GitHub Contents API client.
//!
//! Token comes from the resolved `Config` on every call.
//! Endpoint: `{base}/repos/{owner}/{name}/contents/{path}`

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use gitenberg_core::{
    is_markdown, ClientError, Config, ContentRemote, RemoteFileContent, RemoteFileDescriptor,
    COMMIT_MESSAGE,
};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const ACCEPT: &str = "application/vnd.github.v3+json";
const PUSH_TIMEOUT: Duration = Duration::from_secs(15);

/// Default bound on list and fetch requests.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Directory listing entry as returned by GitHub.
#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    path: String,
}

/// File payload as returned by GitHub. Every field is checked by the caller.
#[derive(Debug, Deserialize)]
struct FileResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    sha: Option<String>,
    #[serde(default)]
    content: Option<String>,
    /// `base64`, or `none` when the file is too large to be inlined
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    #[serde(default)]
    content: Option<PutContent>,
}

#[derive(Debug, Deserialize)]
struct PutContent {
    #[serde(default)]
    sha: Option<String>,
}

/// GitHub Contents API client (stateless, config provided per-call).
pub struct GitHubContentClient {
    http: Client,
    base_url: String,
    read_timeout: Duration,
}

impl Default for GitHubContentClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubContentClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_URL)
    }

    /// Target another API root (GitHub Enterprise, test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Bound list and fetch requests. Pushes keep their own 15 s limit.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// `{base}/repos/{repo}/contents/{path}` with every segment percent-encoded.
    fn contents_url(&self, repo: &str, path: &str) -> Result<Url, String> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| format!("invalid API URL {}: {}", self.base_url, e))?;
        url.path_segments_mut()
            .map_err(|_| format!("API URL {} cannot take a path", self.base_url))?
            .pop_if_empty()
            .push("repos")
            .extend(repo.split('/'))
            .push("contents")
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder, config: &Config) -> RequestBuilder {
        request
            .header("Authorization", format!("token {}", config.token))
            .header("Accept", ACCEPT)
            .header(
                "User-Agent",
                concat!("gitenberg/", env!("CARGO_PKG_VERSION")),
            )
    }
}

/// Decode GitHub's base64 payload, which wraps lines every 60 characters.
fn decode_content(path: &str, encoded: &str) -> Result<String, ClientError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ClientError::InvalidResponse(format!("{}: invalid base64: {}", path, e)))?;
    String::from_utf8(bytes)
        .map_err(|e| ClientError::InvalidResponse(format!("{}: content is not UTF-8: {}", path, e)))
}

fn transport(e: reqwest::Error) -> ClientError {
    ClientError::Transport(e.to_string())
}

#[async_trait]
impl ContentRemote for GitHubContentClient {
    #[instrument(skip(self, config), level = "debug", fields(repo = %config.repo, dir = %config.remote_dir))]
    async fn list_files(&self, config: &Config) -> Result<Vec<RemoteFileDescriptor>, ClientError> {
        let url = self
            .contents_url(&config.repo, &config.remote_dir)
            .map_err(ClientError::Transport)?;

        let resp = self
            .authorized(self.http.get(url), config)
            .timeout(self.read_timeout)
            .send()
            .await
            .map_err(transport)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(config.remote_dir.clone()));
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Transport(format!(
                "GitHub API error {}: {}",
                status, body
            )));
        }

        let body = resp.text().await.map_err(transport)?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let entries: Vec<ContentEntry> = serde_json::from_str(&body).map_err(|e| {
            ClientError::InvalidResponse(format!(
                "{} is not a directory listing: {}",
                config.remote_dir, e
            ))
        })?;

        debug!("Listed {} entries in {}", entries.len(), config.remote_dir);
        Ok(entries
            .into_iter()
            .map(|entry| RemoteFileDescriptor {
                name: entry.name,
                path: entry.path,
            })
            .collect())
    }

    #[instrument(skip(self, config), level = "debug", fields(repo = %config.repo))]
    async fn fetch_file(
        &self,
        config: &Config,
        path: &str,
        branch: &str,
    ) -> Result<RemoteFileContent, ClientError> {
        let url = self
            .contents_url(&config.repo, path)
            .map_err(ClientError::Transport)?;

        let resp = self
            .authorized(self.http.get(url), config)
            .timeout(self.read_timeout)
            .query(&[("ref", branch)])
            .send()
            .await
            .map_err(transport)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(path.to_string()));
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Transport(format!(
                "GitHub API error {}: {}",
                status, body
            )));
        }

        let file: FileResponse = resp.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("{}: undecodable file payload: {}", path, e))
        })?;

        let revision_marker = file.sha.filter(|s| !s.is_empty()).ok_or_else(|| {
            ClientError::InvalidResponse(format!("{}: missing sha", path))
        })?;

        let name = match file.name {
            Some(name) if is_markdown(&name) => name,
            Some(name) => return Err(ClientError::NotMarkdown(name)),
            None => return Err(ClientError::NotMarkdown(path.to_string())),
        };

        // Files over 1 MB come back with `encoding: none` and no inline content
        if file.encoding.as_deref().is_some_and(|enc| enc != "base64") {
            return Err(ClientError::EmptyContent(path.to_string()));
        }
        let encoded = file
            .content
            .ok_or_else(|| ClientError::EmptyContent(path.to_string()))?;
        let content = decode_content(path, &encoded)?;

        debug!("Fetched {} ({} bytes, sha {})", path, content.len(), revision_marker);
        Ok(RemoteFileContent {
            name,
            path: file.path.unwrap_or_else(|| path.to_string()),
            content,
            revision_marker,
        })
    }

    #[instrument(skip(self, config, content), level = "debug", fields(repo = %config.repo, content_len = content.len()))]
    async fn push_file(
        &self,
        config: &Config,
        path: &str,
        content: &str,
        previous_marker: Option<&str>,
        branch: &str,
    ) -> Result<String, ClientError> {
        let write_failed = |status: Option<u16>, reason: String| ClientError::WriteFailed {
            path: path.to_string(),
            status,
            reason,
        };
        let url = self
            .contents_url(&config.repo, path)
            .map_err(|reason| write_failed(None, reason))?;

        let request = PutRequest {
            message: COMMIT_MESSAGE,
            content: STANDARD.encode(content.as_bytes()),
            branch,
            sha: previous_marker.filter(|s| !s.is_empty()),
        };

        let resp = self
            .authorized(self.http.put(url), config)
            .timeout(PUSH_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| write_failed(None, e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(write_failed(
                Some(status.as_u16()),
                format!("GitHub API error {}: {}", status, body),
            ));
        }

        let written: PutResponse = resp.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("{}: undecodable write response: {}", path, e))
        })?;

        let revision_marker = written
            .content
            .and_then(|c| c.sha)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ClientError::InvalidResponse(format!("{}: write returned no sha", path)))?;

        debug!("Pushed {} to {} (sha {})", path, branch, revision_marker);
        Ok(revision_marker)
    }
}
