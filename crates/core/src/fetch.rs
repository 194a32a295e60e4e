//! Document fetching from URLs, files, and stdin.
//!
//! Network retrieval goes through the [`DocumentFetcher`] trait so the
//! pipeline can be driven by any transport. [`HttpFetcher`] is the reqwest
//! implementation. Fetching is never retried at this layer.

use std::fs;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use tracing::info;
use url::Url;

use crate::{FetchError, Result, SynopsisError};

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
        }
    }
}

/// A fetched page body and its declared content type.
///
/// Lives only until extraction has read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub body: String,
    pub content_type: String,
}

impl RawDocument {
    pub fn new(body: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self { body: body.into(), content_type: content_type.into() }
    }

    /// Wraps markup read from a local source, which is assumed to be HTML.
    pub fn html(body: impl Into<String>) -> Self {
        Self::new(body, "text/html")
    }

    /// Whether the declared content type is HTML (case-insensitive).
    pub fn is_html(&self) -> bool {
        self.content_type.to_ascii_lowercase().contains("text/html")
    }
}

/// Capability for retrieving raw HTML.
pub trait DocumentFetcher: Send + Sync {
    /// Retrieve the document at an already-validated URL.
    fn fetch(&self, url: &Url) -> impl Future<Output = std::result::Result<RawDocument, FetchError>> + Send;
}

/// Validates a user-supplied URL.
///
/// The scheme must be `http` or `https` and the URL must carry a non-empty
/// host.
///
/// # Example
///
/// ```rust
/// use synopsis_core::validate_url;
///
/// assert!(validate_url("https://example.com/article").is_ok());
/// assert!(validate_url("ftp://example.com").is_err());
/// ```
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| SynopsisError::InvalidUrl(format!("{}: {}", url, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SynopsisError::InvalidUrl(format!(
            "{}: scheme must be http or https",
            url
        )));
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(SynopsisError::InvalidUrl(format!("{}: missing host", url))),
    }
}

/// Fetches pages over HTTP(S) with reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Build a fetcher with its own connection pool.
    pub fn new(config: FetchConfig) -> std::result::Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn map_send_error(&self, url: &Url, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout { timeout: self.config.timeout }
        } else if err.is_connect() {
            FetchError::Connect { url: url.to_string(), source: err }
        } else {
            FetchError::Request(err)
        }
    }
}

impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> std::result::Result<RawDocument, FetchError> {
        info!(url = %url, "fetching page");

        let response = self
            .client
            .get(url.clone())
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| self.map_send_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), url: url.to_string() });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let body = response.text().await.map_err(|e| self.map_send_error(url, e))?;
        info!(url = %url, chars = body.chars().count(), "page fetched");

        Ok(RawDocument { body, content_type })
    }
}

/// Reads HTML content from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &Path) -> std::result::Result<RawDocument, FetchError> {
    if !path.exists() {
        return Err(FetchError::FileNotFound(path.to_path_buf()));
    }

    Ok(RawDocument::html(fs::read_to_string(path)?))
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> std::result::Result<RawDocument, FetchError> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    Ok(RawDocument::html(buffer))
}
