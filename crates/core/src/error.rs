//! Error types for Synopsis operations.
//!
//! [`SynopsisError`] is the terminal error of a summarization request. Each
//! variant corresponds to one pipeline stage, so callers can report which
//! stage failed and why. The fetch and provider stages have their own enums
//! ([`FetchError`], [`ProviderError`]) carrying the proximate cause.
//!
//! # Example
//!
//! ```rust
//! use synopsis_core::{SynopsisError, extract_text};
//!
//! match extract_text("<html><body></body></html>") {
//!     Ok(text) => println!("{}", text),
//!     Err(SynopsisError::NoContent) => println!("nothing readable"),
//!     Err(e) => println!("{} stage failed: {}", e.stage(), e),
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the fetch → extract → summarize pipeline.
#[derive(Error, Debug)]
pub enum SynopsisError {
    /// The input URL is malformed, has an unsupported scheme, or has no host.
    ///
    /// Raised before any network activity.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Retrieving the document failed.
    #[error("Failed to fetch page: {0}")]
    Fetch(#[from] FetchError),

    /// No usable text remained after removing noise and normalizing.
    ///
    /// Not retried: parsing the same HTML again cannot yield more text.
    #[error("No readable text could be extracted from the document")]
    NoContent,

    /// A configured content or noise selector is not valid CSS.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// The requested model is not in the supported set.
    ///
    /// Raised before any network activity.
    #[error("Unsupported model '{model}' (supported: {supported})")]
    UnsupportedModel { model: String, supported: String },

    /// The text handed to the summarizer was empty or whitespace-only.
    #[error("Text to summarize is empty")]
    EmptyInput,

    /// Every attempt against the summarization provider failed.
    #[error("Summarization failed after {attempts} attempt(s): {source}")]
    Summarization {
        attempts: u32,
        #[source]
        source: ProviderError,
    },

    /// Environment or option values could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SynopsisError {
    /// Name of the pipeline stage that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            SynopsisError::InvalidUrl(_) => "url",
            SynopsisError::Fetch(_) => "fetch",
            SynopsisError::NoContent | SynopsisError::InvalidSelector(_) => "extract",
            SynopsisError::UnsupportedModel { .. } | SynopsisError::Config(_) => "config",
            SynopsisError::EmptyInput => "input",
            SynopsisError::Summarization { .. } => "summarize",
        }
    }
}

/// Errors from retrieving a raw document.
///
/// Timeouts, connection failures and non-2xx statuses are reported
/// separately so callers can tell them apart.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    #[error("Failed to connect to {url}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    /// The response declared a content type other than HTML.
    #[error("Page is not HTML (content type: {content_type})")]
    NotHtml { content_type: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from a single completion request.
///
/// The summarizer treats every variant as retryable.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Provider returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Provider returned an empty response")]
    EmptyResponse,

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

/// Result type alias for SynopsisError.
pub type Result<T> = std::result::Result<T, SynopsisError>;
