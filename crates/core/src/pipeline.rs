//! Fetch → extract → summarize sequencing.
//!
//! Stages run strictly in order and the first failure ends the request; no
//! partial results are produced. Only the summarization stage retries.
//!
//! # Example
//!
//! ```rust,no_run
//! use synopsis_core::{ContentExtractor, FetchConfig, HttpFetcher, Pipeline, Summarizer, SynopsisConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SynopsisConfig::from_env()?;
//! let summarizer = Summarizer::new(config.provider()?, config.summarizer_config());
//! let pipeline = Pipeline::new(HttpFetcher::new(FetchConfig::default())?, ContentExtractor::new(), summarizer);
//!
//! let summary = pipeline.summarize_url("https://example.com/article", None).await?;
//! println!("{}", summary);
//! # Ok(())
//! # }
//! ```

use tracing::info;
use url::Url;

use crate::extract::{ContentExtractor, ExtractedText};
use crate::fetch::{DocumentFetcher, RawDocument, validate_url};
use crate::provider::CompletionProvider;
use crate::summarize::{Sleeper, Summarizer, SummaryResult, TokioSleeper};
use crate::{FetchError, Result};

/// Validate `url`, fetch it, and require an HTML response.
///
/// # Errors
///
/// [`SynopsisError::InvalidUrl`](crate::SynopsisError::InvalidUrl) before any
/// network use, otherwise [`SynopsisError::Fetch`](crate::SynopsisError::Fetch)
/// for transport failures and non-HTML content.
pub async fn fetch_html<F: DocumentFetcher>(fetcher: &F, url: &str) -> Result<RawDocument> {
    let url = validate_url(url)?;
    fetch_validated(fetcher, &url).await
}

async fn fetch_validated<F: DocumentFetcher>(fetcher: &F, url: &Url) -> Result<RawDocument> {
    let document = fetcher.fetch(url).await?;

    if !document.is_html() {
        return Err(FetchError::NotHtml { content_type: document.content_type }.into());
    }

    Ok(document)
}

/// The fetch and extract stages, usable without a language model.
pub struct PageExtractor<F> {
    fetcher: F,
    extractor: ContentExtractor,
}

impl<F: DocumentFetcher> PageExtractor<F> {
    pub fn new(fetcher: F, extractor: ContentExtractor) -> Self {
        Self { fetcher, extractor }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Validate, fetch and extract the page at `url`.
    pub async fn extract_url(&self, url: &str) -> Result<ExtractedText> {
        let url = validate_url(url)?;
        self.extract_validated(&url).await
    }

    /// Extract a document obtained elsewhere (a file or stdin).
    pub fn extract_document(&self, document: &RawDocument) -> Result<ExtractedText> {
        self.extractor.extract(&document.body)
    }

    async fn extract_validated(&self, url: &Url) -> Result<ExtractedText> {
        let document = fetch_validated(&self.fetcher, url).await?;
        self.extract_document(&document)
    }
}

/// Coordinates the three stages for one page at a time.
pub struct Pipeline<F, P, S = TokioSleeper> {
    pages: PageExtractor<F>,
    summarizer: Summarizer<P, S>,
}

impl<F, P, S> Pipeline<F, P, S>
where
    F: DocumentFetcher,
    P: CompletionProvider,
    S: Sleeper,
{
    pub fn new(fetcher: F, extractor: ContentExtractor, summarizer: Summarizer<P, S>) -> Self {
        Self { pages: PageExtractor::new(fetcher, extractor), summarizer }
    }

    pub fn fetcher(&self) -> &F {
        self.pages.fetcher()
    }

    pub fn summarizer(&self) -> &Summarizer<P, S> {
        &self.summarizer
    }

    /// Summarize the page at `url`.
    ///
    /// The URL and the model are both checked before anything is fetched.
    pub async fn summarize_url(&self, url: &str, model: Option<&str>) -> Result<SummaryResult> {
        let parsed = validate_url(url)?;
        let model = self.summarizer.resolve_model(model)?;
        info!(url = %parsed, model = %model, "summarizing page");

        let text = self.pages.extract_validated(&parsed).await?;
        self.summarizer.summarize_with_model(text.as_str(), model).await
    }

    /// Summarize a document obtained elsewhere (a file or stdin).
    pub async fn summarize_document(&self, document: &RawDocument, model: Option<&str>) -> Result<SummaryResult> {
        let model = self.summarizer.resolve_model(model)?;
        info!(model = %model, "summarizing local document");

        let text = self.pages.extract_document(document)?;
        self.summarizer.summarize_with_model(text.as_str(), model).await
    }

    /// Fetch and extract without summarizing.
    pub async fn extract_url(&self, url: &str) -> Result<ExtractedText> {
        self.pages.extract_url(url).await
    }
}
