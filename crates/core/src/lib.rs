//! Extract the readable text of a web page and summarize it with a language model.
//!
//! The crate is organised as a three-stage pipeline:
//!
//! - [`fetch`]: URL validation and document retrieval ([`HttpFetcher`], files, stdin)
//! - [`extract`]: noise removal, main-content selection and text harvesting ([`ContentExtractor`])
//! - [`summarize`]: length capping, bounded retries and advisory validation ([`Summarizer`])
//!
//! [`Pipeline`] runs the stages in order and stops at the first failure.

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod provider;
pub mod summarize;

pub use config::SynopsisConfig;
pub use error::{FetchError, ProviderError, Result, SynopsisError};
pub use extract::{ContentExtractor, ContentScope, ExtractConfig, ExtractConfigBuilder, ExtractedText};
pub use extract::{extract_text, extract_text_with_config};
pub use fetch::{DocumentFetcher, FetchConfig, HttpFetcher, RawDocument};
pub use fetch::{fetch_file, fetch_stdin, validate_url};
pub use normalize::normalize_text;
pub use parse::Document;
pub use pipeline::{PageExtractor, Pipeline, fetch_html};
pub use provider::{CompletionProvider, CompletionRequest, Model, OpenAiProvider};
pub use summarize::{
    SYSTEM_PROMPT, Sleeper, Summarizer, SummarizerConfig, SummarizerConfigBuilder, SummaryCheck, SummaryResult,
    TRUNCATION_MARKER, TokioSleeper, truncate_text, validate_summary,
};
