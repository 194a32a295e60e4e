//! Bounded-retry summarization over a [`CompletionProvider`].
//!
//! A call moves through `Truncating -> Attempting(n) -> Success | Failed`.
//! Input longer than the configured cap keeps its head and tail around a
//! [`TRUNCATION_MARKER`]. Each provider failure (including an empty reply)
//! is retried after a linear backoff of `retry_delay * n`, where `n` counts
//! the failures so far, until `max_retries` attempts are spent.
//!
//! The returned summary is checked against advisory bounds (1-5 sentences,
//! 100-1000 characters). A miss is logged and reported on [`SummaryCheck`];
//! it never rejects the summary.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::ops::RangeInclusive;
use std::time::Duration;

use tracing::{info, warn};

use crate::provider::{CompletionProvider, CompletionRequest, Model};
use crate::{ProviderError, Result, SynopsisError};

/// Placed between the kept head and tail of truncated input.
pub const TRUNCATION_MARKER: &str = "\n\n[... text truncated ...]\n\n";

/// Fixed instruction sent with every request.
pub const SYSTEM_PROMPT: &str = "You are an analyst who extracts the key information from web page text. \
Identify the page's main purpose, its key ideas and its conclusions. \
Focus only on the most important information and ignore navigation, advertising and filler. \
Write a single paragraph of 1 to 5 sentences: use fewer sentences for sparse pages and more for dense ones. \
Return only the summary text, with no introductory phrases such as \"Here is your summary:\". \
Do not invent facts that are not in the text.";

/// Line placed before the page text in the user message.
pub const USER_PROMPT_PREFIX: &str = "Analyze the following text and write a concise summary:";

/// Advisory sentence-count bounds.
pub const SENTENCE_RANGE: RangeInclusive<usize> = 1..=5;

/// Advisory character-length bounds.
pub const LENGTH_RANGE: RangeInclusive<usize> = 100..=1000;

/// Capability for waiting between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Configuration for the summarization client.
///
/// Read-only once the client is built.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use synopsis_core::SummarizerConfig;
///
/// let config = SummarizerConfig::builder()
///     .max_input_chars(8000)
///     .max_retries(5)
///     .retry_delay(Duration::from_millis(500))
///     .build();
/// assert_eq!(config.max_input_chars, 8000);
/// ```
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// Longest input sent unmodified, in characters (default: 16000).
    pub max_input_chars: usize,

    /// Total attempts per call, including the first (default: 3).
    pub max_retries: u32,

    /// Base backoff unit (default: 1s).
    pub retry_delay: Duration,

    /// Output token cap per request (default: 300).
    pub max_output_tokens: u32,

    /// Sampling temperature (default: 0.3).
    pub temperature: f32,

    /// Model used when the caller does not name one (default: gpt-4o).
    pub default_model: Model,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 16000,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            max_output_tokens: 300,
            temperature: 0.3,
            default_model: Model::default(),
        }
    }
}

impl SummarizerConfig {
    /// Creates a new builder for SummarizerConfig.
    pub fn builder() -> SummarizerConfigBuilder {
        SummarizerConfigBuilder::new()
    }
}

/// Builder for SummarizerConfig.
pub struct SummarizerConfigBuilder {
    config: SummarizerConfig,
}

impl SummarizerConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: SummarizerConfig::default() }
    }

    /// Sets the input length cap in characters.
    pub fn max_input_chars(mut self, value: usize) -> Self {
        self.config.max_input_chars = value;
        self
    }

    /// Sets the total number of attempts. Values below 1 are treated as 1.
    pub fn max_retries(mut self, value: u32) -> Self {
        self.config.max_retries = value.max(1);
        self
    }

    /// Sets the base backoff unit.
    pub fn retry_delay(mut self, value: Duration) -> Self {
        self.config.retry_delay = value;
        self
    }

    /// Sets the output token cap.
    pub fn max_output_tokens(mut self, value: u32) -> Self {
        self.config.max_output_tokens = value;
        self
    }

    /// Sets the sampling temperature.
    pub fn temperature(mut self, value: f32) -> Self {
        self.config.temperature = value;
        self
    }

    /// Sets the fallback model.
    pub fn default_model(mut self, value: Model) -> Self {
        self.config.default_model = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> SummarizerConfig {
        self.config
    }
}

impl Default for SummarizerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of the advisory quality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryCheck {
    /// Non-empty segments between `.`, `!` and `?`.
    pub sentence_count: usize,
    /// Length in characters.
    pub char_count: usize,
}

impl SummaryCheck {
    pub fn sentences_in_range(&self) -> bool {
        SENTENCE_RANGE.contains(&self.sentence_count)
    }

    pub fn length_in_range(&self) -> bool {
        LENGTH_RANGE.contains(&self.char_count)
    }

    pub fn passed(&self) -> bool {
        self.sentences_in_range() && self.length_in_range()
    }
}

/// Check a summary against the advisory bounds, logging each miss.
///
/// # Example
///
/// ```rust
/// use synopsis_core::validate_summary;
///
/// let check = validate_summary("Too short. Really!");
/// assert_eq!(check.sentence_count, 2);
/// assert!(check.sentences_in_range());
/// assert!(!check.length_in_range());
/// ```
pub fn validate_summary(summary: &str) -> SummaryCheck {
    let check = SummaryCheck {
        sentence_count: summary
            .split(['.', '!', '?'])
            .filter(|segment| !segment.trim().is_empty())
            .count(),
        char_count: summary.chars().count(),
    };

    if !check.sentences_in_range() {
        warn!(
            sentences = check.sentence_count,
            expected = ?SENTENCE_RANGE,
            "summary sentence count outside advisory range"
        );
    }

    if !check.length_in_range() {
        warn!(chars = check.char_count, expected = ?LENGTH_RANGE, "summary length outside advisory range");
    }

    check
}

/// Keep the first and last `max_chars / 2` characters of over-long text.
///
/// Text within the cap is returned unchanged. Lengths are counted in
/// characters, so the cut never splits a code point.
///
/// # Example
///
/// ```rust
/// use synopsis_core::{TRUNCATION_MARKER, truncate_text};
///
/// let text = "a".repeat(10) + &"b".repeat(10);
/// let truncated = truncate_text(&text, 8);
/// assert_eq!(truncated, format!("aaaa{}bbbb", TRUNCATION_MARKER));
/// ```
pub fn truncate_text(text: &str, max_chars: usize) -> Cow<'_, str> {
    let total = text.chars().count();
    if total <= max_chars {
        return Cow::Borrowed(text);
    }

    let half = max_chars / 2;
    let head_end = text.char_indices().nth(half).map_or(text.len(), |(i, _)| i);
    let tail_start = text.char_indices().nth(total - half).map_or(text.len(), |(i, _)| i);

    Cow::Owned(format!("{}{}{}", &text[..head_end], TRUNCATION_MARKER, &text[tail_start..]))
}

/// A validated-but-never-rejected summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryResult {
    /// The summary text, trimmed.
    pub text: String,
    /// Model that produced it.
    pub model: Model,
    /// Attempts made, including the successful one.
    pub attempts: u32,
    /// Characters of input text before any truncation.
    pub input_chars: usize,
    /// Whether the input was truncated before sending.
    pub truncated: bool,
    /// Advisory quality check.
    pub check: SummaryCheck,
}

impl fmt::Display for SummaryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Outcome of one provider attempt.
enum AttemptOutcome {
    Success(String),
    Retryable(ProviderError),
}

/// Per-call attempt counter.
#[derive(Debug)]
struct RetryState {
    /// Attempts that have failed so far.
    failures: u32,
    max_attempts: u32,
}

impl RetryState {
    fn new(max_attempts: u32) -> Self {
        Self { failures: 0, max_attempts: max_attempts.max(1) }
    }

    /// One-based number of the attempt about to run.
    fn current(&self) -> u32 {
        self.failures + 1
    }

    /// Record a failure; true when no attempts remain.
    fn fail(&mut self) -> bool {
        self.failures += 1;
        self.failures >= self.max_attempts
    }
}

/// Summarizes text through a completion provider with bounded retries.
///
/// Holds only read-only configuration plus the provider and sleeper, so a
/// shared instance is safe when both of those are.
pub struct Summarizer<P, S = TokioSleeper> {
    provider: P,
    sleeper: S,
    config: SummarizerConfig,
}

impl<P: CompletionProvider> Summarizer<P> {
    pub fn new(provider: P, config: SummarizerConfig) -> Self {
        Self::with_sleeper(provider, TokioSleeper, config)
    }
}

impl<P: CompletionProvider, S: Sleeper> Summarizer<P, S> {
    /// Build a summarizer that waits through a custom [`Sleeper`].
    pub fn with_sleeper(provider: P, sleeper: S, config: SummarizerConfig) -> Self {
        Self { provider, sleeper, config }
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Resolve an optional model name, falling back to the configured default.
    ///
    /// # Errors
    ///
    /// Returns [`SynopsisError::UnsupportedModel`] for a name outside the supported set.
    pub fn resolve_model(&self, model: Option<&str>) -> Result<Model> {
        model.map_or(Ok(self.config.default_model), |name| name.parse())
    }

    /// Summarize `text` with the named model, or the default when `None`.
    ///
    /// # Errors
    ///
    /// - [`SynopsisError::EmptyInput`] when `text` is blank
    /// - [`SynopsisError::UnsupportedModel`] for an unknown model, before any request
    /// - [`SynopsisError::Summarization`] once every attempt has failed
    pub async fn summarize(&self, text: &str, model: Option<&str>) -> Result<SummaryResult> {
        let model = self.resolve_model(model)?;
        self.summarize_with_model(text, model).await
    }

    /// Summarize `text` with an already-resolved model.
    pub async fn summarize_with_model(&self, text: &str, model: Model) -> Result<SummaryResult> {
        if text.trim().is_empty() {
            return Err(SynopsisError::EmptyInput);
        }

        let input_chars = text.chars().count();
        let payload = truncate_text(text, self.config.max_input_chars);
        let truncated = matches!(payload, Cow::Owned(_));
        if truncated {
            info!(
                original_chars = input_chars,
                max_chars = self.config.max_input_chars,
                "input truncated to head and tail"
            );
        }

        let request = self.build_request(&payload, model);
        let mut state = RetryState::new(self.config.max_retries);

        loop {
            info!(attempt = state.current(), max_attempts = state.max_attempts, model = %model, "requesting summary");

            match self.attempt(&request).await {
                AttemptOutcome::Success(text) => {
                    let attempts = state.current();
                    info!(attempts, "summary received");
                    let check = validate_summary(&text);
                    return Ok(SummaryResult { text, model, attempts, input_chars, truncated, check });
                }
                AttemptOutcome::Retryable(error) => {
                    let attempt = state.current();
                    if state.fail() {
                        warn!(attempt, error = %error, "final summarization attempt failed");
                        return Err(SynopsisError::Summarization { attempts: state.failures, source: error });
                    }

                    let delay = self.config.retry_delay * state.failures;
                    warn!(
                        attempt,
                        error = %error,
                        delay_ms = delay.as_millis() as u64,
                        "summarization attempt failed, retrying"
                    );
                    self.sleeper.sleep(delay).await;
                }
            }
        }
    }

    fn build_request(&self, payload: &str, model: Model) -> CompletionRequest {
        CompletionRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: format!("{}\n\n{}", USER_PROMPT_PREFIX, payload),
            model,
            max_output_tokens: self.config.max_output_tokens,
            temperature: self.config.temperature,
        }
    }

    async fn attempt(&self, request: &CompletionRequest) -> AttemptOutcome {
        match self.provider.complete(request).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    AttemptOutcome::Retryable(ProviderError::EmptyResponse)
                } else {
                    AttemptOutcome::Success(text.to_string())
                }
            }
            Err(error) => AttemptOutcome::Retryable(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Scripted {
        replies: Mutex<VecDeque<std::result::Result<String, ProviderError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl Scripted {
        fn new(replies: Vec<std::result::Result<String, ProviderError>>) -> Self {
            Self { replies: Mutex::new(replies.into()), requests: Mutex::new(Vec::new()) }
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl CompletionProvider for Scripted {
        async fn complete(&self, request: &CompletionRequest) -> std::result::Result<String, ProviderError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ProviderError::EmptyResponse))
        }
    }

    #[derive(Default)]
    struct Recorded(Mutex<Vec<Duration>>);

    impl Sleeper for Recorded {
        async fn sleep(&self, duration: Duration) {
            self.0.lock().unwrap().push(duration);
        }
    }

    fn summarizer(replies: Vec<std::result::Result<String, ProviderError>>) -> Summarizer<Scripted, Recorded> {
        Summarizer::with_sleeper(Scripted::new(replies), Recorded::default(), SummarizerConfig::default())
    }

    fn api_error() -> ProviderError {
        ProviderError::Api { status: 500, message: "boom".to_string() }
    }

    #[test]
    fn test_truncate_passthrough() {
        let text = "short text";
        assert!(matches!(truncate_text(text, 16000), Cow::Borrowed(_)));
        assert!(matches!(truncate_text(&"x".repeat(100), 100), Cow::Borrowed(_)));
    }

    #[test]
    fn test_truncate_keeps_head_and_tail() {
        let text: String = (0..20000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let truncated = truncate_text(&text, 16000);

        assert_eq!(truncated, format!("{}{}{}", &text[..8000], TRUNCATION_MARKER, &text[12000..]));
        assert!(truncated.chars().count() <= 16000 + TRUNCATION_MARKER.chars().count());
    }

    #[test]
    fn test_truncate_multibyte() {
        let text = "é".repeat(30);
        let truncated = truncate_text(&text, 10);

        assert_eq!(truncated, format!("{}{}{}", "é".repeat(5), TRUNCATION_MARKER, "é".repeat(5)));
    }

    #[test]
    fn test_truncate_odd_cap() {
        let truncated = truncate_text("abcdefghij", 5);
        assert_eq!(truncated, format!("ab{}ij", TRUNCATION_MARKER));
    }

    #[test]
    fn test_validate_summary_ranges() {
        let good = "Rust is a systems programming language focused on safety. \
                    It prevents data races at compile time. Many companies use it in production today.";
        let check = validate_summary(good);
        assert_eq!(check.sentence_count, 3);
        assert!(check.passed());

        let too_many = "One. Two. Three. Four. Five. Six.";
        assert_eq!(validate_summary(too_many).sentence_count, 6);
        assert!(!validate_summary(too_many).sentences_in_range());

        let long = "word ".repeat(250);
        let check = validate_summary(&long);
        assert_eq!(check.sentence_count, 1);
        assert!(!check.length_in_range());
    }

    #[test]
    fn test_validate_counts_mixed_terminators() {
        let check = validate_summary("Really? Yes! Done... ");
        assert_eq!(check.sentence_count, 3);
    }

    #[test]
    fn test_builder_clamps_retries() {
        let config = SummarizerConfig::builder().max_retries(0).build();
        assert_eq!(config.max_retries, 1);
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let client = summarizer(vec![Ok("unused".to_string())]);
        let result = client.summarize(" \n\t ", None).await;

        assert!(matches!(result, Err(SynopsisError::EmptyInput)));
        assert_eq!(client.provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_input_rejected_with_resolved_model() {
        let client = summarizer(vec![Ok("unused".to_string())]);
        let result = client.summarize_with_model("", Model::Gpt35Turbo).await;

        assert!(matches!(result, Err(SynopsisError::EmptyInput)));
        assert_eq!(client.provider.calls(), 0);
        assert!(client.sleeper.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_model_fails_before_request() {
        let client = summarizer(vec![Ok("unused".to_string())]);
        let result = client.summarize("Some page text", Some("invalid-model")).await;

        assert!(matches!(result, Err(SynopsisError::UnsupportedModel { .. })));
        assert_eq!(client.provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let client = summarizer(vec![Ok("  A concise summary.  ".to_string())]);
        let result = client.summarize("Some page text", Some("gpt-3.5-turbo")).await.unwrap();

        assert_eq!(result.text, "A concise summary.");
        assert_eq!(result.model, Model::Gpt35Turbo);
        assert_eq!(result.attempts, 1);
        assert!(!result.truncated);
        assert!(client.sleeper.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_shape() {
        let client = summarizer(vec![Ok("Summary.".to_string())]);
        client.summarize("Page body text", None).await.unwrap();

        let requests = client.provider.requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(request.model, Model::Gpt4o);
        assert_eq!(request.system_prompt, SYSTEM_PROMPT);
        assert_eq!(request.user_prompt, format!("{}\n\nPage body text", USER_PROMPT_PREFIX));
        assert_eq!(request.max_output_tokens, 300);
        assert!((request.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt() {
        let client = summarizer(vec![Err(api_error()), Err(api_error()), Ok("Recovered summary.".to_string())]);
        let result = client.summarize("Some page text", None).await.unwrap();

        assert_eq!(result.text, "Recovered summary.");
        assert_eq!(result.attempts, 3);

        let sleeps = client.sleeper.0.lock().unwrap();
        assert_eq!(*sleeps, vec![Duration::from_secs(1), Duration::from_secs(2)]);
    }

    #[tokio::test]
    async fn test_exhausted_retries() {
        let client = summarizer(vec![
            Err(api_error()),
            Err(ProviderError::MalformedResponse("bad".to_string())),
            Err(ProviderError::Api { status: 429, message: "slow down".to_string() }),
        ]);
        let result = client.summarize("Some page text", None).await;

        match result {
            Err(SynopsisError::Summarization { attempts, source }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(source, ProviderError::Api { status: 429, .. }));
            }
            other => panic!("expected summarization error, got {:?}", other),
        }
        assert_eq!(client.provider.calls(), 3);
        assert_eq!(client.sleeper.0.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_reply_is_retried() {
        let client = summarizer(vec![Ok("   ".to_string()), Ok("Second try works.".to_string())]);
        let result = client.summarize("Some page text", None).await.unwrap();

        assert_eq!(result.attempts, 2);
        assert_eq!(*client.sleeper.0.lock().unwrap(), vec![Duration::from_secs(1)]);
    }

    #[tokio::test]
    async fn test_long_input_truncated_in_request() {
        let config = SummarizerConfig::builder().max_input_chars(100).build();
        let client = Summarizer::with_sleeper(
            Scripted::new(vec![Ok("Summary.".to_string())]),
            Recorded::default(),
            config,
        );
        let text = format!("{}{}", "h".repeat(100), "t".repeat(100));
        let result = client.summarize(&text, None).await.unwrap();

        assert!(result.truncated);
        let requests = client.provider.requests.lock().unwrap();
        let expected = format!("{}{}{}", "h".repeat(50), TRUNCATION_MARKER, "t".repeat(50));
        assert!(requests[0].user_prompt.ends_with(&expected));
    }

    #[tokio::test]
    async fn test_out_of_range_summary_is_still_returned() {
        let client = summarizer(vec![Ok("Short.".to_string())]);
        let result = client.summarize("Some page text", None).await.unwrap();

        assert_eq!(result.text, "Short.");
        assert!(!result.check.length_in_range());
        assert!(!result.check.passed());
    }
}
