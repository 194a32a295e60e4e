//! Main-content text extraction.
//!
//! Extraction runs in three phases over a parsed [`Document`]:
//!
//! 1. every noise element (scripts, navigation, forms, ...) is detached,
//!    wherever it sits in the tree
//! 2. the scope root is chosen from an ordered selector list, first match
//!    wins, falling back to `<body>` and then the whole document
//! 3. headings are harvested before block text, each pass in document
//!    order, and the joined fragments are normalized
//!
//! # Example
//!
//! ```rust
//! use synopsis_core::extract_text;
//!
//! let html = r#"<html><body>
//!     <nav>Home</nav>
//!     <main>
//!         <h1>Title Example</h1>
//!         <p>This paragraph has more than twenty characters easily.</p>
//!     </main>
//! </body></html>"#;
//!
//! let text = extract_text(html).unwrap();
//! assert_eq!(text.as_str(), "Title Example This paragraph has more than twenty characters easily.");
//! ```

use std::fmt;

use tracing::{debug, info};

use crate::normalize::normalize_text;
use crate::parse::{Document, Element};
use crate::{Result, SynopsisError};

/// Elements removed before any text is harvested.
pub const NOISE_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "menu", "form", "button", "input",
];

/// Main-content selectors, in priority order.
pub const CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role=\"main\"]",
    ".content",
    ".main-content",
    ".post-content",
    ".entry-content",
    "#content",
    "#main",
];

const HEADING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6";
const BODY_SELECTOR: &str = "p, div, span, li";

/// Configuration for content extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Tags detached before harvesting
    pub noise_tags: Vec<String>,
    /// Scope-root selectors, tried in order
    pub content_selectors: Vec<String>,
    /// Headings must be strictly longer than this many characters
    pub min_heading_chars: usize,
    /// Body elements must be strictly longer than this many characters
    pub min_body_chars: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            noise_tags: NOISE_TAGS.iter().map(|t| t.to_string()).collect(),
            content_selectors: CONTENT_SELECTORS.iter().map(|s| s.to_string()).collect(),
            min_heading_chars: 3,
            min_body_chars: 20,
        }
    }
}

impl ExtractConfig {
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder::new()
    }
}

/// Fluent builder for [`ExtractConfig`].
///
/// # Example
///
/// ```rust
/// use synopsis_core::ExtractConfig;
///
/// let config = ExtractConfig::builder()
///     .content_selectors(["#story", "main"])
///     .min_body_chars(40)
///     .build();
///
/// assert_eq!(config.content_selectors, vec!["#story", "main"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the noise tag list.
    pub fn noise_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.noise_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the content selector list; order is priority.
    pub fn content_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.content_selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    pub fn min_heading_chars(mut self, value: usize) -> Self {
        self.config.min_heading_chars = value;
        self
    }

    pub fn min_body_chars(mut self, value: usize) -> Self {
        self.config.min_body_chars = value;
        self
    }

    pub fn build(self) -> ExtractConfig {
        self.config
    }
}

/// Which part of the document text was harvested from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentScope {
    /// The first element matching this content selector.
    Selector(String),
    /// No content selector matched; the `<body>` element was used.
    Body,
    /// No content selector matched and there was no body.
    Document,
}

impl fmt::Display for ContentScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentScope::Selector(selector) => write!(f, "{}", selector),
            ContentScope::Body => write!(f, "body"),
            ContentScope::Document => write!(f, "document"),
        }
    }
}

/// The normalized main text of a page.
///
/// Never empty, whitespace collapsed to single spaces, with no runs of
/// `.`, `!` or `?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    text: String,
    scope: ContentScope,
}

impl ExtractedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Length in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// The region the text was harvested from.
    pub fn scope(&self) -> &ContentScope {
        &self.scope
    }
}

impl AsRef<str> for ExtractedText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Extracts readable text from HTML documents.
///
/// Holds only read-only configuration, so one instance can serve
/// concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct ContentExtractor {
    config: ExtractConfig,
}

impl ContentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExtractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extract the main text from an HTML string.
    ///
    /// # Errors
    ///
    /// Returns [`SynopsisError::NoContent`] when nothing remains after
    /// filtering and normalization, or [`SynopsisError::InvalidSelector`]
    /// for a malformed configured selector.
    pub fn extract(&self, html: &str) -> Result<ExtractedText> {
        let mut doc = Document::parse(html);

        let noise: Vec<&str> = self.config.noise_tags.iter().map(String::as_str).collect();
        let removed = doc.remove_elements(&noise)?;
        debug!(removed, "removed noise elements");

        let (root, scope) = self.select_scope(&doc)?;
        let fragments = self.harvest(&root)?;
        let text = normalize_text(&fragments.join(" "));

        if text.is_empty() {
            return Err(SynopsisError::NoContent);
        }

        info!(scope = %scope, fragments = fragments.len(), chars = text.chars().count(), "extracted page text");
        Ok(ExtractedText { text, scope })
    }

    /// Pick the scope root: first content selector with a match, then body, then the document.
    fn select_scope<'a>(&self, doc: &'a Document) -> Result<(Element<'a>, ContentScope)> {
        for selector in &self.config.content_selectors {
            if let Some(element) = doc.select(selector)?.into_iter().next() {
                debug!(selector = %selector, "found main content");
                return Ok((element, ContentScope::Selector(selector.clone())));
            }
        }

        match doc.body() {
            Some(body) => {
                debug!("no content selector matched, using body");
                Ok((body, ContentScope::Body))
            }
            None => Ok((doc.root(), ContentScope::Document)),
        }
    }

    /// Collect qualifying headings, then qualifying body elements.
    fn harvest(&self, root: &Element<'_>) -> Result<Vec<String>> {
        let headings = collect_longer_than(root, HEADING_SELECTOR, self.config.min_heading_chars)?;
        let body = collect_longer_than(root, BODY_SELECTOR, self.config.min_body_chars)?;

        Ok(headings.into_iter().chain(body).collect())
    }
}

fn collect_longer_than(root: &Element<'_>, selector: &str, min_chars: usize) -> Result<Vec<String>> {
    Ok(root
        .select(selector)?
        .iter()
        .map(Element::trimmed_text)
        .filter(|text| text.chars().count() > min_chars)
        .collect())
}

/// Extract the main text of an HTML document with the default configuration.
pub fn extract_text(html: &str) -> Result<ExtractedText> {
    ContentExtractor::new().extract(html)
}

/// Extract the main text of an HTML document with a custom configuration.
pub fn extract_text_with_config(html: &str, config: &ExtractConfig) -> Result<ExtractedText> {
    ContentExtractor::with_config(config.clone()).extract(html)
}
