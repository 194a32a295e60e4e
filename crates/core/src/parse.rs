//! HTML parsing and DOM manipulation.
//!
//! This module provides the [`Document`] and [`Element`] types for parsing
//! HTML, pruning unwanted subtrees, and querying the tree with CSS selectors.
//!
//! # Example
//!
//! ```rust
//! use synopsis_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <nav>Home | About</nav>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let mut doc = Document::parse(html);
//! doc.remove_elements(&["nav"]).unwrap();
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs.len(), 1);
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::{Result, SynopsisError};

/// Represents a parsed HTML document.
///
/// A Document wraps an HTML page and provides methods for querying elements
/// using CSS selectors and for detaching whole subtrees before text is read.
///
/// # Example
///
/// ```rust
/// use synopsis_core::parse::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html);
/// assert_eq!(doc.title(), Some("Test".to_string()));
/// ```
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// Parsing is lenient: malformed markup is repaired the way a browser
    /// would, so this never fails.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Detaches every element whose tag is in `tags`, together with its subtree.
    ///
    /// Elements are removed wherever they appear in the document. Returns the
    /// number of elements matched.
    ///
    /// # Errors
    ///
    /// Returns [`SynopsisError::InvalidSelector`] if a tag name does not form
    /// a valid selector.
    pub fn remove_elements(&mut self, tags: &[&str]) -> Result<usize> {
        if tags.is_empty() {
            return Ok(0);
        }

        let ids: Vec<_> = self.select(&tags.join(", "))?.iter().map(|el| el.element.id()).collect();

        for id in &ids {
            if let Some(mut node) = self.html.tree.get_mut(*id) {
                node.detach();
            }
        }

        Ok(ids.len())
    }

    /// Selects elements using a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`SynopsisError::InvalidSelector`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use synopsis_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html);
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        let root = self.html.root_element();

        // Walk from the root element so detached subtrees are never matched.
        Ok(std::iter::once(root)
            .filter(|el| sel.matches(el))
            .chain(root.select(&sel))
            .map(|el| Element { element: el })
            .collect())
    }

    /// Gets the `<body>` element, if the document has one.
    pub fn body(&'_ self) -> Option<Element<'_>> {
        self.select("body").ok()?.into_iter().next()
    }

    /// Gets the root `<html>` element.
    pub fn root(&'_ self) -> Element<'_> {
        Element { element: self.html.root_element() }
    }

    /// Gets the title of the document.
    ///
    /// Returns the content of the `<title>` element if present.
    pub fn title(&self) -> Option<String> {
        self.select("title").ok()?.first().map(Element::text)
    }
}

/// A wrapper around scraper's ElementRef.
///
/// # Example
///
/// ```rust
/// use synopsis_core::parse::Document;
///
/// let html = r#"<p>  Link <a href="https://example.com">text</a> </p>"#;
/// let doc = Document::parse(html);
/// let paragraph = &doc.select("p").unwrap()[0];
///
/// assert_eq!(paragraph.trimmed_text(), "Link text");
/// assert_eq!(paragraph.select("a").unwrap().len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the text content of this element.
    ///
    /// Returns the concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the text content with leading and trailing whitespace removed.
    pub fn trimmed_text(&self) -> String {
        self.text().trim().to_string()
    }

    /// Selects descendant elements using a CSS selector, in document order.
    ///
    /// The element itself is never part of the result, even when it matches.
    ///
    /// # Errors
    ///
    /// Returns [`SynopsisError::InvalidSelector`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        let own_id = self.element.id();

        Ok(self
            .element
            .select(&sel)
            .filter(|el| el.id() != own_id)
            .map(|el| Element { element: el })
            .collect())
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| SynopsisError::InvalidSelector(format!("{}: {}", selector, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>Test Page</title>
            <script>var tracking = true;</script>
        </head>
        <body>
            <header><nav>Home | About</nav></header>
            <h1>Heading</h1>
            <p class="content">Paragraph 1</p>
            <p class="content">Paragraph 2 <button>Share</button></p>
            <a href="https://example.com">Link</a>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse(SAMPLE_HTML);
        assert_eq!(doc.title(), Some("Test Page".to_string()));
    }

    #[test]
    fn test_select_elements() {
        let doc = Document::parse(SAMPLE_HTML);
        let elements = doc.select("p.content").unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].text(), "Paragraph 1");
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML);
        let result = doc.select("[[invalid");

        assert!(matches!(result, Err(SynopsisError::InvalidSelector(_))));
    }

    #[test]
    fn test_remove_elements_detaches_subtrees() {
        let mut doc = Document::parse(SAMPLE_HTML);
        let removed = doc.remove_elements(&["script", "header", "nav", "button"]).unwrap();

        assert_eq!(removed, 4);
        let text = doc.root().text();
        assert!(!text.contains("tracking"));
        assert!(!text.contains("Home | About"));
        assert!(!text.contains("Share"));
        assert!(text.contains("Paragraph 2"));
    }

    #[test]
    fn test_detached_elements_not_selectable() {
        let mut doc = Document::parse("<body><nav><div class='content'>Menu</div></nav><p>Kept</p></body>");
        doc.remove_elements(&["nav"]).unwrap();

        assert!(doc.select(".content").unwrap().is_empty());
        assert_eq!(doc.select("p").unwrap().len(), 1);
        assert_eq!(doc.select("html").unwrap().len(), 1);
    }

    #[test]
    fn test_remove_no_tags() {
        let mut doc = Document::parse(SAMPLE_HTML);
        assert_eq!(doc.remove_elements(&[]).unwrap(), 0);
    }

    #[test]
    fn test_element_select_excludes_self() {
        let doc = Document::parse("<div id='outer'><div id='inner'>Nested</div></div>");
        let outer = doc.select("#outer").unwrap().into_iter().next().unwrap();
        let divs = outer.select("div").unwrap();

        assert_eq!(divs.len(), 1);
        assert_eq!(divs[0].text(), "Nested");
    }

    #[test]
    fn test_body_and_trimmed_text() {
        let doc = Document::parse("<html><body>\n  Hello  \n</body></html>");
        assert_eq!(doc.body().unwrap().trimmed_text(), "Hello");
    }
}
