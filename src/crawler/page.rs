//! DOM-query capability over a fetched page
//!
//! [`Page`] wraps the parsed HTML together with its base URL and exposes the
//! capability set the engine and extractors rely on: enumerating anchors
//! with resolved absolute hrefs and visible text, selecting elements, and
//! reading text/attributes. Nothing outside this module touches the parsing
//! library directly.

use crate::task::Link;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A fetched, parsed HTML page
pub struct Page {
    document: Html,
    base: Url,
}

impl Page {
    /// Parses an HTML body fetched from `base`
    pub fn parse(html: &str, base: Url) -> Self {
        Self {
            document: Html::parse_document(html),
            base,
        }
    }

    /// The URL this page was fetched from
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// The page title, trimmed; None when absent or empty
    pub fn title(&self) -> Option<String> {
        self.text_of("title")
    }

    /// All outbound anchors with resolved absolute URLs and visible text
    ///
    /// Skips `javascript:`, `mailto:`, `tel:` and `data:` hrefs as well as
    /// fragment-only (same page) anchors.
    pub fn links(&self) -> Vec<Link> {
        let mut links = Vec::new();

        if let Ok(selector) = Selector::parse("a[href]") {
            for element in self.document.select(&selector) {
                let Some(href) = element.value().attr("href") else {
                    continue;
                };
                if let Some(url) = resolve_href(href, &self.base) {
                    let text = element.text().collect::<String>().trim().to_string();
                    links.push(Link::new(url, text));
                }
            }
        }

        links
    }

    /// Elements matching a CSS selector; empty for an invalid selector
    pub fn select(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(selector) {
            Ok(selector) => self.document.select(&selector).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Trimmed text content of the first element matching `selector`
    pub fn text_of(&self, selector: &str) -> Option<String> {
        self.select(selector)
            .first()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Attribute value of the first element matching `selector`
    pub fn attr_of(&self, selector: &str, attr: &str) -> Option<String> {
        self.select(selector)
            .first()
            .and_then(|element| element.value().attr(attr))
            .map(str::to_string)
    }
}

/// Resolves an href to an absolute URL, or None if it should be skipped
fn resolve_href(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    // Skip special schemes
    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Skip fragment-only links (same page anchors)
    if href.starts_with('#') {
        return None;
    }

    match base.join(href) {
        Ok(absolute) => {
            if absolute.scheme() == "http" || absolute.scheme() == "https" {
                Some(absolute.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
