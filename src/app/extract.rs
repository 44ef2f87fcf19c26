//! Download-link extraction from catalogue page HTML
//!
//! The extractor walks every anchor on a page and keeps hrefs that look like
//! downloadable documents, judged purely by the filename extension of the
//! final path segment. Surviving hrefs are normalized to absolute URLs:
//! scheme-relative links get `https:` prepended and literal spaces become
//! `%20`. Each call is independent; the extractor holds no cross-page state
//! and the same HTML always yields the same sequence.

use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::trace;

use crate::constants::extract;

/// Stateless anchor filter configured with a set of extension tokens
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    extensions: Vec<String>,
}

impl LinkExtractor {
    /// Create an extractor recognizing the default document formats
    pub fn new() -> Self {
        Self::with_extensions(
            extract::RECOGNIZED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        )
    }

    /// Create an extractor with a custom extension-token set
    pub fn with_extensions(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    /// Extract normalized download URLs from one page of HTML
    ///
    /// Returns URLs in first-seen order, de-duplicated within this call.
    /// An empty result is the caller's signal that the page had no
    /// recognizable documents; it is never an error.
    pub fn extract(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        if let Ok(selector) = Selector::parse(extract::ANCHOR_SELECTOR) {
            for element in document.select(&selector) {
                let Some(href) = element.value().attr("href") else {
                    continue;
                };
                let Some(url) = self.normalize(href) else {
                    continue;
                };
                if seen.insert(url.clone()) {
                    links.push(url);
                }
            }
        }

        links
    }

    /// Filter by extension token and absolutize, or reject with `None`
    fn normalize(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() || !self.matches_extension(href) {
            return None;
        }

        let absolute = if let Some(rest) = href.strip_prefix("//") {
            format!("https://{rest}")
        } else if href.starts_with("https://") || href.starts_with("http://") {
            href.to_string()
        } else {
            // Host-relative and pseudo-scheme hrefs have no base URL to
            // resolve against on a script-rendered catalogue.
            trace!("skipping non-absolute href: {}", href);
            return None;
        };

        Some(absolute.replace(' ', "%20"))
    }

    /// Check the final path segment for a recognized extension token
    fn matches_extension(&self, href: &str) -> bool {
        let path = href.split(['?', '#']).next().unwrap_or(href);
        let segment = path.rsplit('/').next().unwrap_or(path);
        match segment.rsplit_once('.') {
            Some((_, ext)) => self
                .extensions
                .iter()
                .any(|token| token.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}
