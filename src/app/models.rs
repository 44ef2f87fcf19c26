//! Data models for the Memory of the World harvester
//!
//! This module defines the core data structures used throughout the
//! application: discovered book links, per-link download outcomes, and the
//! filename derivation rules shared by the dry-run and real download paths.

use serde::{Deserialize, Serialize};

/// Catalogue page number, starting at 1
pub type PageIndex = u32;

/// An absolute download URL discovered on a catalogue page
///
/// Links are kept in discovery order (page order, then within-page order).
/// The catalogue offers no uniqueness guarantee: the same URL appearing on
/// two pages is recorded, and later downloaded, twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLink {
    /// Absolute URL of the document
    pub url: String,
    /// Page the link was discovered on
    pub page: PageIndex,
}

impl BookLink {
    /// Create a link discovered on the given page
    pub fn new(url: impl Into<String>, page: PageIndex) -> Self {
        Self {
            url: url.into(),
            page,
        }
    }

    /// Derive the local filename for this link
    ///
    /// The filename is the final path segment of the URL with percent-encoded
    /// spaces decoded back to literal spaces. Two different links can derive
    /// the same filename; the second download then overwrites the first.
    pub fn file_name(&self) -> String {
        let trimmed = self.url.split(['?', '#']).next().unwrap_or(&self.url);
        let segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
        segment.replace("%20", " ")
    }
}

impl std::fmt::Display for BookLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (page {})", self.url, self.page)
    }
}

/// Result of one download attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchOutcome {
    /// File written (or, in a dry run, planned) successfully
    Success {
        /// Bytes written to disk; always 0 for a dry run
        bytes_written: u64,
    },
    /// Download failed; the reason is recorded, the link is not retried
    Failure {
        /// Human-readable failure description with URL context
        reason: String,
    },
}

impl FetchOutcome {
    /// Whether this outcome counts toward the downloaded total
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }
}

/// A link paired with its download outcome
///
/// Workers record exactly one of these per claimed link. Collection order
/// follows completion, not discovery; callers must not assume ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkOutcome {
    /// The link that was processed
    pub link: BookLink,
    /// What happened to it
    pub outcome: FetchOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Filename is the last path segment with %20 decoded to spaces
    #[test]
    fn test_file_name_decodes_spaces() {
        let link = BookLink::new(
            "https://nikomas.memoryoftheworld.org/b/Calvino/Invisible%20Cities.epub",
            3,
        );
        assert_eq!(link.file_name(), "Invisible Cities.epub");
    }

    /// Query strings and fragments never leak into the filename
    #[test]
    fn test_file_name_strips_query_and_fragment() {
        let link = BookLink::new("https://example.org/files/report.pdf?session=9#page2", 1);
        assert_eq!(link.file_name(), "report.pdf");
    }

    /// A URL without path separators falls back to the whole remainder
    #[test]
    fn test_file_name_handles_bare_segment() {
        let link = BookLink::new("book.pdf", 1);
        assert_eq!(link.file_name(), "book.pdf");
    }

    /// Two links can collide on the derived filename
    #[test]
    fn test_file_name_collisions_are_possible() {
        let a = BookLink::new("https://a.example.org/x/Title.pdf", 1);
        let b = BookLink::new("https://b.example.org/y/Title.pdf", 2);
        assert_eq!(a.file_name(), b.file_name());
        assert_ne!(a, b);
    }

    #[test]
    fn test_outcome_success_classification() {
        let ok = FetchOutcome::Success { bytes_written: 10 };
        let planned = FetchOutcome::Success { bytes_written: 0 };
        let failed = FetchOutcome::Failure {
            reason: "HTTP 500".to_string(),
        };
        assert!(ok.is_success());
        assert!(planned.is_success());
        assert!(!failed.is_success());
    }
}
