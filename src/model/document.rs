//! Document-level result type.

use super::PageHeadingSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Heading outline inferred for one PDF.
///
/// Serializes as `{"title": ..., "pages": {"1": {"H1": [...]}, ...}}` with
/// pages in ascending numeric order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Document title (the file stem when nothing better is found)
    pub title: String,

    /// Headings per page; pages without headings are absent
    pub pages: BTreeMap<u32, PageHeadingSet>,
}

impl DocumentResult {
    /// Create a result from its parts.
    pub fn new(title: impl Into<String>, pages: BTreeMap<u32, PageHeadingSet>) -> Self {
        Self {
            title: title.into(),
            pages,
        }
    }

    /// The result used when nothing could be extracted.
    pub fn degraded(title: impl Into<String>) -> Self {
        Self::new(title, BTreeMap::new())
    }

    /// Get the headings of a page (1-indexed).
    pub fn page(&self, number: u32) -> Option<&PageHeadingSet> {
        self.pages.get(&number)
    }

    /// Total number of heading entries in the document.
    pub fn heading_count(&self) -> usize {
        self.pages.values().map(PageHeadingSet::len).sum()
    }

    /// Check if no headings were found.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// File name without its extension, used for default titles and output names.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
