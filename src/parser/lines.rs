//! Line assembly: word tokens to filtered visual lines.
//!
//! Tokens sharing a rounded top coordinate form one line. On every page
//! after the first of a multi-page document, tokens in the top or bottom 8%
//! of the page are dropped as running headers/footers, and short or
//! boilerplate-looking lines ("Page 3 of 10", "Version 2") are discarded.
//! Bare page numbers are dropped everywhere.

use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::model::{is_page_number, round1, Line, PageWords, Token};

use super::backend::{PageSource, PdfLoader};

/// Fraction of the page height treated as header (and, mirrored, footer).
pub const HEADER_FOOTER_MARGIN: f32 = 0.08;

/// Default cap on the number of pages read per document.
pub const DEFAULT_MAX_PAGES: u32 = 50;

/// Case-insensitive substrings marking running header/footer lines.
const NOISE_KEYWORDS: [&str; 3] = ["version", "page", "of"];

/// Lines shorter than this (in characters) are noise on continuation pages.
const MIN_LINE_CHARS: usize = 3;

/// Outcome of line assembly for one document.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// Lines found in the embedded text layer (possibly none)
    Lines(Vec<Line>),
    /// Page 1 carries no embedded text at all; the document needs OCR
    NoEmbeddedText,
}

impl Extraction {
    /// Lines of the extraction; empty for [`Extraction::NoEmbeddedText`].
    pub fn into_lines(self) -> Vec<Line> {
        match self {
            Extraction::Lines(lines) => lines,
            Extraction::NoEmbeddedText => Vec::new(),
        }
    }
}

/// Groups word tokens into filtered lines.
#[derive(Debug, Clone)]
pub struct LineAssembler {
    max_pages: u32,
}

impl LineAssembler {
    /// Create an assembler reading at most `max_pages` pages per document.
    pub fn new(max_pages: u32) -> Self {
        Self { max_pages }
    }

    /// Page cap in use.
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Open `path` and assemble its lines.
    ///
    /// Failures to open or decode the document are logged and yield an empty
    /// line set; they never propagate.
    pub fn extract(&self, loader: &dyn PdfLoader, path: &Path) -> Extraction {
        let result = loader
            .open(path)
            .and_then(|source| self.assemble(source.as_ref()));
        match result {
            Ok(extraction) => extraction,
            Err(e) => {
                log::warn!("Error processing {}: {}", path.display(), e);
                Extraction::Lines(Vec::new())
            }
        }
    }

    /// Assemble lines from every page of `source`, up to the page cap.
    pub fn assemble(&self, source: &dyn PageSource) -> Result<Extraction> {
        let page_count = source.page_count();
        let is_single_page = page_count == 1;
        let mut lines = Vec::new();

        for number in 1..=page_count.min(self.max_pages) {
            let page = source.page_words(number)?;
            if number == 1 && page.is_empty() {
                return Ok(Extraction::NoEmbeddedText);
            }
            lines.extend(self.assemble_page(&page, is_single_page));
        }

        Ok(Extraction::Lines(lines))
    }

    /// Assemble the lines of one page.
    pub fn assemble_page(&self, page: &PageWords, is_single_page: bool) -> Vec<Line> {
        let continuation = !is_single_page && page.number > 1;
        let header_boundary = page.height * HEADER_FOOTER_MARGIN;
        let footer_boundary = page.height * (1.0 - HEADER_FOOTER_MARGIN);

        // Buckets keyed by top at 0.1pt precision, in first-seen order.
        let mut index: HashMap<i64, usize> = HashMap::new();
        let mut buckets: Vec<(f32, Vec<&Token>)> = Vec::new();
        for token in &page.tokens {
            let y_pos = round1(token.top);
            if continuation && (y_pos < header_boundary || y_pos > footer_boundary) {
                continue;
            }
            let key = (token.top * 10.0).round() as i64;
            let slot = *index.entry(key).or_insert_with(|| {
                buckets.push((y_pos, Vec::new()));
                buckets.len() - 1
            });
            buckets[slot].1.push(token);
        }

        buckets
            .into_iter()
            .filter_map(|(y0, mut tokens)| {
                tokens.sort_by(|a, b| a.x0.total_cmp(&b.x0));
                let text = tokens
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
                    .trim()
                    .to_string();

                if text.is_empty() || is_page_number(&text) {
                    return None;
                }
                if continuation && is_running_noise(&text) {
                    return None;
                }

                let size = tokens.iter().map(|t| t.size).fold(0.0_f32, f32::max);
                Some(Line::new(text, round1(size), page.number, y0))
            })
            .collect()
    }
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAGES)
    }
}

/// Short fragments and lines mentioning "page", "of" or "version".
fn is_running_noise(text: &str) -> bool {
    if text.chars().count() < MIN_LINE_CHARS {
        return true;
    }
    let lower = text.to_lowercase();
    NOISE_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}
