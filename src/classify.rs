//! Heading classification by font-size rank.
//!
//! Each page's distinct line sizes are sorted largest first; a line's rank
//! is the index of its size in that list. Ranks are positional only, so two
//! documents with the same relative sizes classify identically.
//!
//! Documents whose lines all sit on one page are classified in
//! *single-page* mode: every size is ranked and ranks past the deepest
//! level clamp to it. Otherwise only the largest `levels` sizes count and
//! the second-largest lines on a page are merged into one H2 entry.

use std::collections::BTreeMap;

use crate::model::{is_page_number, HeadingLevel, Line, PageHeadingSet};

/// Assigns heading levels to lines.
#[derive(Debug, Clone)]
pub struct HeadingClassifier {
    levels: usize,
}

impl HeadingClassifier {
    /// Create a classifier emitting up to `levels` heading levels (1..=3).
    pub fn new(levels: usize) -> Self {
        Self {
            levels: levels.clamp(1, HeadingLevel::MAX_DEPTH),
        }
    }

    /// Number of heading levels in use.
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Classify all lines of one document.
    ///
    /// Pages without any heading are absent from the result.
    pub fn classify(&self, lines: &[Line]) -> BTreeMap<u32, PageHeadingSet> {
        let pages = group_by_page(lines);
        let single_page = pages.len() == 1;

        let mut result = BTreeMap::new();
        for (number, mut page_lines) in pages {
            let sizes = distinct_sizes(&page_lines);
            if sizes.is_empty() {
                continue;
            }

            page_lines.sort_by(|a, b| a.y0.total_cmp(&b.y0));

            let headings = if single_page {
                self.classify_single(&page_lines, &sizes)
            } else {
                self.classify_multi(&page_lines, &sizes)
            };

            if !headings.is_empty() {
                result.insert(number, headings);
            }
        }
        result
    }

    fn classify_single(&self, lines: &[&Line], sizes: &[i32]) -> PageHeadingSet {
        let mut headings = PageHeadingSet::new();
        for line in lines {
            let text = line.text.as_str();
            if text.is_empty() || is_page_number(text) {
                continue;
            }
            if let Some(rank) = rank_of(sizes, line.size_key()) {
                headings.insert(HeadingLevel::from_rank(rank, self.levels), text);
            }
        }
        headings
    }

    fn classify_multi(&self, lines: &[&Line], sizes: &[i32]) -> PageHeadingSet {
        let kept = &sizes[..sizes.len().min(self.levels)];

        let mut headings = PageHeadingSet::new();
        let mut h2_buffer: Vec<&str> = Vec::new();
        for line in lines {
            match rank_of(kept, line.size_key()) {
                Some(0) => {
                    headings.insert(HeadingLevel::H1, &line.text);
                }
                Some(1) => h2_buffer.push(&line.text),
                Some(2) => {
                    headings.insert(HeadingLevel::H3, &line.text);
                }
                _ => {}
            }
        }

        if !h2_buffer.is_empty() {
            let joined = h2_buffer.join(" ");
            let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");
            if !collapsed.is_empty() {
                headings.set(HeadingLevel::H2, vec![collapsed]);
            }
        }
        headings
    }
}

impl Default for HeadingClassifier {
    fn default() -> Self {
        Self::new(HeadingLevel::MAX_DEPTH)
    }
}

/// Lines per page, pages in ascending order, lines in extraction order.
fn group_by_page(lines: &[Line]) -> BTreeMap<u32, Vec<&Line>> {
    let mut pages: BTreeMap<u32, Vec<&Line>> = BTreeMap::new();
    for line in lines {
        pages.entry(line.page).or_default().push(line);
    }
    pages
}

/// Distinct size keys, largest first.
fn distinct_sizes(lines: &[&Line]) -> Vec<i32> {
    let mut sizes: Vec<i32> = lines.iter().map(|line| line.size_key()).collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    sizes.dedup();
    sizes
}

fn rank_of(sizes: &[i32], key: i32) -> Option<usize> {
    sizes.iter().position(|size| *size == key)
}
