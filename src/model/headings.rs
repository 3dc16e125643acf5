//! Heading levels and per-page heading sets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Heading tier assigned from a line's font-size rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// All levels, most prominent first.
    pub const ALL: [HeadingLevel; 3] = [HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3];

    /// Deepest level representable.
    pub const MAX_DEPTH: usize = 3;

    /// Map a zero-based size rank to a level, clamping at the deepest of
    /// the first `depth` levels.
    pub fn from_rank(rank: usize, depth: usize) -> Self {
        let depth = depth.clamp(1, Self::MAX_DEPTH);
        Self::ALL[rank.min(depth - 1)]
    }

    /// Zero-based index of the level (H1 = 0).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Label used as the JSON key.
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Headings found on one page. Empty levels are omitted from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageHeadingSet {
    #[serde(rename = "H1", default, skip_serializing_if = "Vec::is_empty")]
    pub h1: Vec<String>,
    #[serde(rename = "H2", default, skip_serializing_if = "Vec::is_empty")]
    pub h2: Vec<String>,
    #[serde(rename = "H3", default, skip_serializing_if = "Vec::is_empty")]
    pub h3: Vec<String>,
}

impl PageHeadingSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries of a level, in insertion order.
    pub fn get(&self, level: HeadingLevel) -> &[String] {
        match level {
            HeadingLevel::H1 => &self.h1,
            HeadingLevel::H2 => &self.h2,
            HeadingLevel::H3 => &self.h3,
        }
    }

    fn entries_mut(&mut self, level: HeadingLevel) -> &mut Vec<String> {
        match level {
            HeadingLevel::H1 => &mut self.h1,
            HeadingLevel::H2 => &mut self.h2,
            HeadingLevel::H3 => &mut self.h3,
        }
    }

    /// Append `text` to `level` unless it is already present.
    ///
    /// Returns `true` if the entry was added.
    pub fn insert(&mut self, level: HeadingLevel, text: &str) -> bool {
        let entries = self.entries_mut(level);
        if entries.iter().any(|existing| existing == text) {
            return false;
        }
        entries.push(text.to_string());
        true
    }

    /// Replace the entries of `level`.
    pub fn set(&mut self, level: HeadingLevel, entries: Vec<String>) {
        *self.entries_mut(level) = entries;
    }

    /// Check whether `level` holds `text`.
    pub fn contains(&self, level: HeadingLevel, text: &str) -> bool {
        self.get(level).iter().any(|existing| existing == text)
    }

    /// Levels that hold at least one entry.
    pub fn levels(&self) -> impl Iterator<Item = HeadingLevel> + '_ {
        HeadingLevel::ALL
            .into_iter()
            .filter(move |level| !self.get(*level).is_empty())
    }

    /// Total number of entries across levels.
    pub fn len(&self) -> usize {
        self.h1.len() + self.h2.len() + self.h3.len()
    }

    /// Check if every level is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rank_clamps() {
        assert_eq!(HeadingLevel::from_rank(0, 3), HeadingLevel::H1);
        assert_eq!(HeadingLevel::from_rank(1, 3), HeadingLevel::H2);
        assert_eq!(HeadingLevel::from_rank(2, 3), HeadingLevel::H3);
        assert_eq!(HeadingLevel::from_rank(7, 3), HeadingLevel::H3);
        assert_eq!(HeadingLevel::from_rank(5, 2), HeadingLevel::H2);
        assert_eq!(HeadingLevel::from_rank(5, 0), HeadingLevel::H1);
    }

    #[test]
    fn test_insert_deduplicates() {
        let mut set = PageHeadingSet::new();
        assert!(set.insert(HeadingLevel::H1, "Intro"));
        assert!(!set.insert(HeadingLevel::H1, "Intro"));
        assert!(set.insert(HeadingLevel::H3, "Intro"));
        assert_eq!(set.get(HeadingLevel::H1), ["Intro".to_string()]);
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.levels().collect::<Vec<_>>(),
            vec![HeadingLevel::H1, HeadingLevel::H3]
        );
    }

    #[test]
    fn test_serialization_skips_empty_levels() {
        let mut set = PageHeadingSet::new();
        set.insert(HeadingLevel::H2, "Überblick");
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"H2":["Überblick"]}"#);

        let back: PageHeadingSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
