//! Data model for heading extraction.
//!
//! Words ([`Token`]) are grouped into visual [`Line`]s, lines are ranked into
//! per-page [`PageHeadingSet`]s, and a [`DocumentResult`] ties those to a
//! title. Every value is owned by a single document-processing run.

mod document;
mod headings;
mod line;
mod page;

pub use document::{file_stem, DocumentResult};
pub use headings::{HeadingLevel, PageHeadingSet};
pub use line::{is_page_number, round1, size_key, Line};
pub use page::{PageWords, Token};

pub(crate) use page::estimated_width;
