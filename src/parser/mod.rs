//! PDF text extraction: word tokens and line assembly.

mod backend;
mod lines;
mod options;

pub use backend::{LopdfLoader, LopdfPages, PageSource, PdfLoader};
pub use lines::{Extraction, LineAssembler, DEFAULT_MAX_PAGES, HEADER_FOOTER_MARGIN};
pub use options::ExtractOptions;
