//! # pdfheadings
//!
//! Heading outline inference for PDF documents.
//!
//! For each PDF this library derives a title and, per page, the lines that
//! act as H1/H2/H3 headings. Levels are assigned by ranking the font sizes
//! found on each page; running headers, footers and page numbers are
//! filtered out first. Scanned documents without an embedded text layer go
//! through an OCR fallback (`pdftoppm` + `tesseract`).
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfheadings::{process_file, render, Config};
//!
//! fn main() -> pdfheadings::Result<()> {
//!     let result = process_file("report.pdf", Config::default());
//!     println!("{}", render::to_json(&result, render::JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Batch processing
//!
//! ```no_run
//! use pdfheadings::{BatchOutcome, BatchRunner, Config};
//!
//! let config = Config::new()
//!     .with_input_dir("pdfs")
//!     .with_output_dir("out")
//!     .with_schema_dir("out");
//! match BatchRunner::new(config).run()? {
//!     BatchOutcome::Skipped { reason } => eprintln!("skipped: {}", reason),
//!     BatchOutcome::Completed { documents, .. } => println!("{} documents", documents.len()),
//! }
//! # Ok::<(), pdfheadings::Error>(())
//! ```

pub mod batch;
pub mod classify;
pub mod config;
pub mod detect;
pub mod error;
pub mod model;
pub mod ocr;
pub mod parser;
pub mod processor;
pub mod render;

// Re-export commonly used types
pub use batch::{discover_pdfs, BatchEvent, BatchOutcome, BatchRunner, SkipReason};
pub use classify::HeadingClassifier;
pub use config::Config;
pub use error::{Error, Result};
pub use model::{DocumentResult, HeadingLevel, Line, PageHeadingSet, PageWords, Token};
pub use ocr::{OcrFallback, OcrOptions, PageRenderer, TextRecognizer};
pub use parser::{ExtractOptions, Extraction, LineAssembler, PageSource, PdfLoader};
pub use processor::{derive_title, DocumentProcessor};
pub use render::JsonFormat;

use std::path::Path;

/// Infer the heading outline of one PDF.
///
/// Never fails; unreadable documents yield a result titled with the file
/// stem and no pages.
///
/// # Example
///
/// ```no_run
/// use pdfheadings::{process_file, Config};
///
/// let result = process_file("document.pdf", Config::default());
/// println!("{}: {} headings", result.title, result.heading_count());
/// ```
pub fn process_file<P: AsRef<Path>>(path: P, config: Config) -> DocumentResult {
    DocumentProcessor::new(config).process(path)
}

/// Infer the heading outline of one PDF and render it as JSON.
pub fn to_json<P: AsRef<Path>>(path: P, config: Config, format: JsonFormat) -> Result<String> {
    let result = process_file(path, config);
    render::to_json(&result, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_degrades() {
        let config = Config::new().with_ocr(OcrOptions::new().disabled());
        let result = process_file("/nonexistent/dir/missing report.pdf", config);
        assert_eq!(result.title, "missing report");
        assert!(result.is_empty());
    }

    #[test]
    fn test_non_pdf_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"<!DOCTYPE html><html></html>").unwrap();

        let json = to_json(&path, Config::default(), JsonFormat::Compact).unwrap();
        assert_eq!(json, r#"{"title":"notes","pages":{}}"#);
    }
}
