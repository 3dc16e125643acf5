//! Per-document pipeline: extraction, OCR fallback, classification, title.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use crate::classify::HeadingClassifier;
use crate::config::Config;
use crate::model::{file_stem, DocumentResult, Line};
use crate::ocr::{OcrFallback, PageRenderer, PdftoppmRenderer, TesseractRecognizer, TextRecognizer};
use crate::parser::{Extraction, LineAssembler, LopdfLoader, PdfLoader};

/// Turns one PDF into a [`DocumentResult`].
///
/// # Example
///
/// ```no_run
/// use pdfheadings::{Config, DocumentProcessor};
///
/// let processor = DocumentProcessor::new(Config::default());
/// let result = processor.process("report.pdf");
/// println!("{}", result.title);
/// ```
#[derive(Clone)]
pub struct DocumentProcessor {
    config: Config,
    loader: Arc<dyn PdfLoader>,
    assembler: LineAssembler,
    ocr: OcrFallback,
    classifier: HeadingClassifier,
}

impl DocumentProcessor {
    /// Create a processor backed by lopdf, `pdftoppm` and `tesseract`.
    pub fn new(config: Config) -> Self {
        let loader = Arc::new(LopdfLoader::new(config.extract.clone()));
        Self::with_collaborators(
            config,
            loader,
            Arc::new(PdftoppmRenderer::default()),
            Arc::new(TesseractRecognizer::default()),
        )
    }

    /// Create a processor with explicit extraction and OCR collaborators.
    pub fn with_collaborators(
        config: Config,
        loader: Arc<dyn PdfLoader>,
        renderer: Arc<dyn PageRenderer>,
        recognizer: Arc<dyn TextRecognizer>,
    ) -> Self {
        let assembler = LineAssembler::new(config.max_pages);
        let ocr = OcrFallback::new(renderer, recognizer, config.ocr.clone(), config.max_pages);
        let classifier = HeadingClassifier::new(config.heading_levels);
        Self {
            config,
            loader,
            assembler,
            ocr,
            classifier,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract the lines of `path`, running OCR when page 1 has no
    /// embedded text.
    pub fn extract_lines(&self, path: &Path) -> Vec<Line> {
        match self.assembler.extract(self.loader.as_ref(), path) {
            Extraction::Lines(lines) => lines,
            Extraction::NoEmbeddedText => {
                log::info!("No embedded text in {}; falling back to OCR", path.display());
                self.ocr.extract(path)
            }
        }
    }

    /// Process one document.
    ///
    /// Never fails: any failure, including a panic inside a collaborator,
    /// degrades to `{title: <file stem>, pages: {}}`.
    pub fn process<P: AsRef<Path>>(&self, path: P) -> DocumentResult {
        let path = path.as_ref();
        let stem = file_stem(path);

        match catch_unwind(AssertUnwindSafe(|| self.process_lines(path, &stem))) {
            Ok(result) => result,
            Err(_) => {
                log::error!("Processing panicked for {}", path.display());
                DocumentResult::degraded(stem)
            }
        }
    }

    fn process_lines(&self, path: &Path, stem: &str) -> DocumentResult {
        let lines = self.extract_lines(path);
        if lines.is_empty() {
            log::warn!("No text found in {}", path.display());
            return DocumentResult::degraded(stem);
        }

        let title = derive_title(&lines, stem);
        let pages = self.classifier.classify(&lines);
        log::debug!(
            "{}: title {:?}, {} pages with headings",
            path.display(),
            title,
            pages.len()
        );
        DocumentResult::new(title, pages)
    }
}

/// Title of a document: the first page-1 line set in the largest page-1
/// size, or `fallback` when page 1 has no lines.
pub fn derive_title(lines: &[Line], fallback: &str) -> String {
    let mut title: Option<&Line> = None;
    for line in lines.iter().filter(|line| line.page == 1) {
        match title {
            Some(best) if line.size_key() <= best.size_key() => {}
            _ => title = Some(line),
        }
    }
    title
        .map(|line| line.text.clone())
        .unwrap_or_else(|| fallback.to_string())
}
