//! OCR fallback for documents without an embedded text layer.
//!
//! Pages are rendered to images by a [`PageRenderer`] and read back by a
//! [`TextRecognizer`]. Every non-blank recognized line becomes a [`Line`]
//! with no font size and no vertical position, so the heading classifier
//! sees a single size class per page.
//!
//! The default collaborators shell out to poppler's `pdftoppm` and to
//! `tesseract`; see [`PdftoppmRenderer`] and [`TesseractRecognizer`].

mod tesseract;

pub use tesseract::{is_available, PdftoppmRenderer, TesseractRecognizer};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::error::Result;
use crate::model::Line;

/// Tesseract languages: English, Japanese, Simplified Chinese, Hindi.
pub const DEFAULT_LANGUAGES: &str = "eng+jpn+chi_sim+hin";

/// Rendering resolution for OCR.
pub const DEFAULT_DPI: u32 = 300;

/// OCR settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOptions {
    /// Whether documents without embedded text are sent through OCR
    pub enabled: bool,

    /// Rendering resolution in dots per inch
    pub dpi: u32,

    /// Recognition languages, `+`-separated
    pub languages: String,
}

impl OcrOptions {
    /// Create new OCR options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable OCR.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Disable OCR.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Set rendering resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set recognition languages.
    pub fn with_languages(mut self, languages: impl Into<String>) -> Self {
        self.languages = languages.into();
        self
    }
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            dpi: DEFAULT_DPI,
            languages: DEFAULT_LANGUAGES.to_string(),
        }
    }
}

/// One rendered page image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Page number (1-indexed)
    pub page: u32,
    /// Path to the image file
    pub image: PathBuf,
}

/// Rendered pages of a document, ordered by page number.
///
/// Owns the scratch directory holding the images, if any; it is removed
/// when this value is dropped.
#[derive(Debug, Default)]
pub struct RenderedDocument {
    pub pages: Vec<RenderedPage>,
    workdir: Option<TempDir>,
}

impl RenderedDocument {
    /// Wrap images that live outside any scratch directory.
    pub fn new(pages: Vec<RenderedPage>) -> Self {
        Self {
            pages,
            workdir: None,
        }
    }

    /// Wrap images stored in `workdir`, keeping it alive with the pages.
    pub fn in_workdir(pages: Vec<RenderedPage>, workdir: TempDir) -> Self {
        Self {
            pages,
            workdir: Some(workdir),
        }
    }

    /// Directory holding the images, when owned.
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_ref().map(TempDir::path)
    }
}

/// Renders PDF pages to images.
pub trait PageRenderer: Send + Sync {
    /// Render up to `max_pages` pages of `path` at `dpi`.
    fn render(&self, path: &Path, dpi: u32, max_pages: u32) -> Result<RenderedDocument>;
}

/// Recognizes text in an image.
pub trait TextRecognizer: Send + Sync {
    /// Return the raw text recognized in `image` using `languages`.
    fn recognize(&self, image: &Path, languages: &str) -> Result<String>;
}

/// OCR-based line extraction.
#[derive(Clone)]
pub struct OcrFallback {
    renderer: Arc<dyn PageRenderer>,
    recognizer: Arc<dyn TextRecognizer>,
    options: OcrOptions,
    max_pages: u32,
}

impl OcrFallback {
    /// Create a fallback from explicit collaborators.
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        recognizer: Arc<dyn TextRecognizer>,
        options: OcrOptions,
        max_pages: u32,
    ) -> Self {
        Self {
            renderer,
            recognizer,
            options,
            max_pages,
        }
    }

    /// Create a fallback using `pdftoppm` and `tesseract` from `PATH`.
    pub fn with_system_tools(options: OcrOptions, max_pages: u32) -> Self {
        Self::new(
            Arc::new(PdftoppmRenderer::default()),
            Arc::new(TesseractRecognizer::default()),
            options,
            max_pages,
        )
    }

    /// Options in use.
    pub fn options(&self) -> &OcrOptions {
        &self.options
    }

    /// Recognize the lines of `path`.
    ///
    /// Disabled OCR and any rendering or recognition failure yield an empty
    /// line set; failures are logged.
    pub fn extract(&self, path: &Path) -> Vec<Line> {
        if !self.options.enabled {
            log::info!("OCR disabled; no text extracted from {}", path.display());
            return Vec::new();
        }

        match self.recognize_document(path) {
            Ok(lines) => {
                log::debug!("OCR recognized {} lines in {}", lines.len(), path.display());
                lines
            }
            Err(e) => {
                log::warn!("OCR failed for {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    fn recognize_document(&self, path: &Path) -> Result<Vec<Line>> {
        let rendered = self
            .renderer
            .render(path, self.options.dpi, self.max_pages)?;

        let mut lines = Vec::new();
        for page in rendered.pages.iter().filter(|p| p.page <= self.max_pages) {
            let text = self
                .recognizer
                .recognize(&page.image, &self.options.languages)?;
            lines.extend(recognized_lines(&text, page.page));
        }
        Ok(lines)
    }
}

/// Split recognized text into trimmed, non-blank lines for `page`.
pub fn recognized_lines(text: &str, page: u32) -> impl Iterator<Item = Line> + '_ {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(move |line| Line::recognized(line, page))
}
