//! OCR collaborators backed by external tools: `pdftoppm` (poppler-utils)
//! for rendering and `tesseract` for recognition.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

use super::{PageRenderer, RenderedDocument, RenderedPage, TextRecognizer};

const IMAGE_PREFIX: &str = "page";

/// Check if OCR tools (pdftoppm and tesseract) are available on the system.
pub fn is_available() -> bool {
    let pdftoppm = command_runs("pdftoppm", "-v");
    let tesseract = command_runs("tesseract", "--version");

    if !pdftoppm {
        log::debug!("pdftoppm not found - install poppler-utils for OCR support");
    }
    if !tesseract {
        log::debug!("tesseract not found - install tesseract-ocr for OCR support");
    }

    pdftoppm && tesseract
}

fn command_runs(program: &str, version_flag: &str) -> bool {
    Command::new(program).arg(version_flag).output().is_ok()
}

/// Renders pages to PNG files with `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRenderer {
    program: PathBuf,
}

impl PdftoppmRenderer {
    /// Use a specific `pdftoppm` binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdftoppmRenderer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl PageRenderer for PdftoppmRenderer {
    fn render(&self, path: &Path, dpi: u32, max_pages: u32) -> Result<RenderedDocument> {
        let workdir = tempfile::tempdir()?;
        let output_prefix = workdir.path().join(IMAGE_PREFIX);

        log::info!(
            "Rendering {} for OCR (dpi={}, pages<={})",
            path.display(),
            dpi,
            max_pages
        );

        let output = Command::new(&self.program)
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-f")
            .arg("1")
            .arg("-l")
            .arg(max_pages.to_string())
            .arg(path)
            .arg(&output_prefix)
            .output()
            .map_err(|e| {
                Error::ToolUnavailable(format!("{}: {}", self.program.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Ocr(format!("pdftoppm failed: {}", stderr.trim())));
        }

        let mut pages = Vec::new();
        for entry in std::fs::read_dir(workdir.path())? {
            let image = entry?.path();
            if let Some(page) = rendered_page_number(&image) {
                pages.push(RenderedPage { page, image });
            }
        }
        pages.sort_by_key(|p| p.page);

        if pages.is_empty() {
            return Err(Error::Ocr("pdftoppm produced no images".to_string()));
        }

        Ok(RenderedDocument::in_workdir(pages, workdir))
    }
}

/// Page number of a `pdftoppm` output file such as `page-07.png`.
///
/// pdftoppm zero-pads the number to the width of the last page number, so
/// the numeric suffix is parsed rather than relying on name order.
fn rendered_page_number(image: &Path) -> Option<u32> {
    if image.extension()? != "png" {
        return None;
    }
    let stem = image.file_stem()?.to_str()?;
    let number = stem.strip_prefix(IMAGE_PREFIX)?.strip_prefix('-')?;
    number.parse().ok()
}

/// Recognizes text with the `tesseract` command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    program: PathBuf,
}

impl TesseractRecognizer {
    /// Use a specific `tesseract` binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &Path, languages: &str) -> Result<String> {
        let output = Command::new(&self.program)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(languages)
            .output()
            .map_err(|e| {
                Error::ToolUnavailable(format!("{}: {}", self.program.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Ocr(format!(
                "tesseract failed on {}: {}",
                image.display(),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
