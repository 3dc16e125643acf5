//! Run configuration.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::HeadingLevel;
use crate::ocr::OcrOptions;
use crate::parser::{ExtractOptions, DEFAULT_MAX_PAGES};

/// Default directory scanned for input PDFs.
pub const DEFAULT_INPUT_DIR: &str = "/app/sample_dataset/PDF";

/// Default directory for per-document JSON files.
pub const DEFAULT_OUTPUT_DIR: &str = "/app/sample_dataset/outputs";

/// Default directory for the combined `schema.json`.
pub const DEFAULT_SCHEMA_DIR: &str = "/app/sample_dataset/schema";

/// File name of the combined output.
pub const SCHEMA_FILE_NAME: &str = "schema.json";

/// Configuration for heading extraction.
///
/// # Example
///
/// ```
/// use pdfheadings::Config;
///
/// let config = Config::new()
///     .with_input_dir("pdfs")
///     .with_output_dir("out")
///     .with_max_pages(20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory scanned for `*.pdf` files
    pub input_dir: PathBuf,

    /// Directory receiving one `<stem>.json` per input
    pub output_dir: PathBuf,

    /// Directory receiving `schema.json`
    pub schema_dir: PathBuf,

    /// Maximum number of pages read per document
    pub max_pages: u32,

    /// Number of heading levels emitted (1..=3)
    pub heading_levels: usize,

    /// OCR fallback settings
    pub ocr: OcrOptions,

    /// Word extraction settings
    pub extract: ExtractOptions,

    /// Worker cap; `None` uses the available parallelism
    pub jobs: Option<usize>,
}

impl Config {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input directory.
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    /// Set the per-document output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the directory for `schema.json`.
    pub fn with_schema_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.schema_dir = dir.into();
        self
    }

    /// Set the page cap.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set the number of heading levels.
    pub fn with_heading_levels(mut self, levels: usize) -> Self {
        self.heading_levels = levels;
        self
    }

    /// Set OCR options.
    pub fn with_ocr(mut self, ocr: OcrOptions) -> Self {
        self.ocr = ocr;
        self
    }

    /// Set word extraction options.
    pub fn with_extract_options(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }

    /// Cap the number of worker threads.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// Path of the combined output file.
    pub fn schema_path(&self) -> PathBuf {
        self.schema_dir.join(SCHEMA_FILE_NAME)
    }

    /// Path of the output file for the document at `input`.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let stem = crate::model::file_stem(input);
        self.output_dir.join(format!("{stem}.json"))
    }

    /// Check the configuration for values the pipeline cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 {
            return Err(Error::Config("max_pages must be at least 1".to_string()));
        }
        if !(1..=HeadingLevel::MAX_DEPTH).contains(&self.heading_levels) {
            return Err(Error::Config(format!(
                "heading_levels must be between 1 and {}, got {}",
                HeadingLevel::MAX_DEPTH,
                self.heading_levels
            )));
        }
        if self.ocr.dpi == 0 {
            return Err(Error::Config("OCR dpi must be positive".to_string()));
        }
        if self.jobs == Some(0) {
            return Err(Error::Config("jobs must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            schema_dir: PathBuf::from(DEFAULT_SCHEMA_DIR),
            max_pages: DEFAULT_MAX_PAGES,
            heading_levels: HeadingLevel::MAX_DEPTH,
            ocr: OcrOptions::default(),
            extract: ExtractOptions::default(),
            jobs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.input_dir, PathBuf::from("/app/sample_dataset/PDF"));
        assert_eq!(config.max_pages, 50);
        assert_eq!(config.heading_levels, 3);
        assert!(config.ocr.enabled);
        assert_eq!(config.ocr.dpi, 300);
        assert_eq!(config.jobs, None);
        assert_eq!(
            config.schema_path(),
            PathBuf::from("/app/sample_dataset/schema/schema.json")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_path_for() {
        let config = Config::new().with_output_dir("/out");
        assert_eq!(
            config.output_path_for(Path::new("/in/Annual Report.PDF")),
            PathBuf::from("/out/Annual Report.json")
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(matches!(
            Config::new().with_max_pages(0).validate(),
            Err(Error::Config(_))
        ));
        assert!(Config::new().with_heading_levels(0).validate().is_err());
        assert!(Config::new().with_heading_levels(4).validate().is_err());
        assert!(Config::new().with_jobs(0).validate().is_err());
        assert!(Config::new()
            .with_ocr(OcrOptions::new().with_dpi(0))
            .validate()
            .is_err());
        assert!(Config::new().with_heading_levels(1).validate().is_ok());
    }
}
