//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pdfheadings::ocr::{RenderedDocument, RenderedPage};
use pdfheadings::{
    Config, DocumentProcessor, Error, PageRenderer, PageSource, PageWords, PdfLoader, Result,
    TextRecognizer, Token,
};

/// What the fake loader returns for a file name.
#[derive(Clone)]
pub enum FakeDoc {
    Pages(Vec<PageWords>),
    Corrupt,
    Panics,
}

struct FakePages(Vec<PageWords>);

impl PageSource for FakePages {
    fn page_count(&self) -> u32 {
        self.0.len() as u32
    }

    fn page_words(&self, number: u32) -> Result<PageWords> {
        self.0
            .get(number as usize - 1)
            .cloned()
            .ok_or(Error::PageOutOfRange(number, self.0.len() as u32))
    }
}

/// Loader keyed by file name, so temp-dir paths resolve too.
#[derive(Default)]
pub struct FakeLoader {
    docs: HashMap<String, FakeDoc>,
}

impl FakeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc(mut self, name: &str, doc: FakeDoc) -> Self {
        self.docs.insert(name.to_string(), doc);
        self
    }

    pub fn with_pages(self, name: &str, pages: Vec<PageWords>) -> Self {
        self.with_doc(name, FakeDoc::Pages(pages))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl PdfLoader for FakeLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>> {
        match self.docs.get(&file_name(path)) {
            Some(FakeDoc::Pages(pages)) => Ok(Box::new(FakePages(pages.clone()))),
            Some(FakeDoc::Corrupt) => Err(Error::PdfParse("invalid xref table".to_string())),
            Some(FakeDoc::Panics) => panic!("backend bug"),
            None => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such file",
            ))),
        }
    }
}

/// OCR fake: recognized text per page, keyed by file name.
#[derive(Default)]
pub struct FakeScans {
    scans: HashMap<String, Vec<String>>,
}

impl FakeScans {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scan(mut self, name: &str, pages: &[&str]) -> Self {
        self.scans
            .insert(name.to_string(), pages.iter().map(|p| p.to_string()).collect());
        self
    }
}

impl PageRenderer for FakeScans {
    fn render(&self, path: &Path, _dpi: u32, max_pages: u32) -> Result<RenderedDocument> {
        let name = file_name(path);
        let pages = self
            .scans
            .get(&name)
            .ok_or_else(|| Error::Ocr(format!("cannot render {}", name)))?;
        Ok(RenderedDocument::new(
            (1..=pages.len() as u32)
                .take(max_pages as usize)
                .map(|page| RenderedPage {
                    page,
                    image: PathBuf::from(format!("{}#{}", name, page)),
                })
                .collect(),
        ))
    }
}

impl TextRecognizer for FakeScans {
    fn recognize(&self, image: &Path, _languages: &str) -> Result<String> {
        let key = image.to_string_lossy();
        let (name, page) = key
            .rsplit_once('#')
            .ok_or_else(|| Error::Ocr(format!("bad image {}", key)))?;
        let page: usize = page
            .parse()
            .map_err(|_| Error::Ocr(format!("bad image {}", key)))?;
        self.scans
            .get(name)
            .and_then(|pages| pages.get(page - 1))
            .cloned()
            .ok_or_else(|| Error::Ocr(format!("unreadable {}", key)))
    }
}

pub fn processor(config: Config, loader: FakeLoader, scans: FakeScans) -> DocumentProcessor {
    let scans = Arc::new(scans);
    DocumentProcessor::with_collaborators(config, Arc::new(loader), scans.clone(), scans)
}

/// A page whose lines are `(text, top, size)`, one token per line.
pub fn page(number: u32, lines: &[(&str, f32, f32)]) -> PageWords {
    lines
        .iter()
        .fold(PageWords::letter(number), |page, (text, top, size)| {
            page.with_token(Token::new(*text, 72.0, *top, *size))
        })
}
