//! Directory batch processing.
//!
//! Every `*.pdf` in the input directory is processed on a rayon pool, one
//! task per document. Results come back tagged with their input index and
//! are written in sorted input order: one `<stem>.json` per document, then
//! the combined `schema.json` array.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::config::Config;
use crate::detect::has_pdf_extension;
use crate::error::{Error, Result};
use crate::model::DocumentResult;
use crate::processor::DocumentProcessor;
use crate::render::{write_json, JsonFormat};

/// Why a batch produced no output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The input directory does not exist
    MissingInputDir(PathBuf),
    /// The input directory holds no PDF files
    NoPdfFiles(PathBuf),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingInputDir(dir) => {
                write!(f, "input directory not found: {}", dir.display())
            }
            SkipReason::NoPdfFiles(dir) => write!(f, "no PDF files in {}", dir.display()),
        }
    }
}

/// Result of a batch run.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Nothing was processed and nothing was written
    Skipped { reason: SkipReason },
    /// Every input was processed
    Completed {
        /// Results in sorted input order
        documents: Vec<DocumentResult>,
        /// Files written: per-document outputs, then `schema.json`
        outputs: Vec<PathBuf>,
    },
}

impl BatchOutcome {
    /// Number of documents processed.
    pub fn document_count(&self) -> usize {
        match self {
            BatchOutcome::Skipped { .. } => 0,
            BatchOutcome::Completed { documents, .. } => documents.len(),
        }
    }
}

/// Progress notifications emitted during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// Processing is about to start on `total` documents
    Started { total: usize },
    /// One document finished; emitted from worker threads in completion order
    Finished { path: PathBuf, title: String },
}

/// Runs a [`DocumentProcessor`] over a directory of PDFs.
pub struct BatchRunner {
    processor: DocumentProcessor,
}

impl BatchRunner {
    /// Create a runner with the default collaborators.
    pub fn new(config: Config) -> Self {
        Self::with_processor(DocumentProcessor::new(config))
    }

    /// Create a runner around an existing processor.
    pub fn with_processor(processor: DocumentProcessor) -> Self {
        Self { processor }
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config {
        self.processor.config()
    }

    /// Process the input directory and write all outputs.
    pub fn run(&self) -> Result<BatchOutcome> {
        self.run_with_progress(|_| {})
    }

    /// Like [`run`](Self::run), reporting progress through `on_event`.
    pub fn run_with_progress<F>(&self, on_event: F) -> Result<BatchOutcome>
    where
        F: Fn(BatchEvent) + Sync,
    {
        let config = self.config();
        config.validate()?;

        let input_dir = &config.input_dir;
        if !input_dir.is_dir() {
            let reason = SkipReason::MissingInputDir(input_dir.clone());
            log::warn!("{}", reason);
            return Ok(BatchOutcome::Skipped { reason });
        }

        let inputs = discover_pdfs(input_dir)?;
        if inputs.is_empty() {
            let reason = SkipReason::NoPdfFiles(input_dir.clone());
            log::warn!("{}", reason);
            return Ok(BatchOutcome::Skipped { reason });
        }

        log::info!("Processing {} PDF files from {}", inputs.len(), input_dir.display());
        on_event(BatchEvent::Started {
            total: inputs.len(),
        });

        let documents = self.process_all(&inputs, &on_event)?;
        let outputs = write_outputs(config, &inputs, &documents)?;

        log::info!(
            "Wrote {} outputs and {}",
            documents.len(),
            config.schema_path().display()
        );
        Ok(BatchOutcome::Completed { documents, outputs })
    }

    fn process_all<F>(&self, inputs: &[PathBuf], on_event: &F) -> Result<Vec<DocumentResult>>
    where
        F: Fn(BatchEvent) + Sync,
    {
        let threads = worker_count(inputs.len(), self.config().jobs);
        log::debug!("Using {} worker threads", threads);

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| Error::Other(format!("failed to build worker pool: {}", e)))?;

        let mut results: Vec<(usize, DocumentResult)> = pool.install(|| {
            inputs
                .par_iter()
                .enumerate()
                .map(|(index, path)| {
                    let result = self.processor.process(path);
                    on_event(BatchEvent::Finished {
                        path: path.clone(),
                        title: result.title.clone(),
                    });
                    (index, result)
                })
                .collect()
        });

        results.sort_by_key(|(index, _)| *index);
        Ok(results.into_iter().map(|(_, result)| result).collect())
    }
}

/// PDF files directly inside `dir`, sorted by path.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_pdf_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Worker threads for `documents` tasks: one per document, at most the
/// available parallelism or `jobs`, never zero.
pub fn worker_count(documents: usize, jobs: Option<usize>) -> usize {
    let cores = jobs.unwrap_or_else(default_thread_count);
    documents.min(cores).max(1)
}

fn default_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Write one JSON file per document, then `schema.json`.
fn write_outputs(
    config: &Config,
    inputs: &[PathBuf],
    documents: &[DocumentResult],
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&config.output_dir)?;

    let mut outputs = Vec::with_capacity(documents.len() + 1);
    for (input, document) in inputs.iter().zip(documents) {
        let path = config.output_path_for(input);
        write_json(&path, document, JsonFormat::Pretty)?;
        log::debug!("Wrote {}", path.display());
        outputs.push(path);
    }

    let schema_path = config.schema_path();
    write_json(&schema_path, documents, JsonFormat::Pretty)?;
    outputs.push(schema_path);
    Ok(outputs)
}
