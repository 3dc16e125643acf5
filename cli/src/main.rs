//! pdfheadings CLI - PDF heading outline extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfheadings::config::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_SCHEMA_DIR};
use pdfheadings::ocr::{DEFAULT_DPI, DEFAULT_LANGUAGES};
use pdfheadings::parser::DEFAULT_MAX_PAGES;
use pdfheadings::{
    BatchEvent, BatchOutcome, BatchRunner, Config, DocumentProcessor, HeadingLevel, JsonFormat,
    OcrOptions,
};

#[derive(Parser)]
#[command(name = "pdfheadings")]
#[command(version)]
#[command(about = "Infer title and H1/H2/H3 headings from PDF documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every PDF in a directory (default)
    Run(RunArgs),

    /// Process a single PDF and print its headings as JSON
    File {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone)]
struct RunArgs {
    /// Directory containing input PDFs
    #[arg(short, long, value_name = "DIR", env = "PDFHEADINGS_INPUT", default_value = DEFAULT_INPUT_DIR)]
    input: PathBuf,

    /// Directory for per-document JSON files
    #[arg(short, long, value_name = "DIR", env = "PDFHEADINGS_OUTPUT", default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Directory for the combined schema.json
    #[arg(long, value_name = "DIR", env = "PDFHEADINGS_SCHEMA", default_value = DEFAULT_SCHEMA_DIR)]
    schema: PathBuf,

    /// Worker threads (defaults to available cores)
    #[arg(short, long)]
    jobs: Option<usize>,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(Args, Clone)]
struct PipelineArgs {
    /// Maximum pages read per document
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: u32,

    /// Number of heading levels (1-3)
    #[arg(long, default_value_t = HeadingLevel::MAX_DEPTH)]
    heading_levels: usize,

    /// Disable the OCR fallback for scanned documents
    #[arg(long)]
    no_ocr: bool,

    /// OCR rendering resolution
    #[arg(long, default_value_t = DEFAULT_DPI)]
    dpi: u32,

    /// OCR languages (tesseract syntax)
    #[arg(long, default_value = DEFAULT_LANGUAGES)]
    lang: String,
}

impl PipelineArgs {
    fn apply(&self, config: Config) -> Config {
        let ocr = OcrOptions::new()
            .with_enabled(!self.no_ocr)
            .with_dpi(self.dpi)
            .with_languages(self.lang.clone());
        config
            .with_max_pages(self.max_pages)
            .with_heading_levels(self.heading_levels)
            .with_ocr(ocr)
    }
}

impl RunArgs {
    fn to_config(&self) -> Config {
        let mut config = Config::new()
            .with_input_dir(&self.input)
            .with_output_dir(&self.output)
            .with_schema_dir(&self.schema);
        if let Some(jobs) = self.jobs {
            config = config.with_jobs(jobs);
        }
        self.pipeline.apply(config)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Run(args)) => cmd_run(&args),
        Some(Commands::File {
            input,
            output,
            compact,
            pipeline,
        }) => cmd_file(&input, output.as_deref(), compact, &pipeline),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => cmd_run(&cli.run),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn warn_if_ocr_missing(config: &Config) {
    if config.ocr.enabled && !pdfheadings::ocr::is_available() {
        log::warn!("pdftoppm/tesseract not found; scanned PDFs will yield no headings");
        eprintln!(
            "{} OCR tools not found; scanned PDFs will yield no headings",
            "Warning:".yellow().bold()
        );
    }
}

fn cmd_run(args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.to_config();
    config.validate()?;
    warn_if_ocr_missing(&config);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let runner = BatchRunner::new(config);
    let outcome = runner.run_with_progress(|event| match event {
        BatchEvent::Started { total } => pb.set_length(total as u64),
        BatchEvent::Finished { path, .. } => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            pb.set_message(name);
            pb.inc(1);
        }
    });

    match outcome? {
        BatchOutcome::Skipped { reason } => {
            pb.finish_and_clear();
            println!("{} {}", "Nothing to do:".yellow(), reason);
        }
        BatchOutcome::Completed { documents, outputs } => {
            pb.finish_with_message("Done!");

            let headings: usize = documents.iter().map(|d| d.heading_count()).sum();
            println!(
                "\n{} {} documents, {} headings",
                "Processed".green().bold(),
                documents.len(),
                headings
            );
            if let Some((schema, per_document)) = outputs.split_last() {
                println!("  {} {} JSON files", "├─".dimmed(), per_document.len());
                println!("  {} {}", "└─".dimmed(), schema.display());
            }
        }
    }

    Ok(())
}

fn cmd_file(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    pipeline: &PipelineArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = pipeline.apply(Config::new());
    config.validate()?;
    warn_if_ocr_missing(&config);

    if !input.is_file() {
        return Err(format!("File not found: {}", input.display()).into());
    }

    let result = DocumentProcessor::new(config).process(input);

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = pdfheadings::render::to_json(&result, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfheadings".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF heading outline extraction tool");
    println!();
    let ocr = if pdfheadings::ocr::is_available() {
        "available".green()
    } else {
        "not found".yellow()
    };
    println!("OCR (pdftoppm + tesseract): {}", ocr);
}
