//! Word and line extraction from real PDF files built with lopdf.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

use pdfheadings::parser::{LopdfLoader, LopdfPages};
use pdfheadings::{
    Config, DocumentProcessor, ExtractOptions, Extraction, LineAssembler, OcrOptions, PageSource,
};

/// One shown string: text, font size, x, y (PDF user space).
type Shown<'a> = (&'a str, i64, i64, i64);

fn text_ops(shown: &[Shown]) -> Vec<Operation> {
    let mut ops = Vec::new();
    for (text, size, x, y) in shown {
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(b"F1".to_vec()), Object::Integer(*size)],
        ));
        ops.push(Operation::new(
            "Td",
            vec![Object::Integer(*x), Object::Integer(*y)],
        ));
        ops.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

/// A rectangle fill with no text, like a scanned page's image placeholder.
fn graphics_ops() -> Vec<Operation> {
    vec![
        Operation::new(
            "re",
            vec![
                Object::Integer(50),
                Object::Integer(50),
                Object::Integer(500),
                Object::Integer(700),
            ],
        ),
        Operation::new("f", vec![]),
    ]
}

/// An operator with integer operands, e.g. `op("cm", &[1, 0, 0, 1, 72, 720])`.
fn op(operator: &str, operands: &[i64]) -> Operation {
    Operation::new(operator, operands.iter().map(|n| Object::Integer(*n)).collect())
}

fn font(size: i64) -> Operation {
    Operation::new(
        "Tf",
        vec![Object::Name(b"F1".to_vec()), Object::Integer(size)],
    )
}

fn show(text: &str) -> Operation {
    Operation::new("Tj", vec![Object::string_literal(text)])
}

fn assert_near(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {expected}, got {actual}"
    );
}

fn build_pdf(pages: Vec<Vec<Operation>>) -> Vec<u8> {
    build_pdf_with(
        pages
            .into_iter()
            .map(|operations| (operations, Dictionary::new()))
            .collect(),
    )
}

/// Like [`build_pdf`], with extra entries (boxes, rotation) on each page.
fn build_pdf_with(pages: Vec<(Vec<Operation>, Dictionary)>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for (operations, extra) in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        };
        for (key, value) in extra {
            page.set(key, value);
        }
        let page_id = doc.add_object(page);
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn write_pdf(dir: &Path, name: &str, pages: Vec<Vec<Operation>>) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_pdf(pages)).unwrap();
    path
}

fn no_ocr() -> Config {
    Config::new().with_ocr(OcrOptions::new().disabled())
}

#[test]
fn test_page_words_geometry() {
    let bytes = build_pdf(vec![text_ops(&[
        ("Report Title", 24, 72, 700),
        ("Body text", 12, 72, 650),
    ])]);
    let pages = LopdfPages::load_bytes(&bytes, ExtractOptions::default()).unwrap();
    assert_eq!(pages.page_count(), 1);

    let words = pages.page_words(1).unwrap();
    assert_eq!(words.height, 792.0);
    let texts: Vec<_> = words.tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, ["Report Title", "Body text"]);

    let title = &words.tokens[0];
    assert_eq!(title.size, 24.0);
    assert_eq!(title.x0, 72.0);
    // 792 - (700 + 0.8 * 24)
    assert!((title.top - 72.8).abs() < 0.01);
    assert_eq!(title.font_name, "Helvetica");
}

#[test]
fn test_page_out_of_range() {
    let bytes = build_pdf(vec![text_ops(&[("Only page", 12, 72, 700)])]);
    let pages = LopdfPages::load_bytes(&bytes, ExtractOptions::default()).unwrap();
    assert!(pages.page_words(2).is_err());
}

#[test]
fn test_single_page_document_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(
        dir.path(),
        "report.pdf",
        vec![text_ops(&[
            ("Report Title", 24, 72, 700),
            ("Background", 16, 72, 650),
            ("Some body text", 11, 72, 620),
            ("1", 11, 300, 40),
        ])],
    );

    let result = DocumentProcessor::new(no_ocr()).process(&path);
    assert_eq!(result.title, "Report Title");
    let first = result.page(1).unwrap();
    assert_eq!(first.h1, ["Report Title"]);
    assert_eq!(first.h2, ["Background"]);
    assert_eq!(first.h3, ["Some body text"]);
}

#[test]
fn test_running_header_dropped_after_first_page() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(
        dir.path(),
        "guide.pdf",
        vec![
            text_ops(&[("User Guide", 20, 72, 700), ("Welcome aboard", 11, 72, 660)]),
            text_ops(&[
                ("User Guide", 9, 72, 770),
                ("Installation", 20, 72, 600),
                ("Steps follow here", 11, 72, 560),
            ]),
        ],
    );

    let lines = LineAssembler::default()
        .extract(&LopdfLoader::default(), &path)
        .into_lines();
    let second: Vec<_> = lines
        .iter()
        .filter(|l| l.page == 2)
        .map(|l| l.text.as_str())
        .collect();
    assert_eq!(second, ["Installation", "Steps follow here"]);

    let result = DocumentProcessor::new(no_ocr()).process(&path);
    assert_eq!(result.title, "User Guide");
    assert_eq!(result.page(2).unwrap().h1, ["Installation"]);
    assert_eq!(result.page(2).unwrap().h2, ["Steps follow here"]);
}

#[test]
fn test_textless_first_page_signals_ocr() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(
        dir.path(),
        "scan.pdf",
        vec![graphics_ops(), text_ops(&[("Late text", 12, 72, 600)])],
    );

    let extraction = LineAssembler::default().extract(&LopdfLoader::default(), &path);
    assert_eq!(extraction, Extraction::NoEmbeddedText);

    let result = DocumentProcessor::new(no_ocr()).process(&path);
    assert_eq!(result.title, "scan");
    assert!(result.pages.is_empty());
}

#[test]
fn test_not_a_pdf_yields_no_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fake.pdf");
    std::fs::write(&path, "just some text pretending to be a PDF").unwrap();

    let extraction = LineAssembler::default().extract(&LopdfLoader::default(), &path);
    assert_eq!(extraction, Extraction::Lines(Vec::new()));
}

/// Page content placed relative to a `cm` origin, as pdfTeX writes it.
fn translated_page(heading: &str, body: &str) -> Vec<Operation> {
    vec![
        op("q", &[]),
        op("cm", &[1, 0, 0, 1, 72, 720]),
        op("BT", &[]),
        font(20),
        op("Td", &[0, -200]),
        show(heading),
        op("ET", &[]),
        op("BT", &[]),
        font(11),
        op("Td", &[0, -240]),
        show(body),
        op("ET", &[]),
        op("Q", &[]),
    ]
}

#[test]
fn test_translated_ctm_positions_words() {
    let mut ops = translated_page("Introduction", "Opening paragraph");
    // Back at the page origin once the state is restored.
    ops.extend([
        op("BT", &[]),
        font(11),
        op("Td", &[300, 100]),
        show("Outside"),
        op("ET", &[]),
    ]);
    let bytes = build_pdf(vec![ops]);
    let pages = LopdfPages::load_bytes(&bytes, ExtractOptions::default()).unwrap();

    let words = pages.page_words(1).unwrap();
    let texts: Vec<_> = words.tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, ["Introduction", "Opening paragraph", "Outside"]);

    let heading = &words.tokens[0];
    assert_eq!(heading.x0, 72.0);
    assert_eq!(heading.size, 20.0);
    // 792 - (720 - 200 + 0.8 * 20)
    assert_near(heading.top, 256.0);

    let outside = &words.tokens[2];
    assert_eq!(outside.x0, 300.0);
    assert_near(outside.top, 683.2);
}

#[test]
fn test_translated_ctm_heading_survives_on_second_page() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(
        dir.path(),
        "thesis.pdf",
        vec![
            translated_page("Introduction", "Opening paragraph"),
            translated_page("Methods Section", "Sampling details"),
        ],
    );

    let lines = LineAssembler::default()
        .extract(&LopdfLoader::default(), &path)
        .into_lines();
    let second: Vec<_> = lines
        .iter()
        .filter(|l| l.page == 2)
        .map(|l| l.text.as_str())
        .collect();
    assert_eq!(second, ["Methods Section", "Sampling details"]);

    let result = DocumentProcessor::new(no_ocr()).process(&path);
    assert_eq!(result.title, "Introduction");
    assert_eq!(result.page(2).unwrap().h1, ["Methods Section"]);
}

#[test]
fn test_flipped_ctm_keeps_reading_order() {
    let bytes = build_pdf(vec![vec![
        op("q", &[]),
        op("cm", &[1, 0, 0, -1, 0, 792]),
        op("BT", &[]),
        font(18),
        op("Tm", &[1, 0, 0, -1, 72, 100]),
        show("First Heading"),
        font(12),
        op("Tm", &[1, 0, 0, -1, 72, 200]),
        show("Second line"),
        op("ET", &[]),
        op("Q", &[]),
    ]]);
    let pages = LopdfPages::load_bytes(&bytes, ExtractOptions::default()).unwrap();

    let words = pages.page_words(1).unwrap();
    let texts: Vec<_> = words.tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, ["First Heading", "Second line"]);

    let first = &words.tokens[0];
    assert_eq!(first.size, 18.0);
    assert_eq!(first.x0, 72.0);
    // Baseline 100pt below the top edge.
    assert_near(first.top, 100.0 - 0.8 * 18.0);
    assert_near(words.tokens[1].top, 200.0 - 0.8 * 12.0);
}

#[test]
fn test_scaled_text_matrix_sets_size() {
    let bytes = build_pdf(vec![vec![
        op("BT", &[]),
        font(10),
        op("Tm", &[2, 0, 0, 2, 72, 600]),
        show("Scaled Heading"),
        op("ET", &[]),
    ]]);
    let pages = LopdfPages::load_bytes(&bytes, ExtractOptions::default()).unwrap();

    let heading = &pages.page_words(1).unwrap().tokens[0];
    assert_eq!(heading.size, 20.0);
    assert_eq!(heading.x0, 72.0);
    // 792 - (600 + 0.8 * 20)
    assert_near(heading.top, 176.0);
}

#[test]
fn test_offset_media_box_origin() {
    let extra = dictionary! {
        "MediaBox" => [100, 50, 712, 842].map(Object::Integer).to_vec(),
    };
    let bytes = build_pdf_with(vec![(text_ops(&[("Offset Title", 10, 172, 742)]), extra)]);
    let pages = LopdfPages::load_bytes(&bytes, ExtractOptions::default()).unwrap();

    let words = pages.page_words(1).unwrap();
    assert_eq!(words.height, 792.0);
    assert_eq!(words.tokens[0].x0, 72.0);
    // 842 - (742 + 0.8 * 10)
    assert_near(words.tokens[0].top, 92.0);
}

#[test]
fn test_crop_box_takes_precedence() {
    let extra = dictionary! {
        "CropBox" => [0, 0, 612, 700].map(Object::Integer).to_vec(),
    };
    let bytes = build_pdf_with(vec![(text_ops(&[("Cropped", 12, 72, 600)]), extra)]);
    let pages = LopdfPages::load_bytes(&bytes, ExtractOptions::default()).unwrap();

    let words = pages.page_words(1).unwrap();
    assert_eq!(words.height, 700.0);
    assert_near(words.tokens[0].top, 700.0 - (600.0 + 0.8 * 12.0));
}

#[test]
fn test_rotated_page_uses_displayed_edges() {
    let rotated = || dictionary! { "Rotate" => Object::Integer(90) };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("landscape.pdf");
    let bytes = build_pdf_with(vec![
        (text_ops(&[("Rotated Report", 20, 100, 300)]), rotated()),
        (
            text_ops(&[("Running Title", 9, 20, 400), ("Rotated Heading", 20, 200, 300)]),
            rotated(),
        ),
    ]);
    std::fs::write(&path, &bytes).unwrap();

    let pages = LopdfPages::load_bytes(&bytes, ExtractOptions::default()).unwrap();
    let words = pages.page_words(2).unwrap();
    assert_eq!(words.height, 612.0);
    let heading = words
        .tokens
        .iter()
        .find(|t| t.text == "Rotated Heading")
        .unwrap();
    // The unrotated bottom edge is the displayed left edge.
    assert_eq!(heading.x0, 300.0);
    assert_near(heading.top, 200.0 - 0.8 * 20.0);

    // The running title sits in the displayed header band.
    let lines = LineAssembler::default()
        .extract(&LopdfLoader::default(), &path)
        .into_lines();
    let second: Vec<_> = lines
        .iter()
        .filter(|l| l.page == 2)
        .map(|l| l.text.as_str())
        .collect();
    assert_eq!(second, ["Rotated Heading"]);
}
