//! PDF backend abstraction layer.
//!
//! [`PageSource`] is the only view of a PDF the line assembler gets: a page
//! count and, per page, its height and word tokens. [`LopdfPages`] implements
//! it on top of lopdf by walking each page's content stream, so no concrete
//! PDF library type leaks past this module.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::detect::sniff_version;
use crate::error::{Error, Result};
use crate::model::{estimated_width, size_key, PageWords, Token};

use super::options::ExtractOptions;

/// Default page size (US Letter) when no MediaBox can be found.
const DEFAULT_PAGE_WIDTH: f32 = 612.0;
const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// Default text leading used by `T*` before any `TL`/`TD` sets one.
const DEFAULT_LEADING: f32 = 12.0;

/// Ascender and descender as fractions of the font size.
const ASCENT: f32 = 0.8;
const DESCENT: f32 = 0.2;

/// TJ adjustment (thousandths of text space) treated as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Per-page access to word tokens.
pub trait PageSource {
    /// Total number of pages in the document.
    fn page_count(&self) -> u32;

    /// Words and geometry of a page (1-indexed).
    fn page_words(&self, number: u32) -> Result<PageWords>;
}

/// Opens PDF files as [`PageSource`]s.
///
/// Loaders are shared across batch workers, hence `Send + Sync`.
pub trait PdfLoader: Send + Sync {
    /// Open the document at `path`.
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>>;
}

/// [`PdfLoader`] backed by lopdf.
#[derive(Debug, Clone, Default)]
pub struct LopdfLoader {
    options: ExtractOptions,
}

impl LopdfLoader {
    /// Create a loader with the given word extraction options.
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Word extraction options in use.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }
}

impl PdfLoader for LopdfLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>> {
        let version = sniff_version(path)?;
        log::debug!("Opening {} (PDF {})", path.display(), version);
        Ok(Box::new(LopdfPages::load(path, self.options.clone())?))
    }
}

/// A loaded PDF whose pages are decoded into word tokens on demand.
pub struct LopdfPages {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
    options: ExtractOptions,
}

impl LopdfPages {
    /// Load from a file path.
    pub fn load<P: AsRef<Path>>(path: P, options: ExtractOptions) -> Result<Self> {
        let doc = LopdfDocument::load(path)?;
        Self::from_document(doc, options)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8], options: ExtractOptions) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Self::from_document(doc, options)
    }

    fn from_document(doc: LopdfDocument, options: ExtractOptions) -> Result<Self> {
        if doc.is_encrypted() {
            log::debug!("Document is encrypted; relying on lopdf's empty-password decryption");
        }
        let pages = doc.get_pages();
        Ok(Self {
            doc,
            pages,
            options,
        })
    }

    /// Look up a page attribute, following `Parent` links for the
    /// inheritable ones (MediaBox, CropBox, Rotate).
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut current = Some(page_id);
        while let Some(id) = current {
            let dict = self.doc.get_dictionary(id).ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok();
        }
        None
    }

    fn page_box(&self, page_id: ObjectId, key: &[u8]) -> Option<[f32; 4]> {
        let array = self.inherited(page_id, key)?.as_array().ok()?;
        if array.len() < 4 {
            return None;
        }
        let mut corners = [0.0; 4];
        for (slot, value) in corners.iter_mut().zip(array.iter()) {
            *slot = get_number(value)?;
        }
        let [x0, y0, x1, y1] = corners;
        Some([x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)])
    }

    /// Displayed area of a page: the CropBox (or MediaBox) turned by
    /// `/Rotate`.
    fn page_frame(&self, page_id: ObjectId) -> PageFrame {
        let [left, bottom, right, top] = self
            .page_box(page_id, b"CropBox")
            .or_else(|| self.page_box(page_id, b"MediaBox"))
            .unwrap_or([0.0, 0.0, DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT]);
        let rotation = self
            .inherited(page_id, b"Rotate")
            .and_then(get_number)
            .map(|degrees| normalize_rotation(degrees as i64))
            .unwrap_or(0);
        PageFrame {
            left,
            bottom,
            right,
            top,
            rotation,
        }
    }

    /// Raw (decompressed) content stream bytes of a page.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without content is blank, not broken.
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => Ok(stream_bytes(s)),
                Ok(Object::Array(arr)) => Ok(self.concat_streams(arr)),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => Ok(self.concat_streams(arr)),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn concat_streams(&self, refs: &[Object]) -> Vec<u8> {
        let mut content = Vec::new();
        for obj in refs {
            if let Object::Reference(r) = obj {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    content.extend_from_slice(&stream_bytes(s));
                    content.push(b' ');
                }
            }
        }
        content
    }

    /// Walk a content stream and collect positioned glyph runs.
    fn collect_runs(&self, page_id: ObjectId, content: &[u8]) -> Result<Vec<GlyphRun>> {
        let lopdf_fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut base_fonts = HashMap::new();
        for (name, font) in &lopdf_fonts {
            let base_font = font
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_else(|| String::from_utf8_lossy(name).to_string());
            base_fonts.insert(name.clone(), base_font);
        }

        let content =
            lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut runs = Vec::new();
        let mut font_key: Vec<u8> = Vec::new();
        let mut font_size: f32 = 12.0;
        let mut matrix = TextMatrix::default();
        let mut ctm = Matrix::IDENTITY;
        let mut saved: Vec<GraphicsState> = Vec::new();
        let mut in_text_block = false;

        for op in content.operations {
            match op.operator.as_str() {
                "q" => saved.push(GraphicsState {
                    ctm,
                    font_key: font_key.clone(),
                    font_size,
                    leading: matrix.leading,
                }),
                "Q" => {
                    // Unbalanced restores are ignored.
                    if let Some(state) = saved.pop() {
                        ctm = state.ctm;
                        font_key = state.font_key;
                        font_size = state.font_size;
                        matrix.leading = state.leading;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(&op.operands) {
                        ctm = m.then(&ctm);
                    }
                }
                "BT" => {
                    in_text_block = true;
                    matrix.reset();
                }
                "ET" => in_text_block = false,
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(name) = &op.operands[0] {
                            font_key = name.clone();
                        }
                        font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(leading) = op.operands.first().and_then(get_number) {
                        matrix.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            matrix.leading = -ty;
                        }
                        matrix.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(&op.operands) {
                        matrix.set(m);
                    }
                }
                "T*" => matrix.next_line(),
                "Tj" | "TJ" | "'" | "\"" => {
                    if op.operator == "'" || op.operator == "\"" {
                        matrix.next_line();
                    }
                    if !in_text_block {
                        continue;
                    }
                    let operand = match op.operator.as_str() {
                        "\"" => op.operands.get(2),
                        _ => op.operands.first(),
                    };
                    let Some(operand) = operand else {
                        continue;
                    };

                    let encoding = lopdf_fonts
                        .get(&font_key)
                        .and_then(|f| f.get_font_encoding(&self.doc).ok());
                    let decode = |bytes: &[u8]| match encoding {
                        Some(ref enc) => LopdfDocument::decode_text(enc, bytes)
                            .unwrap_or_else(|_| decode_text_simple(bytes)),
                        None => decode_text_simple(bytes),
                    };

                    let text = match operand {
                        Object::String(bytes, _) => decode(bytes.as_slice()),
                        Object::Array(items) => shown_array_text(items, decode),
                        _ => String::new(),
                    };

                    if !text.trim().is_empty() {
                        // Text space to user space: Tm x CTM.
                        let rendering = matrix.matrix.then(&ctm);
                        let (x, y) = rendering.position();
                        runs.push(GlyphRun {
                            text,
                            x,
                            y,
                            size: font_size * rendering.vertical_scale(),
                            font_name: base_fonts
                                .get(&font_key)
                                .cloned()
                                .unwrap_or_default(),
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(runs)
    }
}

impl PageSource for LopdfPages {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_words(&self, number: u32) -> Result<PageWords> {
        let page_id = *self
            .pages
            .get(&number)
            .ok_or(Error::PageOutOfRange(number, self.pages.len() as u32))?;

        let frame = self.page_frame(page_id);
        let content = self.page_content(page_id)?;
        let runs = if content.is_empty() {
            Vec::new()
        } else {
            self.collect_runs(page_id, &content)?
        };

        let fragments = runs
            .into_iter()
            .map(|run| {
                let (x0, baseline) = frame.to_view(run.x, run.y);
                Token {
                    x1: x0 + estimated_width(&run.text, run.size),
                    x0,
                    top: baseline - run.size * ASCENT,
                    bottom: baseline + run.size * DESCENT,
                    size: run.size,
                    font_name: run.font_name,
                    text: run.text,
                }
            })
            .collect();

        Ok(PageWords {
            number,
            height: frame.height(),
            tokens: merge_into_words(fragments, &self.options),
        })
    }
}

/// Stream data with filters applied; unfiltered streams are returned as is.
fn stream_bytes(stream: &lopdf::Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

/// A string shown by one text operator, in PDF user space.
#[derive(Debug, Clone)]
struct GlyphRun {
    text: String,
    x: f32,
    y: f32,
    size: f32,
    font_name: String,
}

/// Join the strings of a `TJ` array, inserting a space where a large
/// negative adjustment separates two words.
fn shown_array_text(items: &[Object], decode: impl Fn(&[u8]) -> String) -> String {
    let mut combined = String::new();
    for item in items {
        match item {
            Object::String(bytes, _) => combined.push_str(&decode(bytes.as_slice())),
            other => {
                let Some(adjustment) = get_number(other) else {
                    continue;
                };
                if -adjustment > TJ_SPACE_THRESHOLD
                    && !combined.ends_with(' ')
                    && !combined.ends_with('\u{00A0}')
                {
                    if let Some(last) = combined.chars().last() {
                        if !is_spaceless_script_char(last) {
                            combined.push(' ');
                        }
                    }
                }
            }
        }
    }
    combined
}

/// Merge positioned text fragments into words.
///
/// Fragments are clustered into rows (tops within `y_tolerance` of the row's
/// first fragment), ordered left to right, and adjacent fragments with the
/// same size and font are joined when the gap between them is at most
/// `x_tolerance`. Without `keep_blank_chars` fragments are first split at
/// whitespace, so blanks always end a word.
pub(crate) fn merge_into_words(fragments: Vec<Token>, options: &ExtractOptions) -> Vec<Token> {
    let mut pieces: Vec<Token> = if options.keep_blank_chars {
        fragments
    } else {
        fragments.into_iter().flat_map(split_at_blanks).collect()
    };
    pieces.sort_by(|a, b| a.top.total_cmp(&b.top));

    let mut rows: Vec<Vec<Token>> = Vec::new();
    for piece in pieces {
        match rows.last_mut() {
            Some(row) if piece.top - row[0].top <= options.y_tolerance => row.push(piece),
            _ => rows.push(vec![piece]),
        }
    }

    let mut words = Vec::new();
    for mut row in rows {
        row.sort_by(|a, b| a.x0.total_cmp(&b.x0));
        let mut current: Option<Token> = None;
        for piece in row {
            current = Some(match current.take() {
                Some(mut word)
                    if piece.x0 - word.x1 <= options.x_tolerance
                        && size_key(piece.size) == size_key(word.size)
                        && piece.font_name == word.font_name =>
                {
                    word.text.push_str(&piece.text);
                    word.x1 = word.x1.max(piece.x1);
                    word.top = word.top.min(piece.top);
                    word.bottom = word.bottom.max(piece.bottom);
                    word
                }
                Some(word) => {
                    words.push(word);
                    piece
                }
                None => piece,
            });
        }
        words.extend(current);
    }
    words
}

/// Split a fragment into its whitespace-separated pieces, estimating each
/// piece's horizontal offset from its character position.
fn split_at_blanks(fragment: Token) -> Vec<Token> {
    let advance = fragment.size * 0.5;
    let mut pieces = Vec::new();
    let mut start: Option<(usize, String)> = None;

    for (index, ch) in fragment.text.chars().enumerate() {
        if ch.is_whitespace() {
            if let Some((begin, text)) = start.take() {
                pieces.push(piece_at(&fragment, begin, text, advance));
            }
        } else {
            start.get_or_insert_with(|| (index, String::new())).1.push(ch);
        }
    }
    if let Some((begin, text)) = start {
        pieces.push(piece_at(&fragment, begin, text, advance));
    }
    pieces
}

fn piece_at(fragment: &Token, offset: usize, text: String, advance: f32) -> Token {
    let x0 = fragment.x0 + offset as f32 * advance;
    Token {
        x1: x0 + text.chars().count() as f32 * advance,
        x0,
        top: fragment.top,
        bottom: fragment.bottom,
        size: fragment.size,
        font_name: fragment.font_name.clone(),
        text,
    }
}

/// Displayed page area in default user space.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PageFrame {
    left: f32,
    bottom: f32,
    right: f32,
    top: f32,
    /// Clockwise display rotation: 0, 90, 180 or 270.
    rotation: u16,
}

impl PageFrame {
    /// Height of the page as displayed.
    fn height(&self) -> f32 {
        match self.rotation {
            90 | 270 => self.right - self.left,
            _ => self.top - self.bottom,
        }
    }

    /// Map a user-space point to `(x, distance from top)` on the displayed
    /// page.
    fn to_view(&self, x: f32, y: f32) -> (f32, f32) {
        match self.rotation {
            90 => (y - self.bottom, x - self.left),
            180 => (self.right - x, y - self.bottom),
            270 => (self.top - y, self.right - x),
            _ => (x - self.left, self.top - y),
        }
    }
}

/// Fold a `/Rotate` value into 0, 90, 180 or 270. Values that are not a
/// multiple of 90 are invalid and read as 0.
fn normalize_rotation(degrees: i64) -> u16 {
    match degrees.rem_euclid(360) {
        90 => 90,
        180 => 180,
        270 => 270,
        _ => 0,
    }
}

/// Affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Read the six operands of `cm` or `Tm`.
    fn from_operands(operands: &[Object]) -> Option<Self> {
        let values = operands
            .iter()
            .take(6)
            .map(get_number)
            .collect::<Option<Vec<f32>>>()?;
        let [a, b, c, d, e, f] = <[f32; 6]>::try_from(values).ok()?;
        Some(Self { a, b, c, d, e, f })
    }

    /// `self x other`: apply `self` first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Image of the origin.
    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    /// Length of the transformed unit vertical, i.e. how much a glyph's
    /// height is scaled.
    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Graphics state saved by `q` and restored by `Q`.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font_key: Vec<u8>,
    font_size: f32,
    leading: f32,
}

/// Text matrix state for position tracking.
#[derive(Debug, Clone)]
struct TextMatrix {
    matrix: Matrix,
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            leading: DEFAULT_LEADING,
        }
    }
}

impl TextMatrix {
    /// Reset position at `BT`; leading is graphics state and survives.
    fn reset(&mut self) {
        self.matrix = Matrix::IDENTITY;
    }

    fn set(&mut self, matrix: Matrix) {
        self.matrix = matrix;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        let m = &mut self.matrix;
        m.e += tx * m.a + ty * m.c;
        m.f += tx * m.b + ty * m.d;
    }

    fn next_line(&mut self) {
        self.translate(0.0, -self.leading);
    }

    fn position(&self) -> (f32, f32) {
        self.matrix.position()
    }
}

/// Helper to extract number from PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // CJK Unified Ideographs Extension B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
