//! Page-level extraction types.

use serde::{Deserialize, Serialize};

/// A single word on a page, with position and font metadata.
///
/// Coordinates follow the top-left convention: `top` and `bottom` are
/// distances from the top edge of the page, `x0` from its left edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The word text (may contain blanks when blank characters are kept)
    pub text: String,
    /// Left edge
    pub x0: f32,
    /// Right edge
    pub x1: f32,
    /// Top edge, measured from the top of the page
    pub top: f32,
    /// Bottom edge, measured from the top of the page
    pub bottom: f32,
    /// Font size in points
    pub size: f32,
    /// Base font name (e.g., "Helvetica-Bold")
    pub font_name: String,
}

impl Token {
    /// Create a token whose box is derived from its font size.
    pub fn new(text: impl Into<String>, x0: f32, top: f32, size: f32) -> Self {
        let text = text.into();
        let width = estimated_width(&text, size);
        Self {
            text,
            x0,
            x1: x0 + width,
            top,
            bottom: top + size,
            size,
            font_name: String::new(),
        }
    }

    /// Set the font name.
    pub fn with_font_name(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        self
    }

    /// Width of the token box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }
}

/// Approximate advance width of `text` when no glyph metrics are available.
pub(crate) fn estimated_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

/// All words of one page, as yielded by the extraction backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageWords {
    /// Page number (1-indexed)
    pub number: u32,
    /// Page height in points
    pub height: f32,
    /// Words in content-stream order
    pub tokens: Vec<Token>,
}

impl PageWords {
    /// Create an empty page of the given height.
    pub fn new(number: u32, height: f32) -> Self {
        Self {
            number,
            height,
            tokens: Vec::new(),
        }
    }

    /// Create a page with US Letter height (11 inches).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 792.0)
    }

    /// Add a token.
    pub fn with_token(mut self, token: Token) -> Self {
        self.tokens.push(token);
        self
    }

    /// Add a token.
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Check if the page has no words.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
