//! Visual lines, the unit consumed by heading classification.

use serde::{Deserialize, Serialize};

/// One visual row of text on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Joined, trimmed text of the row
    pub text: String,
    /// Largest font size among the row's words, rounded to 0.1pt (0 for OCR lines)
    pub size: f32,
    /// Page number (1-indexed)
    pub page: u32,
    /// Vertical anchor: the row's top coordinate rounded to 0.1pt
    pub y0: f32,
}

impl Line {
    /// Create a new line.
    pub fn new(text: impl Into<String>, size: f32, page: u32, y0: f32) -> Self {
        Self {
            text: text.into(),
            size,
            page,
            y0,
        }
    }

    /// Create a line produced by OCR: no font size, no vertical position.
    pub fn recognized(text: impl Into<String>, page: u32) -> Self {
        Self::new(text, 0.0, page, 0.0)
    }

    /// Font size as an integer key at 0.1pt precision.
    ///
    /// Sizes are compared through this key so that values which print the
    /// same after rounding always rank together.
    pub fn size_key(&self) -> i32 {
        size_key(self.size)
    }
}

/// Integer key for a font size at 0.1pt precision.
pub fn size_key(size: f32) -> i32 {
    (size * 10.0).round() as i32
}

/// Round to one decimal place.
pub fn round1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

/// Whether `text` is a bare page number such as `"12"` or `"3.1"`.
///
/// Dots are ignored; what remains must be non-empty and made of decimal
/// digits. Roman numerals and fractions are not page numbers.
pub fn is_page_number(text: &str) -> bool {
    let mut digits = text.chars().filter(|c| *c != '.').peekable();
    digits.peek().is_some() && digits.all(is_decimal_digit)
}

/// First code point of each block of ten decimal digits (`0`..`9`).
const DIGIT_ZEROS: &[u32] = &[
    0x0030, 0x0660, 0x06F0, 0x07C0, 0x0966, 0x09E6, 0x0A66, 0x0AE6, 0x0B66, 0x0BE6, 0x0C66,
    0x0CE6, 0x0D66, 0x0DE6, 0x0E50, 0x0ED0, 0x0F20, 0x1040, 0x1090, 0x17E0, 0x1810, 0x1946,
    0x19D0, 0x1A80, 0x1A90, 0x1B50, 0x1BB0, 0x1C40, 0x1C50, 0xA620, 0xA8D0, 0xA900, 0xA9D0,
    0xA9F0, 0xAA50, 0xABF0, 0xFF10, 0x104A0, 0x11066, 0x110F0, 0x11136, 0x111D0, 0x112F0,
    0x11450, 0x114D0, 0x11650, 0x116C0, 0x11730, 0x118E0, 0x16A60, 0x16B50, 0x1E950,
];

/// Whether `c` is a decimal digit in any script (general category Nd).
fn is_decimal_digit(c: char) -> bool {
    let code = c as u32;
    if (0x1D7CE..=0x1D7FF).contains(&code) {
        // Mathematical bold, double-struck, sans-serif and monospace digits.
        return true;
    }
    DIGIT_ZEROS
        .iter()
        .any(|zero| (*zero..*zero + 10).contains(&code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_page_number() {
        assert!(is_page_number("1"));
        assert!(is_page_number("12"));
        assert!(is_page_number("2.3.1"));
        assert!(is_page_number("١٢")); // Arabic-Indic digits
        assert!(!is_page_number(""));
        assert!(!is_page_number("..."));
        assert!(!is_page_number("1 2"));
        assert!(!is_page_number("1. Introduction"));
        assert!(!is_page_number("-3"));
    }

    #[test]
    fn test_page_number_needs_decimal_digits() {
        assert!(is_page_number("４２")); // fullwidth
        assert!(is_page_number("१०")); // Devanagari
        assert!(!is_page_number("Ⅻ"));
        assert!(!is_page_number("½"));
        assert!(!is_page_number("一"));
    }

    #[test]
    fn test_rounding_and_keys() {
        assert_eq!(round1(11.96), 12.0);
        assert_eq!(round1(9.04), 9.0);
        assert_eq!(size_key(11.96), 120);
        assert_eq!(Line::new("x", 12.04, 1, 0.0).size_key(), 120);
    }

    #[test]
    fn test_recognized_line() {
        let line = Line::recognized("Scanned heading", 3);
        assert_eq!(line.size, 0.0);
        assert_eq!(line.y0, 0.0);
        assert_eq!(line.page, 3);
    }
}
