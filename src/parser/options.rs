//! Word extraction options.

/// Options controlling how glyph runs are merged into word tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Keep blank characters inside words instead of splitting on them
    pub keep_blank_chars: bool,

    /// Maximum horizontal gap (points) between runs merged into one word
    pub x_tolerance: f32,

    /// Maximum vertical offset (points) between runs considered the same row
    pub y_tolerance: f32,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep or split on blank characters.
    pub fn with_keep_blank_chars(mut self, keep: bool) -> Self {
        self.keep_blank_chars = keep;
        self
    }

    /// Set horizontal tolerance.
    pub fn with_x_tolerance(mut self, tolerance: f32) -> Self {
        self.x_tolerance = tolerance;
        self
    }

    /// Set vertical tolerance.
    pub fn with_y_tolerance(mut self, tolerance: f32) -> Self {
        self.y_tolerance = tolerance;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            keep_blank_chars: true,
            x_tolerance: 3.0,
            y_tolerance: 3.0,
        }
    }
}
