//! Line/column positions inside XML input.

use std::fmt;

/// 1-based line and column of a byte offset within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextPosition {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number, counted in characters.
    pub column: usize,
}

impl TextPosition {
    /// Locates `offset` within `input`.
    ///
    /// Offsets past the end of the input are clamped to the end.
    #[must_use]
    pub fn locate(input: &[u8], offset: usize) -> Self {
        let end = offset.min(input.len());
        let consumed = &input[..end];
        let line = consumed.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = consumed
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |idx| idx + 1);
        let column = String::from_utf8_lossy(&consumed[line_start..])
            .chars()
            .count()
            + 1;
        Self { line, column }
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
