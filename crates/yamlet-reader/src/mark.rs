//! Position tracking for diagnostics.

use std::fmt;

/// A position in the source stream.
///
/// Marks are attached to tokens and errors for diagnostics only; they never
/// drive scanning decisions. When mark recording is disabled the reader
/// simply produces `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mark {
    /// Code points consumed since the start of the stream.
    pub index: usize,
    /// Line number (0-based).
    pub line: usize,
    /// Column number in code points (0-based).
    pub column: usize,
}

impl Mark {
    /// Create a new mark.
    #[inline]
    pub fn new(index: usize, line: usize, column: usize) -> Self {
        Self {
            index,
            line,
            column,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line + 1, self.column + 1)
    }
}
