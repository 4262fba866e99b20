//! Code-point reader over a YAML source string.

use crate::Mark;

/// A reader that hands out code points from a YAML source text.
///
/// The reader decodes the source into code points up front and exposes
/// arbitrary lookahead (`peek_at`), consumption (`forward`), and prefix
/// extraction. It tracks the line and column of the current position so the
/// scanner can make indentation decisions, and hands out [`Mark`]s for
/// diagnostics when mark recording is enabled.
///
/// At end of input every peek returns the `'\0'` sentinel; the scanner never
/// has to special-case running off the end of the buffer.
#[derive(Debug, Clone)]
pub struct Reader {
    /// The source decoded into code points.
    buffer: Vec<char>,
    /// Position of the next unread code point in `buffer`.
    pointer: usize,
    /// Code points consumed since the start of the stream.
    index: usize,
    /// Code points consumed since the start of the current document.
    document_index: usize,
    /// Current line (0-based).
    line: usize,
    /// Current column in code points (0-based).
    column: usize,
    /// Whether `mark()` produces positions.
    use_marks: bool,
}

impl Reader {
    /// Create a new reader for the given source text, with marks enabled.
    pub fn new(source: &str) -> Self {
        Self {
            buffer: source.chars().collect(),
            pointer: 0,
            index: 0,
            document_index: 0,
            line: 0,
            column: 0,
            use_marks: true,
        }
    }

    /// Enable or disable mark recording.
    pub fn with_marks(mut self, use_marks: bool) -> Self {
        self.use_marks = use_marks;
        self
    }

    /// Peek at the next code point without consuming it.
    ///
    /// Returns `'\0'` at end of input.
    #[inline]
    pub fn peek(&self) -> char {
        self.peek_at(0)
    }

    /// Peek at the code point `offset` positions ahead without consuming.
    ///
    /// Returns `'\0'` for any position at or past end of input.
    #[inline]
    pub fn peek_at(&self, offset: usize) -> char {
        self.buffer
            .get(self.pointer + offset)
            .copied()
            .unwrap_or('\0')
    }

    /// Advance the position by `n` code points, updating line and column.
    ///
    /// `\n`, `\u{85}`, `\u{2028}`, `\u{2029}`, and `\r` not followed by `\n`
    /// start a new line; a byte order mark does not advance the column.
    pub fn forward(&mut self, n: usize) {
        for _ in 0..n {
            let Some(&c) = self.buffer.get(self.pointer) else {
                break;
            };
            self.pointer += 1;
            self.index += 1;
            self.document_index += 1;
            if matches!(c, '\n' | '\u{85}' | '\u{2028}' | '\u{2029}')
                || (c == '\r' && self.buffer.get(self.pointer) != Some(&'\n'))
            {
                self.line += 1;
                self.column = 0;
            } else if c != '\u{FEFF}' {
                self.column += 1;
            }
        }
    }

    /// Return the next `n` code points without advancing.
    ///
    /// The result is shorter than `n` when the input ends first.
    pub fn prefix(&self, n: usize) -> String {
        let end = (self.pointer + n).min(self.buffer.len());
        self.buffer[self.pointer..end].iter().collect()
    }

    /// Return the next `n` code points and advance past them.
    pub fn prefix_forward(&mut self, n: usize) -> String {
        let prefix = self.prefix(n);
        self.forward(n);
        prefix
    }

    /// Check if we're at the end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pointer >= self.buffer.len()
    }

    /// Code points consumed since the start of the stream.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Code points consumed since the start of the current document.
    #[inline]
    pub fn document_index(&self) -> usize {
        self.document_index
    }

    /// Current line (0-based).
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Current column in code points (0-based).
    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Capture the current position, or `None` when marks are disabled.
    #[inline]
    pub fn mark(&self) -> Option<Mark> {
        self.use_marks
            .then(|| Mark::new(self.index, self.line, self.column))
    }

    /// Restart per-document position bookkeeping.
    ///
    /// Used for labeling in multi-document streams; scan state (line, column,
    /// stream index) is untouched.
    pub fn reset_document_index(&mut self) {
        self.document_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_and_forward() {
        let mut reader = Reader::new("abc");
        assert_eq!(reader.peek(), 'a');
        assert_eq!(reader.peek_at(1), 'b');
        assert_eq!(reader.peek_at(2), 'c');
        assert_eq!(reader.peek_at(3), '\0');
        reader.forward(2);
        assert_eq!(reader.peek(), 'c');
        assert_eq!(reader.index(), 2);
        reader.forward(5);
        assert_eq!(reader.peek(), '\0');
        assert!(reader.is_eof());
    }

    #[test]
    fn test_line_and_column() {
        let mut reader = Reader::new("ab\ncd\r\nef");
        reader.forward(3);
        assert_eq!(reader.line(), 1);
        assert_eq!(reader.column(), 0);
        reader.forward(2);
        assert_eq!(reader.column(), 2);
        // \r\n counts as one line break over two code points
        reader.forward(2);
        assert_eq!(reader.line(), 2);
        assert_eq!(reader.column(), 0);
        assert_eq!(reader.peek(), 'e');
    }

    #[test]
    fn test_lone_carriage_return_breaks_line() {
        let mut reader = Reader::new("a\rb");
        reader.forward(2);
        assert_eq!(reader.line(), 1);
        assert_eq!(reader.column(), 0);
    }

    #[test]
    fn test_bom_does_not_advance_column() {
        let mut reader = Reader::new("\u{FEFF}a");
        reader.forward(1);
        assert_eq!(reader.column(), 0);
        assert_eq!(reader.peek(), 'a');
    }

    #[test]
    fn test_prefix() {
        let mut reader = Reader::new("hello");
        assert_eq!(reader.prefix(3), "hel");
        assert_eq!(reader.peek(), 'h');
        assert_eq!(reader.prefix_forward(3), "hel");
        assert_eq!(reader.peek(), 'l');
        // prefix past end of input is truncated
        assert_eq!(reader.prefix(10), "lo");
    }

    #[test]
    fn test_document_index_reset() {
        let mut reader = Reader::new("abcdef");
        reader.forward(4);
        assert_eq!(reader.document_index(), 4);
        reader.reset_document_index();
        assert_eq!(reader.document_index(), 0);
        assert_eq!(reader.index(), 4);
        reader.forward(1);
        assert_eq!(reader.document_index(), 1);
    }

    #[test]
    fn test_marks_disabled() {
        let reader = Reader::new("a").with_marks(false);
        assert_eq!(reader.mark(), None);
        let reader = Reader::new("a");
        let mark = reader.mark().unwrap();
        assert_eq!((mark.index, mark.line, mark.column), (0, 0, 0));
    }
}
