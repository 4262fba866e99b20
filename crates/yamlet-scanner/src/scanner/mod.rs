//! The pull scanner: token-stream driver, indentation and flow state
//! machine, simple-key tracking, and the per-construct sub-scanners.

use std::collections::{BTreeMap, VecDeque};

use tracing::trace;
use yamlet_reader::{Mark, Reader};

use crate::chars::{self, BOM};
use crate::error::{Result, ScanError};
use crate::tokens::{CommentKind, DirectiveValue, ScalarStyle, Token, TokenKind};

#[cfg(test)]
mod tests;

/// A simple key spans at most this many code points and one line. Kept as a
/// compatibility constant; conformance suites depend on the exact threshold.
const MAX_SIMPLE_KEY_LENGTH: usize = 1024;

const SCANNING_DIRECTIVE: &str = "while scanning a directive";
const SCANNING_BLOCK_SCALAR: &str = "while scanning a block scalar";
const SCANNING_DOUBLE_QUOTED: &str = "while scanning a double-quoted scalar";
const SCANNING_QUOTED: &str = "while scanning a quoted scalar";
const SCANNING_SIMPLE_KEY: &str = "while scanning a simple key";

/// Options controlling how a [`Scanner`] behaves.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    parse_comments: bool,
    use_marks: bool,
    label: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            parse_comments: false,
            use_marks: true,
            label: String::new(),
        }
    }
}

impl ScanOptions {
    /// Default options: no comment tokens, marks enabled, no label.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit [`TokenKind::Comment`] tokens instead of discarding comments
    /// and blank lines.
    pub fn parse_comments(mut self, parse_comments: bool) -> Self {
        self.parse_comments = parse_comments;
        self
    }

    /// Record position marks on tokens and errors. On by default; turning
    /// this off skips all position capture.
    pub fn use_marks(mut self, use_marks: bool) -> Self {
        self.use_marks = use_marks;
        self
    }

    /// A label, usually a file name, attached to errors for attribution.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// A candidate position for a mapping key not introduced by `?`.
///
/// The corresponding Key token is inserted retroactively once the matching
/// `:` is found; `token_number` records where in the stream it must land.
#[derive(Debug, Clone)]
struct SimpleKey {
    /// Position in the overall token stream where a Key token goes.
    token_number: usize,
    /// A required key must resolve before going stale.
    required: bool,
    /// Stream index where the candidate starts.
    index: usize,
    /// Line where the candidate starts.
    line: usize,
    /// Column where the candidate starts.
    column: usize,
    mark: Option<Mark>,
}

/// Trailing line-break policy of a block scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chomp {
    /// `-`: discard all trailing breaks.
    Strip,
    /// Default: keep exactly one trailing break.
    Clip,
    /// `+`: keep all trailing breaks.
    Keep,
}

/// Parsed block scalar header.
#[derive(Debug, Clone, Copy)]
struct Chomping {
    chomp: Chomp,
    /// Explicit indentation increment, 1-9.
    increment: Option<u32>,
}

/// A pull-based YAML scanner.
///
/// Produces the token sequence for one input stream, doing only as much work
/// per call as is needed to settle the next token. Tokens reach the caller in
/// document order even though Key tokens are decided retroactively. A
/// scanning error is terminal: once one is reported, every further call
/// returns the same error.
///
/// ```
/// use yamlet_scanner::{Scanner, TokenKind};
///
/// let kinds: Vec<TokenKind> = Scanner::new("key: value")
///     .map(|t| t.map(|t| t.kind))
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(kinds[0], TokenKind::StreamStart);
/// ```
pub struct Scanner {
    reader: Reader,
    opts: ScanOptions,
    /// Staged tokens not yet handed to the caller. Key tokens may be
    /// inserted at interior positions.
    tokens: VecDeque<Token>,
    /// Number of tokens already handed to the caller.
    tokens_taken: usize,
    /// Current block indentation level; -1 before any block structure.
    indent: i64,
    /// Enclosing indentation levels, strictly increasing.
    indents: Vec<i64>,
    /// Number of unclosed `[` and `{`. Zero means block context.
    flow_level: usize,
    /// Start marks of unclosed flow collections, for error context.
    flow_starts: Vec<Option<Mark>>,
    /// At most one candidate simple key per flow level.
    possible_simple_keys: BTreeMap<usize, SimpleKey>,
    /// Whether a simple key (or a block collection) may start here.
    allow_simple_key: bool,
    /// Whether the most recently staged token was a BlockEntry. Drives
    /// comment placement classification.
    last_was_block_entry: bool,
    /// The stream-end token has been staged.
    done: bool,
    /// Terminal failure, replayed on every subsequent call.
    failure: Option<ScanError>,
    /// The iterator has yielded its failure and now fuses.
    fused: bool,
}

impl Scanner {
    /// Create a scanner over `source` with default options.
    pub fn new(source: &str) -> Self {
        Self::with_options(source, ScanOptions::default())
    }

    /// Create a scanner over `source` with the given options.
    pub fn with_options(source: &str, opts: ScanOptions) -> Self {
        let reader = Reader::new(source).with_marks(opts.use_marks);
        let mut scanner = Self {
            reader,
            opts,
            tokens: VecDeque::new(),
            tokens_taken: 0,
            indent: -1,
            indents: Vec::new(),
            flow_level: 0,
            flow_starts: Vec::new(),
            possible_simple_keys: BTreeMap::new(),
            allow_simple_key: true,
            last_was_block_entry: false,
            done: false,
            failure: None,
            fused: false,
        };
        scanner.fetch_stream_start();
        scanner
    }

    /// Whether another token is available.
    pub fn has_next_token(&mut self) -> Result<bool> {
        Ok(self.peek_token()?.is_some())
    }

    /// Look at the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<Option<&Token>> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        if let Err(err) = self.ensure_tokens() {
            return Err(self.fail(err));
        }
        Ok(self.tokens.front())
    }

    /// Consume and return the next token, or `None` once the stream-end
    /// token has been delivered.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        if let Err(err) = self.ensure_tokens() {
            return Err(self.fail(err));
        }
        match self.tokens.pop_front() {
            Some(token) => {
                self.tokens_taken += 1;
                Ok(Some(token))
            }
            None => Ok(None),
        }
    }

    /// Restart per-document position bookkeeping.
    ///
    /// For hosts labeling documents in a multi-document stream; scan state
    /// is untouched.
    pub fn reset_document_index(&mut self) {
        self.reader.reset_document_index();
    }

    fn fail(&mut self, err: ScanError) -> ScanError {
        let err = if self.opts.label.is_empty() {
            err
        } else {
            err.with_label(self.opts.label.clone())
        };
        self.failure = Some(err.clone());
        err
    }

    fn ensure_tokens(&mut self) -> Result<()> {
        while self.need_more_tokens()? {
            self.fetch_more_tokens()?;
        }
        Ok(())
    }

    fn need_more_tokens(&mut self) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        if self.tokens.is_empty() {
            return Ok(true);
        }
        // The head of the queue is not settled while a pending simple key
        // could still insert a Key token in front of it.
        self.unwind_stale_simple_keys()?;
        Ok(self.next_possible_simple_key() == Some(self.tokens_taken))
    }

    fn push_token(&mut self, token: Token) {
        trace!(kind = ?token.kind, "token");
        self.last_was_block_entry = matches!(token.kind, TokenKind::BlockEntry);
        self.tokens.push_back(token);
    }

    // Fetching

    fn fetch_more_tokens(&mut self) -> Result<()> {
        self.scan_to_next_token();
        self.unwind_stale_simple_keys()?;
        self.unwind_indent(self.reader.column() as i64);
        let c = self.reader.peek();
        if c == '\0' {
            return self.fetch_stream_end();
        }
        match c {
            '%' if self.check_directive() => self.fetch_directive(),
            '-' if self.check_document_start() => self.fetch_document_indicator(true),
            '.' if self.check_document_end() => self.fetch_document_indicator(false),
            '[' => self.fetch_flow_collection_start(TokenKind::FlowSequenceStart),
            '{' => self.fetch_flow_collection_start(TokenKind::FlowMappingStart),
            ']' => self.fetch_flow_collection_end(TokenKind::FlowSequenceEnd, '[', ']'),
            '}' => self.fetch_flow_collection_end(TokenKind::FlowMappingEnd, '{', '}'),
            ',' => self.fetch_flow_entry(),
            '-' if self.check_block_entry() => self.fetch_block_entry(),
            '?' if self.check_key() => self.fetch_key(),
            ':' if self.check_value() => self.fetch_value(),
            '*' => self.fetch_anchor_or_alias(false),
            '&' => self.fetch_anchor_or_alias(true),
            '!' => self.fetch_tag(),
            '|' if self.flow_level == 0 => self.fetch_block_scalar(ScalarStyle::Literal),
            '>' if self.flow_level == 0 => self.fetch_block_scalar(ScalarStyle::Folded),
            '\'' => self.fetch_flow_scalar(ScalarStyle::SingleQuoted),
            '"' => self.fetch_flow_scalar(ScalarStyle::DoubleQuoted),
            _ if self.check_plain() => self.fetch_plain(),
            _ => Err(ScanError::new(
                "while scanning for the next token",
                None,
                format!(
                    "found character {} that cannot start any token",
                    chars::describe_char(c)
                ),
                self.reader.mark(),
            )),
        }
    }

    fn fetch_stream_start(&mut self) {
        let mark = self.reader.mark();
        self.push_token(Token::new(TokenKind::StreamStart, mark, mark));
    }

    fn fetch_stream_end(&mut self) -> Result<()> {
        if self.flow_level > 0 {
            let context_mark = self.flow_starts.last().copied().flatten();
            return Err(ScanError::new(
                "while scanning a flow collection",
                context_mark,
                "found unexpected end of stream",
                self.reader.mark(),
            ));
        }
        self.unwind_indent(-1);
        self.remove_possible_simple_key()?;
        self.allow_simple_key = false;
        self.possible_simple_keys.clear();
        let mark = self.reader.mark();
        self.push_token(Token::new(TokenKind::StreamEnd, mark, mark));
        self.done = true;
        Ok(())
    }

    fn fetch_directive(&mut self) -> Result<()> {
        self.unwind_indent(-1);
        self.remove_possible_simple_key()?;
        self.allow_simple_key = false;
        let tokens = self.scan_directive()?;
        for token in tokens {
            self.push_token(token);
        }
        Ok(())
    }

    fn fetch_document_indicator(&mut self, is_start: bool) -> Result<()> {
        self.unwind_indent(-1);
        self.remove_possible_simple_key()?;
        self.allow_simple_key = false;
        let start_mark = self.reader.mark();
        self.reader.forward(3);
        let end_mark = self.reader.mark();
        let kind = if is_start {
            TokenKind::DocumentStart
        } else {
            TokenKind::DocumentEnd
        };
        self.push_token(Token::new(kind, start_mark, end_mark));
        Ok(())
    }

    fn fetch_flow_collection_start(&mut self, kind: TokenKind) -> Result<()> {
        self.save_possible_simple_key()?;
        self.flow_level += 1;
        self.flow_starts.push(self.reader.mark());
        self.allow_simple_key = true;
        let start_mark = self.reader.mark();
        self.reader.forward(1);
        let end_mark = self.reader.mark();
        self.push_token(Token::new(kind, start_mark, end_mark));
        Ok(())
    }

    fn fetch_flow_collection_end(&mut self, kind: TokenKind, open: char, close: char) -> Result<()> {
        if self.flow_level == 0 {
            return Err(ScanError::at(
                format!("found '{close}' without a matching '{open}'"),
                self.reader.mark(),
            ));
        }
        self.remove_possible_simple_key()?;
        self.flow_level -= 1;
        self.flow_starts.pop();
        self.allow_simple_key = false;
        let start_mark = self.reader.mark();
        self.reader.forward(1);
        let end_mark = self.reader.mark();
        self.push_token(Token::new(kind, start_mark, end_mark));
        Ok(())
    }

    fn fetch_flow_entry(&mut self) -> Result<()> {
        if self.flow_level == 0 {
            return Err(ScanError::at(
                "flow entries are not allowed here",
                self.reader.mark(),
            ));
        }
        self.allow_simple_key = true;
        self.remove_possible_simple_key()?;
        let start_mark = self.reader.mark();
        self.reader.forward(1);
        let end_mark = self.reader.mark();
        self.push_token(Token::new(TokenKind::FlowEntry, start_mark, end_mark));
        Ok(())
    }

    fn fetch_block_entry(&mut self) -> Result<()> {
        if self.flow_level == 0 {
            if !self.allow_simple_key {
                return Err(ScanError::at(
                    "sequence entries are not allowed here",
                    self.reader.mark(),
                ));
            }
            if self.add_indent(self.reader.column()) {
                let mark = self.reader.mark();
                self.push_token(Token::new(TokenKind::BlockSequenceStart, mark, mark));
            }
        }
        // In flow context the entry token is still staged.
        self.allow_simple_key = true;
        self.remove_possible_simple_key()?;
        let start_mark = self.reader.mark();
        self.reader.forward(1);
        let end_mark = self.reader.mark();
        self.push_token(Token::new(TokenKind::BlockEntry, start_mark, end_mark));
        Ok(())
    }

    fn fetch_key(&mut self) -> Result<()> {
        if self.flow_level == 0 {
            if !self.allow_simple_key {
                return Err(ScanError::at(
                    "mapping keys are not allowed here",
                    self.reader.mark(),
                ));
            }
            if self.add_indent(self.reader.column()) {
                let mark = self.reader.mark();
                self.push_token(Token::new(TokenKind::BlockMappingStart, mark, mark));
            }
        }
        self.allow_simple_key = self.flow_level == 0;
        self.remove_possible_simple_key()?;
        let start_mark = self.reader.mark();
        self.reader.forward(1);
        let end_mark = self.reader.mark();
        self.push_token(Token::new(TokenKind::Key, start_mark, end_mark));
        Ok(())
    }

    fn fetch_value(&mut self) -> Result<()> {
        if let Some(key) = self.possible_simple_keys.remove(&self.flow_level) {
            // The scanned fragment turned out to be a key after all. Insert
            // the Key token back where the fragment started.
            let insert_at = key.token_number - self.tokens_taken;
            trace!(position = key.token_number, "retroactive key");
            self.tokens
                .insert(insert_at, Token::new(TokenKind::Key, key.mark, key.mark));
            if self.flow_level == 0 && self.add_indent(key.column) {
                self.tokens.insert(
                    insert_at,
                    Token::new(TokenKind::BlockMappingStart, key.mark, key.mark),
                );
            }
            self.allow_simple_key = false;
        } else {
            if self.flow_level == 0 && !self.allow_simple_key {
                return Err(ScanError::at(
                    "mapping values are not allowed here",
                    self.reader.mark(),
                ));
            }
            if self.flow_level == 0 && self.add_indent(self.reader.column()) {
                let mark = self.reader.mark();
                self.push_token(Token::new(TokenKind::BlockMappingStart, mark, mark));
            }
            self.allow_simple_key = self.flow_level == 0;
            self.remove_possible_simple_key()?;
        }
        let start_mark = self.reader.mark();
        self.reader.forward(1);
        let end_mark = self.reader.mark();
        self.push_token(Token::new(TokenKind::Value, start_mark, end_mark));
        Ok(())
    }

    fn fetch_anchor_or_alias(&mut self, is_anchor: bool) -> Result<()> {
        self.save_possible_simple_key()?;
        self.allow_simple_key = false;
        let token = self.scan_anchor(is_anchor)?;
        self.push_token(token);
        Ok(())
    }

    fn fetch_tag(&mut self) -> Result<()> {
        self.save_possible_simple_key()?;
        self.allow_simple_key = false;
        let token = self.scan_tag()?;
        self.push_token(token);
        Ok(())
    }

    fn fetch_block_scalar(&mut self, style: ScalarStyle) -> Result<()> {
        self.allow_simple_key = true;
        self.remove_possible_simple_key()?;
        let tokens = self.scan_block_scalar(style)?;
        for token in tokens {
            self.push_token(token);
        }
        Ok(())
    }

    fn fetch_flow_scalar(&mut self, style: ScalarStyle) -> Result<()> {
        self.save_possible_simple_key()?;
        self.allow_simple_key = false;
        let token = self.scan_flow_scalar(style)?;
        self.push_token(token);
        Ok(())
    }

    fn fetch_plain(&mut self) -> Result<()> {
        self.save_possible_simple_key()?;
        self.allow_simple_key = false;
        let token = self.scan_plain();
        self.push_token(token);
        Ok(())
    }

    // Checks

    fn check_directive(&self) -> bool {
        self.reader.column() == 0
    }

    fn check_document_start(&self) -> bool {
        self.reader.column() == 0
            && self.reader.prefix(3) == "---"
            && chars::is_nul_blank_tab_or_line_break(self.reader.peek_at(3))
    }

    fn check_document_end(&self) -> bool {
        self.reader.column() == 0
            && self.reader.prefix(3) == "..."
            && chars::is_nul_blank_tab_or_line_break(self.reader.peek_at(3))
    }

    fn check_block_entry(&self) -> bool {
        chars::is_nul_blank_tab_or_line_break(self.reader.peek_at(1))
    }

    fn check_key(&self) -> bool {
        self.flow_level != 0 || chars::is_nul_blank_tab_or_line_break(self.reader.peek_at(1))
    }

    fn check_value(&self) -> bool {
        self.flow_level != 0 || chars::is_nul_blank_tab_or_line_break(self.reader.peek_at(1))
    }

    fn check_plain(&self) -> bool {
        let c = self.reader.peek();
        let is_indicator = matches!(
            c,
            '-' | '?'
                | ':'
                | ','
                | '['
                | ']'
                | '{'
                | '}'
                | '#'
                | '&'
                | '*'
                | '!'
                | '|'
                | '>'
                | '\''
                | '"'
                | '%'
                | '@'
                | '`'
        );
        (!chars::is_nul_blank_tab_or_line_break(c) && !is_indicator)
            || (!chars::is_nul_blank_tab_or_line_break(self.reader.peek_at(1))
                && (c == '-' || (self.flow_level == 0 && matches!(c, '?' | ':'))))
    }

    // Indentation

    /// Pop indentation levels down to `column`, staging one BlockEnd per
    /// popped level. No-op in flow context.
    fn unwind_indent(&mut self, column: i64) {
        if self.flow_level != 0 {
            return;
        }
        while self.indent > column {
            let mark = self.reader.mark();
            self.indent = self.indents.pop().unwrap_or(-1);
            self.push_token(Token::new(TokenKind::BlockEnd, mark, mark));
        }
    }

    /// Push a new indentation level if `column` is deeper than the current
    /// one. Returns whether a level was pushed.
    fn add_indent(&mut self, column: usize) -> bool {
        let column = column as i64;
        if self.indent < column {
            self.indents.push(self.indent);
            self.indent = column;
            true
        } else {
            false
        }
    }

    // Simple keys

    /// Stream position of the earliest unresolved simple key, if any.
    fn next_possible_simple_key(&self) -> Option<usize> {
        // Entries are keyed by flow level; the outermost level was recorded
        // earliest and has the smallest token number.
        self.possible_simple_keys
            .first_key_value()
            .map(|(_, key)| key.token_number)
    }

    /// Drop simple keys that can no longer be keys: a different line was
    /// reached or more than the maximum key length has elapsed. A required
    /// key going stale is fatal.
    fn unwind_stale_simple_keys(&mut self) -> Result<()> {
        let mut stale = Vec::new();
        for (&level, key) in &self.possible_simple_keys {
            if key.line != self.reader.line()
                || self.reader.index() - key.index > MAX_SIMPLE_KEY_LENGTH
            {
                if key.required {
                    return Err(ScanError::new(
                        SCANNING_SIMPLE_KEY,
                        key.mark,
                        "could not find expected ':'",
                        self.reader.mark(),
                    ));
                }
                stale.push(level);
            }
        }
        for level in stale {
            self.possible_simple_keys.remove(&level);
        }
        Ok(())
    }

    /// Record the current position as a possible simple key for the current
    /// flow level.
    fn save_possible_simple_key(&mut self) -> Result<()> {
        let required = self.flow_level == 0 && self.indent == self.reader.column() as i64;
        debug_assert!(self.allow_simple_key || !required);
        if self.allow_simple_key {
            self.remove_possible_simple_key()?;
            let key = SimpleKey {
                token_number: self.tokens_taken + self.tokens.len(),
                required,
                index: self.reader.index(),
                line: self.reader.line(),
                column: self.reader.column(),
                mark: self.reader.mark(),
            };
            self.possible_simple_keys.insert(self.flow_level, key);
        }
        Ok(())
    }

    /// Discard the simple key recorded at the current flow level, which is
    /// fatal if that key was required.
    fn remove_possible_simple_key(&mut self) -> Result<()> {
        if let Some(key) = self.possible_simple_keys.remove(&self.flow_level)
            && key.required
        {
            return Err(ScanError::new(
                SCANNING_SIMPLE_KEY,
                key.mark,
                "could not find expected ':'",
                self.reader.mark(),
            ));
        }
        Ok(())
    }

    // Whitespace, comments, and line breaks

    /// Advance past whitespace, comments, and line breaks to the start of
    /// the next token, staging comment tokens when enabled.
    fn scan_to_next_token(&mut self) {
        if self.reader.index() == 0 && self.reader.peek() == BOM {
            self.reader.forward(1);
        }
        let mut inline_start_column: Option<usize> = None;
        loop {
            let start_mark = self.reader.mark();
            let column_before = self.reader.column();
            let mut comment_seen = false;
            let mut ff = 0;
            while self.reader.peek_at(ff) == ' ' {
                ff += 1;
            }
            if ff > 0 {
                self.reader.forward(ff);
            }
            if self.reader.peek() == '#' {
                comment_seen = true;
                // A comment trailing content is inline, as is a comment
                // aligned under a previous inline comment. A comment on its
                // own line, or trailing only a `-`, stands on its own.
                let kind = if column_before != 0 && !self.last_was_block_entry {
                    inline_start_column = Some(self.reader.column());
                    CommentKind::Inline
                } else if inline_start_column == Some(self.reader.column()) {
                    CommentKind::Inline
                } else {
                    inline_start_column = None;
                    CommentKind::Block
                };
                let token = self.scan_comment(kind);
                if self.opts.parse_comments {
                    self.push_token(token);
                }
            }
            if let Some(line_break) = self.scan_line_break() {
                if self.opts.parse_comments && !comment_seen && column_before == 0 {
                    let end_mark = self.reader.mark();
                    self.push_token(Token::new(
                        TokenKind::Comment {
                            kind: CommentKind::BlankLine,
                            value: line_break.to_string(),
                        },
                        start_mark,
                        end_mark,
                    ));
                }
                if self.flow_level == 0 {
                    self.allow_simple_key = true;
                }
            } else {
                break;
            }
        }
    }

    fn scan_comment(&mut self, kind: CommentKind) -> Token {
        let start_mark = self.reader.mark();
        self.reader.forward(1);
        let mut length = 0;
        while !chars::is_nul_or_line_break(self.reader.peek_at(length)) {
            length += 1;
        }
        let value = self.reader.prefix_forward(length);
        let end_mark = self.reader.mark();
        Token::new(TokenKind::Comment { kind, value }, start_mark, end_mark)
    }

    /// Consume one line break, normalizing `\r\n`, `\r`, and NEL to `\n`.
    /// LS and PS are kept as themselves.
    fn scan_line_break(&mut self) -> Option<char> {
        let c = self.reader.peek();
        if matches!(c, '\r' | '\n' | '\u{85}') {
            if c == '\r' && self.reader.peek_at(1) == '\n' {
                self.reader.forward(2);
            } else {
                self.reader.forward(1);
            }
            Some('\n')
        } else if matches!(c, '\u{2028}' | '\u{2029}') {
            self.reader.forward(1);
            Some(c)
        } else {
            None
        }
    }

    /// Whether the reader sits on a `---` or `...` line at column 0.
    fn at_document_boundary(&self) -> bool {
        let prefix = self.reader.prefix(3);
        (prefix == "---" || prefix == "...")
            && chars::is_nul_blank_tab_or_line_break(self.reader.peek_at(3))
    }

    // Directives

    fn scan_directive(&mut self) -> Result<Vec<Token>> {
        let start_mark = self.reader.mark();
        self.reader.forward(1);
        let name = self.scan_directive_name(start_mark)?;
        let value;
        let end_mark;
        if name == "YAML" {
            value = Some(self.scan_yaml_directive_value(start_mark)?);
            end_mark = self.reader.mark();
        } else if name == "TAG" {
            value = Some(self.scan_tag_directive_value(start_mark)?);
            end_mark = self.reader.mark();
        } else {
            // Unknown directives are tokenized by name only; the rest of
            // the line is skipped.
            end_mark = self.reader.mark();
            let mut length = 0;
            while !chars::is_nul_or_line_break(self.reader.peek_at(length)) {
                length += 1;
            }
            if length > 0 {
                self.reader.forward(length);
            }
            value = None;
        }
        let comment = self.scan_directive_ignored_line(start_mark)?;
        let mut tokens = vec![Token::new(
            TokenKind::Directive { name, value },
            start_mark,
            end_mark,
        )];
        if let Some(comment) = comment {
            tokens.push(comment);
        }
        Ok(tokens)
    }

    fn scan_directive_name(&mut self, start_mark: Option<Mark>) -> Result<String> {
        let mut length = 0;
        while chars::is_word_char(self.reader.peek_at(length)) {
            length += 1;
        }
        if length == 0 {
            return Err(ScanError::new(
                SCANNING_DIRECTIVE,
                start_mark,
                format!(
                    "expected alphabetic or numeric character, but found {}",
                    chars::describe_char(self.reader.peek())
                ),
                self.reader.mark(),
            ));
        }
        let value = self.reader.prefix_forward(length);
        let c = self.reader.peek();
        if !chars::is_nul_blank_or_line_break(c) {
            return Err(ScanError::new(
                SCANNING_DIRECTIVE,
                start_mark,
                format!(
                    "expected alphabetic or numeric character, but found {}",
                    chars::describe_char(c)
                ),
                self.reader.mark(),
            ));
        }
        Ok(value)
    }

    fn scan_yaml_directive_value(&mut self, start_mark: Option<Mark>) -> Result<DirectiveValue> {
        while self.reader.peek() == ' ' {
            self.reader.forward(1);
        }
        let major = self.scan_yaml_directive_number(start_mark)?;
        let c = self.reader.peek();
        if c != '.' {
            return Err(ScanError::new(
                SCANNING_DIRECTIVE,
                start_mark,
                format!(
                    "expected a digit or '.', but found {}",
                    chars::describe_char(c)
                ),
                self.reader.mark(),
            ));
        }
        self.reader.forward(1);
        let minor = self.scan_yaml_directive_number(start_mark)?;
        let c = self.reader.peek();
        if !chars::is_nul_blank_or_line_break(c) {
            return Err(ScanError::new(
                SCANNING_DIRECTIVE,
                start_mark,
                format!(
                    "expected a digit or ' ', but found {}",
                    chars::describe_char(c)
                ),
                self.reader.mark(),
            ));
        }
        Ok(DirectiveValue::Yaml { major, minor })
    }

    fn scan_yaml_directive_number(&mut self, start_mark: Option<Mark>) -> Result<u32> {
        let c = self.reader.peek();
        if !c.is_ascii_digit() {
            return Err(ScanError::new(
                SCANNING_DIRECTIVE,
                start_mark,
                format!("expected a digit, but found {}", chars::describe_char(c)),
                self.reader.mark(),
            ));
        }
        let mut length = 0;
        while self.reader.peek_at(length).is_ascii_digit() {
            length += 1;
        }
        let number = self.reader.prefix_forward(length);
        if length > 3 {
            return Err(ScanError::new(
                "while scanning a YAML directive",
                start_mark,
                format!("found a number which cannot represent a valid version: {number}"),
                self.reader.mark(),
            ));
        }
        let value = number
            .chars()
            .filter_map(|digit| digit.to_digit(10))
            .fold(0, |n, digit| n * 10 + digit);
        Ok(value)
    }

    fn scan_tag_directive_value(&mut self, start_mark: Option<Mark>) -> Result<DirectiveValue> {
        while self.reader.peek() == ' ' {
            self.reader.forward(1);
        }
        let handle = self.scan_tag_directive_handle(start_mark)?;
        while self.reader.peek() == ' ' {
            self.reader.forward(1);
        }
        let prefix = self.scan_tag_directive_prefix(start_mark)?;
        Ok(DirectiveValue::Tag { handle, prefix })
    }

    fn scan_tag_directive_handle(&mut self, start_mark: Option<Mark>) -> Result<String> {
        let value = self.scan_tag_handle("directive", start_mark)?;
        let c = self.reader.peek();
        if c != ' ' {
            return Err(ScanError::new(
                SCANNING_DIRECTIVE,
                start_mark,
                format!("expected ' ', but found {}", chars::describe_char(c)),
                self.reader.mark(),
            ));
        }
        Ok(value)
    }

    fn scan_tag_directive_prefix(&mut self, start_mark: Option<Mark>) -> Result<String> {
        let value = self.scan_tag_uri("directive", true, start_mark)?;
        let c = self.reader.peek();
        if !chars::is_nul_blank_or_line_break(c) {
            return Err(ScanError::new(
                SCANNING_DIRECTIVE,
                start_mark,
                format!("expected ' ', but found {}", chars::describe_char(c)),
                self.reader.mark(),
            ));
        }
        Ok(value)
    }

    /// Consume the remainder of a directive line, where only spaces and a
    /// comment may appear before the line break.
    fn scan_directive_ignored_line(&mut self, start_mark: Option<Mark>) -> Result<Option<Token>> {
        while self.reader.peek() == ' ' {
            self.reader.forward(1);
        }
        let mut comment = None;
        if self.reader.peek() == '#' {
            let token = self.scan_comment(CommentKind::Inline);
            if self.opts.parse_comments {
                comment = Some(token);
            }
        }
        let c = self.reader.peek();
        if self.scan_line_break().is_none() && c != '\0' {
            return Err(ScanError::new(
                SCANNING_DIRECTIVE,
                start_mark,
                format!(
                    "expected a comment or a line break, but found {}",
                    chars::describe_char(c)
                ),
                self.reader.mark(),
            ));
        }
        Ok(comment)
    }

    // Anchors, aliases, and tags

    fn scan_anchor(&mut self, is_anchor: bool) -> Result<Token> {
        let start_mark = self.reader.mark();
        let name = if is_anchor { "anchor" } else { "alias" };
        self.reader.forward(1);
        let mut length = 0;
        while chars::is_anchor_name_char(self.reader.peek_at(length)) {
            length += 1;
        }
        if length == 0 {
            return Err(ScanError::new(
                format!("while scanning an {name}"),
                start_mark,
                format!(
                    "unexpected character found {}",
                    chars::describe_char(self.reader.peek_at(length))
                ),
                self.reader.mark(),
            ));
        }
        let value = self.reader.prefix_forward(length);
        let c = self.reader.peek();
        if !chars::is_anchor_follow_char(c) {
            return Err(ScanError::new(
                format!("while scanning an {name}"),
                start_mark,
                format!("unexpected character found {}", chars::describe_char(c)),
                self.reader.mark(),
            ));
        }
        let end_mark = self.reader.mark();
        let kind = if is_anchor {
            TokenKind::Anchor(value)
        } else {
            TokenKind::Alias(value)
        };
        Ok(Token::new(kind, start_mark, end_mark))
    }

    /// Scan a tag property: verbatim `!<uri>`, non-specific `!`, or
    /// shorthand `!suffix` / `!handle!suffix`.
    fn scan_tag(&mut self) -> Result<Token> {
        let start_mark = self.reader.mark();
        let c = self.reader.peek_at(1);
        let handle;
        let suffix;
        if c == '<' {
            self.reader.forward(2);
            suffix = self.scan_tag_uri("tag", true, start_mark)?;
            let c = self.reader.peek();
            if c != '>' {
                return Err(ScanError::new(
                    "while scanning a tag",
                    start_mark,
                    format!("expected '>', but found {}", chars::describe_char(c)),
                    self.reader.mark(),
                ));
            }
            handle = None;
            self.reader.forward(1);
        } else if chars::is_nul_blank_tab_or_line_break(c) {
            handle = None;
            suffix = "!".to_string();
            self.reader.forward(1);
        } else {
            // Look ahead for a second '!' to tell !suffix from
            // !handle!suffix.
            let mut length = 1;
            let mut c = c;
            let mut use_handle = false;
            while !chars::is_nul_blank_or_line_break(c) {
                if c == '!' {
                    use_handle = true;
                    break;
                }
                length += 1;
                c = self.reader.peek_at(length);
            }
            if use_handle {
                handle = Some(self.scan_tag_handle("tag", start_mark)?);
            } else {
                handle = Some("!".to_string());
                self.reader.forward(1);
            }
            suffix = self.scan_tag_uri("tag", false, start_mark)?;
        }
        let c = self.reader.peek();
        if !chars::is_nul_blank_or_line_break(c) {
            return Err(ScanError::new(
                "while scanning a tag",
                start_mark,
                format!("expected ' ', but found {}", chars::describe_char(c)),
                self.reader.mark(),
            ));
        }
        let end_mark = self.reader.mark();
        Ok(Token::new(
            TokenKind::Tag { handle, suffix },
            start_mark,
            end_mark,
        ))
    }

    fn scan_tag_handle(&mut self, name: &str, start_mark: Option<Mark>) -> Result<String> {
        let c = self.reader.peek();
        if c != '!' {
            return Err(ScanError::new(
                format!("while scanning a {name}"),
                start_mark,
                format!("expected '!', but found {}", chars::describe_char(c)),
                self.reader.mark(),
            ));
        }
        let mut length = 1;
        let mut c = self.reader.peek_at(length);
        if c != ' ' {
            while chars::is_word_char(c) {
                length += 1;
                c = self.reader.peek_at(length);
            }
            // A handle with a name needs its closing '!'.
            if c != '!' {
                self.reader.forward(length);
                return Err(ScanError::new(
                    format!("while scanning a {name}"),
                    start_mark,
                    format!("expected '!', but found {}", chars::describe_char(c)),
                    self.reader.mark(),
                ));
            }
            length += 1;
        }
        Ok(self.reader.prefix_forward(length))
    }

    fn scan_tag_uri(
        &mut self,
        name: &str,
        in_prefix: bool,
        start_mark: Option<Mark>,
    ) -> Result<String> {
        let mut chunks = String::new();
        let mut length = 0;
        let mut c = self.reader.peek_at(length);
        while chars::is_uri_char(c, in_prefix) {
            if c == '%' {
                chunks.push_str(&self.reader.prefix_forward(length));
                length = 0;
                chunks.push_str(&self.scan_uri_escapes(name, start_mark)?);
            } else {
                length += 1;
            }
            c = self.reader.peek_at(length);
        }
        if length != 0 {
            chunks.push_str(&self.reader.prefix_forward(length));
        }
        if chunks.is_empty() {
            return Err(ScanError::new(
                format!("while scanning a {name}"),
                start_mark,
                format!("expected URI, but found {}", chars::describe_char(c)),
                self.reader.mark(),
            ));
        }
        Ok(chunks)
    }

    /// Decode a run of `%XX` escapes as one UTF-8 byte sequence.
    fn scan_uri_escapes(&mut self, name: &str, start_mark: Option<Mark>) -> Result<String> {
        let beginning_mark = self.reader.mark();
        let mut bytes = Vec::new();
        while self.reader.peek() == '%' {
            self.reader.forward(1);
            let hex = self.reader.prefix(2);
            let code = if hex.chars().count() == 2 && hex.chars().all(|h| h.is_ascii_hexdigit()) {
                u8::from_str_radix(&hex, 16).ok()
            } else {
                None
            };
            let Some(code) = code else {
                return Err(ScanError::new(
                    format!("while scanning a {name}"),
                    start_mark,
                    format!(
                        "expected URI escape sequence of 2 hexadecimal numbers, but found {} and {}",
                        chars::describe_char(self.reader.peek()),
                        chars::describe_char(self.reader.peek_at(1))
                    ),
                    self.reader.mark(),
                ));
            };
            bytes.push(code);
            self.reader.forward(2);
        }
        String::from_utf8(bytes).map_err(|_| {
            ScanError::new(
                format!("while scanning a {name}"),
                start_mark,
                "expected URI escapes to decode to valid UTF-8",
                beginning_mark,
            )
        })
    }

    // Block scalars

    fn scan_block_scalar(&mut self, style: ScalarStyle) -> Result<Vec<Token>> {
        let folded = style == ScalarStyle::Folded;
        let mut tokens = Vec::new();
        let mut chunks = String::new();
        let start_mark = self.reader.mark();
        self.reader.forward(1);
        let chomping = self.scan_block_scalar_indicators(start_mark)?;
        if let Some(comment) = self.scan_block_scalar_ignored_line(start_mark)? {
            tokens.push(comment);
        }

        let min_indent = (self.indent + 1).max(1);
        let block_indent;
        let mut breaks;
        let mut end_mark;
        if let Some(increment) = chomping.increment {
            block_indent = min_indent + i64::from(increment) - 1;
            let (b, mark) = self.scan_block_scalar_breaks(block_indent);
            breaks = b;
            end_mark = mark;
        } else {
            let (b, max_indent, mark) = self.scan_block_scalar_indentation();
            breaks = b;
            end_mark = mark;
            block_indent = min_indent.max(max_indent as i64);
        }

        if (self.reader.column() as i64) < block_indent && self.indent != self.reader.column() as i64
        {
            return Err(ScanError::new(
                SCANNING_BLOCK_SCALAR,
                start_mark,
                format!(
                    "the leading empty lines contain more spaces ({block_indent}) than the first non-empty line"
                ),
                self.reader.mark(),
            ));
        }

        let mut line_break = None;
        while self.reader.column() as i64 == block_indent && self.reader.peek() != '\0' {
            chunks.push_str(&breaks);
            let leading_non_space = !matches!(self.reader.peek(), ' ' | '\t');
            let mut length = 0;
            while !chars::is_nul_or_line_break(self.reader.peek_at(length)) {
                length += 1;
            }
            chunks.push_str(&self.reader.prefix_forward(length));
            line_break = self.scan_line_break();
            let (b, mark) = self.scan_block_scalar_breaks(block_indent);
            breaks = b;
            end_mark = mark;
            if self.reader.column() as i64 == block_indent && self.reader.peek() != '\0' {
                // Fold a lone '\n' between two non-indented content lines
                // into a space; every other break is kept verbatim.
                if folded
                    && line_break == Some('\n')
                    && leading_non_space
                    && !matches!(self.reader.peek(), ' ' | '\t')
                {
                    if breaks.is_empty() {
                        chunks.push(' ');
                    }
                } else if let Some(c) = line_break {
                    chunks.push(c);
                }
            } else {
                break;
            }
        }

        // Chomp the tail.
        if chomping.chomp != Chomp::Strip
            && let Some(c) = line_break
        {
            chunks.push(c);
        }
        if chomping.chomp == Chomp::Keep {
            chunks.push_str(&breaks);
        }

        tokens.push(Token::new(
            TokenKind::Scalar {
                value: chunks,
                plain: false,
                style,
            },
            start_mark,
            end_mark,
        ));
        Ok(tokens)
    }

    /// Scan the chomping and indentation indicators of a block scalar
    /// header, in either order.
    fn scan_block_scalar_indicators(&mut self, start_mark: Option<Mark>) -> Result<Chomping> {
        let mut chomp = Chomp::Clip;
        let mut increment = None;
        let c = self.reader.peek();
        if c == '-' || c == '+' {
            chomp = if c == '+' { Chomp::Keep } else { Chomp::Strip };
            self.reader.forward(1);
            if let Some(digit) = self.reader.peek().to_digit(10) {
                if digit == 0 {
                    return Err(ScanError::new(
                        SCANNING_BLOCK_SCALAR,
                        start_mark,
                        "expected indentation indicator in the range 1-9, but found 0",
                        self.reader.mark(),
                    ));
                }
                increment = Some(digit);
                self.reader.forward(1);
            }
        } else if let Some(digit) = c.to_digit(10) {
            if digit == 0 {
                return Err(ScanError::new(
                    SCANNING_BLOCK_SCALAR,
                    start_mark,
                    "expected indentation indicator in the range 1-9, but found 0",
                    self.reader.mark(),
                ));
            }
            increment = Some(digit);
            self.reader.forward(1);
            let c = self.reader.peek();
            if c == '-' || c == '+' {
                chomp = if c == '+' { Chomp::Keep } else { Chomp::Strip };
                self.reader.forward(1);
            }
        }
        let c = self.reader.peek();
        if !chars::is_nul_blank_or_line_break(c) {
            return Err(ScanError::new(
                SCANNING_BLOCK_SCALAR,
                start_mark,
                format!(
                    "expected chomping or indentation indicators, but found {}",
                    chars::describe_char(c)
                ),
                self.reader.mark(),
            ));
        }
        Ok(Chomping { chomp, increment })
    }

    /// Consume the rest of the block scalar header line, where only spaces
    /// and a comment may appear.
    fn scan_block_scalar_ignored_line(&mut self, start_mark: Option<Mark>) -> Result<Option<Token>> {
        while self.reader.peek() == ' ' {
            self.reader.forward(1);
        }
        let mut comment = None;
        if self.reader.peek() == '#' {
            let token = self.scan_comment(CommentKind::Inline);
            if self.opts.parse_comments {
                comment = Some(token);
            }
        }
        let c = self.reader.peek();
        if self.scan_line_break().is_none() && c != '\0' {
            return Err(ScanError::new(
                SCANNING_BLOCK_SCALAR,
                start_mark,
                format!(
                    "expected a comment or a line break, but found {}",
                    chars::describe_char(c)
                ),
                self.reader.mark(),
            ));
        }
        Ok(comment)
    }

    /// Auto-detect the block scalar indentation: scan through blank lines,
    /// tracking the deepest leading-space column reached.
    fn scan_block_scalar_indentation(&mut self) -> (String, usize, Option<Mark>) {
        let mut chunks = String::new();
        let mut max_indent = 0;
        let mut end_mark = self.reader.mark();
        loop {
            let c = self.reader.peek();
            if c == ' ' {
                self.reader.forward(1);
                max_indent = max_indent.max(self.reader.column());
            } else if c == '\r' || chars::is_line_break(c) {
                if let Some(line_break) = self.scan_line_break() {
                    chunks.push(line_break);
                }
                end_mark = self.reader.mark();
            } else {
                break;
            }
        }
        (chunks, max_indent, end_mark)
    }

    /// Consume line breaks and up to `indent` leading spaces per line,
    /// returning the accumulated breaks.
    fn scan_block_scalar_breaks(&mut self, indent: i64) -> (String, Option<Mark>) {
        let mut chunks = String::new();
        let mut end_mark = self.reader.mark();
        let mut column = self.reader.column() as i64;
        while column < indent && self.reader.peek() == ' ' {
            self.reader.forward(1);
            column += 1;
        }
        while let Some(line_break) = self.scan_line_break() {
            chunks.push(line_break);
            end_mark = self.reader.mark();
            let mut column = self.reader.column() as i64;
            while column < indent && self.reader.peek() == ' ' {
                self.reader.forward(1);
                column += 1;
            }
        }
        (chunks, end_mark)
    }

    // Flow scalars

    fn scan_flow_scalar(&mut self, style: ScalarStyle) -> Result<Token> {
        let double_quoted = style == ScalarStyle::DoubleQuoted;
        let mut chunks = String::new();
        let start_mark = self.reader.mark();
        let quote = self.reader.peek();
        self.reader.forward(1);
        chunks.push_str(&self.scan_flow_scalar_non_spaces(double_quoted, start_mark)?);
        while self.reader.peek() != quote {
            chunks.push_str(&self.scan_flow_scalar_spaces(start_mark)?);
            chunks.push_str(&self.scan_flow_scalar_non_spaces(double_quoted, start_mark)?);
        }
        self.reader.forward(1);
        let end_mark = self.reader.mark();
        Ok(Token::new(
            TokenKind::Scalar {
                value: chunks,
                plain: false,
                style,
            },
            start_mark,
            end_mark,
        ))
    }

    fn scan_flow_scalar_non_spaces(
        &mut self,
        double_quoted: bool,
        start_mark: Option<Mark>,
    ) -> Result<String> {
        let mut chunks = String::new();
        loop {
            let mut length = 0;
            loop {
                let c = self.reader.peek_at(length);
                if chars::is_nul_blank_tab_or_line_break(c) || matches!(c, '\'' | '"' | '\\') {
                    break;
                }
                length += 1;
            }
            if length != 0 {
                chunks.push_str(&self.reader.prefix_forward(length));
            }
            let c = self.reader.peek();
            if !double_quoted && c == '\'' && self.reader.peek_at(1) == '\'' {
                chunks.push('\'');
                self.reader.forward(2);
            } else if (double_quoted && c == '\'') || (!double_quoted && matches!(c, '"' | '\\')) {
                chunks.push(c);
                self.reader.forward(1);
            } else if double_quoted && c == '\\' {
                self.reader.forward(1);
                let c = self.reader.peek();
                if let Some(replacement) = chars::escape_replacement(c) {
                    chunks.push(replacement);
                    self.reader.forward(1);
                } else if let Some(code_length) = chars::escape_code_length(c) {
                    self.reader.forward(1);
                    let hex = self.reader.prefix(code_length);
                    if hex.chars().count() != code_length
                        || !hex.chars().all(|h| h.is_ascii_hexdigit())
                    {
                        return Err(ScanError::new(
                            SCANNING_DOUBLE_QUOTED,
                            start_mark,
                            format!(
                                "expected escape sequence of {code_length} hexadecimal numbers, but found: {hex}"
                            ),
                            self.reader.mark(),
                        ));
                    }
                    let decimal = u32::from_str_radix(&hex, 16).unwrap_or(0);
                    let Some(decoded) = char::from_u32(decimal) else {
                        return Err(ScanError::new(
                            SCANNING_DOUBLE_QUOTED,
                            start_mark,
                            format!("found unknown escape character {hex}"),
                            self.reader.mark(),
                        ));
                    };
                    chunks.push(decoded);
                    self.reader.forward(code_length);
                } else if self.scan_line_break().is_some() {
                    // An escaped line break is folded away entirely.
                    chunks.push_str(&self.scan_flow_scalar_breaks(start_mark)?);
                } else {
                    return Err(ScanError::new(
                        SCANNING_DOUBLE_QUOTED,
                        start_mark,
                        format!("found unknown escape character {}", chars::describe_char(c)),
                        self.reader.mark(),
                    ));
                }
            } else {
                return Ok(chunks);
            }
        }
    }

    fn scan_flow_scalar_spaces(&mut self, start_mark: Option<Mark>) -> Result<String> {
        let mut chunks = String::new();
        let mut length = 0;
        while matches!(self.reader.peek_at(length), ' ' | '\t') {
            length += 1;
        }
        let whitespaces = self.reader.prefix_forward(length);
        if self.reader.peek() == '\0' {
            return Err(ScanError::new(
                SCANNING_QUOTED,
                start_mark,
                "found unexpected end of stream",
                self.reader.mark(),
            ));
        }
        if let Some(line_break) = self.scan_line_break() {
            let breaks = self.scan_flow_scalar_breaks(start_mark)?;
            if line_break != '\n' {
                chunks.push(line_break);
            } else if breaks.is_empty() {
                chunks.push(' ');
            }
            chunks.push_str(&breaks);
        } else {
            chunks.push_str(&whitespaces);
        }
        Ok(chunks)
    }

    fn scan_flow_scalar_breaks(&mut self, start_mark: Option<Mark>) -> Result<String> {
        let mut chunks = String::new();
        loop {
            // Quoted scalars are exempt from indentation rules, but a
            // document separator still ends them.
            if self.at_document_boundary() {
                return Err(ScanError::new(
                    SCANNING_QUOTED,
                    start_mark,
                    "found unexpected document separator",
                    self.reader.mark(),
                ));
            }
            while matches!(self.reader.peek(), ' ' | '\t') {
                self.reader.forward(1);
            }
            match self.scan_line_break() {
                Some(line_break) => chunks.push(line_break),
                None => return Ok(chunks),
            }
        }
    }

    // Plain scalars

    fn scan_plain(&mut self) -> Token {
        let mut chunks = String::new();
        let start_mark = self.reader.mark();
        let mut end_mark = start_mark;
        let plain_indent = self.indent + 1;
        let mut spaces = String::new();
        loop {
            if self.reader.peek() == '#' {
                break;
            }
            let mut length = 0;
            loop {
                let c = self.reader.peek_at(length);
                let next = self.reader.peek_at(length + 1);
                if chars::is_nul_blank_tab_or_line_break(c)
                    || (c == ':'
                        && (chars::is_nul_blank_tab_or_line_break(next)
                            || (self.flow_level != 0
                                && matches!(next, ',' | '[' | ']' | '{' | '}'))))
                    || (self.flow_level != 0 && matches!(c, ',' | '[' | ']' | '{' | '}'))
                {
                    break;
                }
                length += 1;
            }
            if length == 0 {
                break;
            }
            self.allow_simple_key = false;
            chunks.push_str(&spaces);
            chunks.push_str(&self.reader.prefix_forward(length));
            end_mark = self.reader.mark();
            spaces = self.scan_plain_spaces();
            if spaces.is_empty()
                || self.reader.peek() == '#'
                || (self.flow_level == 0 && (self.reader.column() as i64) < plain_indent)
            {
                break;
            }
        }
        Token::new(
            TokenKind::Scalar {
                value: chunks,
                plain: true,
                style: ScalarStyle::Plain,
            },
            start_mark,
            end_mark,
        )
    }

    /// Fold the whitespace between two chunks of a plain scalar. Returns
    /// the empty string when the scalar ends instead.
    fn scan_plain_spaces(&mut self) -> String {
        let mut length = 0;
        while matches!(self.reader.peek_at(length), ' ' | '\t') {
            length += 1;
        }
        let whitespaces = self.reader.prefix_forward(length);
        let Some(line_break) = self.scan_line_break() else {
            return whitespaces;
        };
        self.allow_simple_key = true;
        if self.at_document_boundary() {
            return String::new();
        }
        if self.opts.parse_comments && self.at_end_of_plain() {
            return String::new();
        }
        let mut breaks = String::new();
        loop {
            if self.reader.peek() == ' ' {
                self.reader.forward(1);
            } else if let Some(b) = self.scan_line_break() {
                breaks.push(b);
                if self.at_document_boundary() {
                    return String::new();
                }
            } else {
                break;
            }
        }
        if line_break != '\n' {
            let mut folded = String::new();
            folded.push(line_break);
            folded.push_str(&breaks);
            folded
        } else if breaks.is_empty() {
            " ".to_string()
        } else {
            breaks
        }
    }

    /// Look ahead past whitespace to decide whether a multi-line plain
    /// scalar has ended. Stops trailing comments and blank lines from being
    /// folded into the scalar when comment tokens are enabled.
    fn at_end_of_plain(&self) -> bool {
        let mut ws_length = 0;
        let mut ws_column = self.reader.column();
        loop {
            let c = self.reader.peek_at(ws_length);
            if c == '\0' || !chars::is_nul_blank_tab_or_line_break(c) {
                break;
            }
            ws_length += 1;
            if !chars::is_line_break(c)
                && (c != '\r' || self.reader.peek_at(ws_length) != '\n')
                && c != BOM
            {
                ws_column += 1;
            } else {
                ws_column = 0;
            }
        }
        if self.reader.peek_at(ws_length) == '#'
            || self.reader.peek_at(ws_length + 1) == '\0'
            || (self.flow_level == 0 && (ws_column as i64) < self.indent)
        {
            return true;
        }
        if self.flow_level == 0 {
            let mut extra = 1;
            loop {
                let c = self.reader.peek_at(ws_length + extra);
                if c == '\0' || chars::is_nul_blank_tab_or_line_break(c) {
                    break;
                }
                if c == ':'
                    && chars::is_nul_blank_tab_or_line_break(
                        self.reader.peek_at(ws_length + extra + 1),
                    )
                {
                    return true;
                }
                extra += 1;
            }
        }
        false
    }
}

impl Iterator for Scanner {
    type Item = Result<Token>;

    /// Yields tokens through StreamEnd, then one terminal error if scanning
    /// failed, then fuses.
    fn next(&mut self) -> Option<Self::Item> {
        if self.fused {
            return None;
        }
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.fused = true;
                None
            }
            Err(err) => {
                self.fused = true;
                Some(Err(err))
            }
        }
    }
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("indent", &self.indent)
            .field("flow_level", &self.flow_level)
            .field("tokens_taken", &self.tokens_taken)
            .field("staged", &self.tokens.len())
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
