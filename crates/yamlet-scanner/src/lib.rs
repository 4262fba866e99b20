//! A scanner for YAML: turns a stream of code points into lexical tokens.
//!
//! The scanner is pull-based: each call to [`Scanner::next_token`] does just
//! enough work to produce the next token in document order. It owns the
//! indentation and flow-context state machine, simple-key bookkeeping, and
//! the block/flow/plain scalar sub-scanners. Building events or documents out
//! of the token sequence is a downstream concern.

pub use yamlet_reader::{Mark, Reader};

mod chars;

mod error;
pub use error::{Result, ScanError};

mod tokens;
pub use tokens::{CommentKind, DirectiveValue, ScalarStyle, Token, TokenKind};

mod scanner;
pub use scanner::{ScanOptions, Scanner};
