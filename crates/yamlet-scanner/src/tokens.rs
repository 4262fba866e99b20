//! Token types produced by the scanner.

use yamlet_reader::Mark;

/// Presentation style of a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarStyle {
    /// Unquoted: `hello`
    Plain,
    /// `'hello'`
    SingleQuoted,
    /// `"hello"`
    DoubleQuoted,
    /// Block scalar introduced by `|`
    Literal,
    /// Block scalar introduced by `>`
    Folded,
}

/// How a comment relates to the surrounding tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentKind {
    /// Trails other content on the same line.
    Inline,
    /// Occupies its own line.
    Block,
    /// An empty line, kept so round-tripping tools can preserve spacing.
    BlankLine,
}

/// Structured payload of a `%YAML` or `%TAG` directive.
///
/// Directives with any other name are tokenized without a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveValue {
    /// `%YAML <major>.<minor>`
    Yaml { major: u32, minor: u32 },
    /// `%TAG <handle> <prefix>`
    Tag { handle: String, prefix: String },
}

/// The kind of a token, with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Stream and document boundaries
    /// Start of the token stream.
    StreamStart,
    /// End of the token stream.
    StreamEnd,
    /// `---`
    DocumentStart,
    /// `...`
    DocumentEnd,
    /// `%NAME ...`
    Directive {
        /// Directive name (the text after `%`).
        name: String,
        /// Parsed value for `%YAML` and `%TAG`; `None` for unknown names.
        value: Option<DirectiveValue>,
    },

    // Block collections
    /// Start of an indentation-delimited sequence.
    BlockSequenceStart,
    /// Start of an indentation-delimited mapping.
    BlockMappingStart,
    /// End of a block collection (one per popped indentation level).
    BlockEnd,
    /// `-` introducing a block sequence entry.
    BlockEntry,

    // Flow collections
    /// `[`
    FlowSequenceStart,
    /// `]`
    FlowSequenceEnd,
    /// `{`
    FlowMappingStart,
    /// `}`
    FlowMappingEnd,
    /// `,` separating flow entries.
    FlowEntry,

    // Mapping structure
    /// Introduces a mapping key; inserted retroactively for simple keys.
    Key,
    /// `:`
    Value,

    // Node properties and content
    /// `*name`
    Alias(String),
    /// `&name`
    Anchor(String),
    /// Tag property: `!suffix`, `!handle!suffix`, `!<uri>`, or bare `!`.
    Tag {
        /// Tag handle; `None` for verbatim and non-specific tags.
        handle: Option<String>,
        /// Tag suffix, or the verbatim URI.
        suffix: String,
    },
    /// Scalar content with its presentation style.
    Scalar {
        /// Content after escape processing and folding.
        value: String,
        /// Whether the scalar was written without quotes or block markers.
        plain: bool,
        /// Presentation style.
        style: ScalarStyle,
    },

    /// `# ...`, emitted only when comment parsing is enabled.
    Comment {
        /// Placement of the comment.
        kind: CommentKind,
        /// Comment text, without the leading `#`.
        value: String,
    },
}

impl TokenKind {
    /// Whether this token is a comment.
    pub fn is_comment(&self) -> bool {
        matches!(self, TokenKind::Comment { .. })
    }

    /// Whether this token opens a flow collection.
    pub fn is_flow_start(&self) -> bool {
        matches!(
            self,
            TokenKind::FlowSequenceStart | TokenKind::FlowMappingStart
        )
    }

    /// Whether this token closes a flow collection.
    pub fn is_flow_end(&self) -> bool {
        matches!(self, TokenKind::FlowSequenceEnd | TokenKind::FlowMappingEnd)
    }
}

/// A token with its position in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token, with payload.
    pub kind: TokenKind,
    /// Where the token begins, when marks are enabled.
    pub start_mark: Option<Mark>,
    /// Where the token ends, when marks are enabled.
    pub end_mark: Option<Mark>,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, start_mark: Option<Mark>, end_mark: Option<Mark>) -> Self {
        Self {
            kind,
            start_mark,
            end_mark,
        }
    }
}
