//! Character classes and escape tables used by the scanner.
//!
//! The groupings mirror the YAML character productions: most sub-scanners
//! consume "anything until NUL, blank, tab, or line break" with a few extra
//! excluded characters.

/// Byte order mark, skipped at the start of the stream.
pub(crate) const BOM: char = '\u{FEFF}';

/// A line break other than `\r`: `\n`, NEL, LS, or PS.
///
/// `\r` is handled separately so `\r\n` can collapse to a single break.
#[inline]
pub(crate) fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// NUL, `\r`, or a line break.
#[inline]
pub(crate) fn is_nul_or_line_break(c: char) -> bool {
    c == '\0' || c == '\r' || is_line_break(c)
}

/// NUL, space, `\r`, or a line break.
#[inline]
pub(crate) fn is_nul_blank_or_line_break(c: char) -> bool {
    c == ' ' || is_nul_or_line_break(c)
}

/// NUL, space, tab, `\r`, or a line break.
#[inline]
pub(crate) fn is_nul_blank_tab_or_line_break(c: char) -> bool {
    c == '\t' || is_nul_blank_or_line_break(c)
}

/// ASCII alphanumeric, `-`, or `_` (directive and tag-handle names).
#[inline]
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Characters acceptable in a tag URI, before percent-decoding.
///
/// A `%TAG` prefix additionally allows `,`, `[`, and `]`; a tag suffix does
/// not, since those terminate the tag in flow context.
#[inline]
pub(crate) fn is_uri_char(c: char, in_prefix: bool) -> bool {
    is_word_char(c)
        || matches!(
            c,
            ';' | '/'
                | '?'
                | ':'
                | '@'
                | '&'
                | '='
                | '+'
                | '$'
                | '.'
                | '!'
                | '~'
                | '*'
                | '\''
                | '('
                | ')'
                | '%'
        )
        || (in_prefix && matches!(c, ',' | '[' | ']'))
}

/// Characters allowed in anchor and alias names.
///
/// Following RFC-0003, names exclude flow indicators plus `/`, `.`, `*`,
/// and `&` on top of whitespace and line breaks.
#[inline]
pub(crate) fn is_anchor_name_char(c: char) -> bool {
    !is_nul_blank_tab_or_line_break(c)
        && !matches!(c, ',' | '[' | ']' | '{' | '}' | '/' | '.' | '*' | '&')
}

/// Characters allowed to immediately follow an anchor or alias name.
#[inline]
pub(crate) fn is_anchor_follow_char(c: char) -> bool {
    is_nul_blank_tab_or_line_break(c) || matches!(c, '?' | ':' | ',' | ']' | '}' | '%' | '@' | '`')
}

/// Single-character replacement for a double-quoted escape, if `c` names one.
pub(crate) fn escape_replacement(c: char) -> Option<char> {
    match c {
        '0' => Some('\0'),
        'a' => Some('\u{7}'),
        'b' => Some('\u{8}'),
        't' | '\t' => Some('\t'),
        'n' => Some('\n'),
        'v' => Some('\u{B}'),
        'f' => Some('\u{C}'),
        'r' => Some('\r'),
        'e' => Some('\u{1B}'),
        ' ' => Some(' '),
        '"' => Some('"'),
        '/' => Some('/'),
        '\\' => Some('\\'),
        'N' => Some('\u{85}'),
        '_' => Some('\u{A0}'),
        'L' => Some('\u{2028}'),
        'P' => Some('\u{2029}'),
        _ => None,
    }
}

/// Number of hex digits expected after a `\x`, `\u`, or `\U` escape.
pub(crate) fn escape_code_length(c: char) -> Option<usize> {
    match c {
        'x' => Some(2),
        'u' => Some(4),
        'U' => Some(8),
        _ => None,
    }
}

/// Render a character for error messages.
pub(crate) fn describe_char(c: char) -> String {
    match c {
        '\0' => "'\\0' (end of stream)".to_string(),
        '\t' => "'\\t' (TAB)".to_string(),
        '\n' => "'\\n'".to_string(),
        '\r' => "'\\r'".to_string(),
        _ => format!("'{}' ({})", c, c as u32),
    }
}
