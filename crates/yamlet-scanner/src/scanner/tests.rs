use super::*;

fn scan(source: &str) -> Vec<TokenKind> {
    scan_with(source, ScanOptions::new())
}

fn scan_with(source: &str, opts: ScanOptions) -> Vec<TokenKind> {
    Scanner::with_options(source, opts)
        .map(|token| token.expect("scan failed").kind)
        .collect()
}

fn scan_tokens(source: &str) -> Vec<Token> {
    Scanner::new(source)
        .map(|token| token.expect("scan failed"))
        .collect()
}

fn scan_err(source: &str) -> ScanError {
    let mut scanner = Scanner::new(source);
    loop {
        match scanner.next_token() {
            Ok(Some(_)) => {}
            Ok(None) => panic!("expected scanning {source:?} to fail"),
            Err(err) => return err,
        }
    }
}

fn plain(value: &str) -> TokenKind {
    TokenKind::Scalar {
        value: value.to_string(),
        plain: true,
        style: ScalarStyle::Plain,
    }
}

fn styled(value: &str, style: ScalarStyle) -> TokenKind {
    TokenKind::Scalar {
        value: value.to_string(),
        plain: false,
        style,
    }
}

#[test]
fn test_empty_stream() {
    assert_eq!(scan(""), vec![TokenKind::StreamStart, TokenKind::StreamEnd]);
}

#[test]
fn test_plain_scalar() {
    assert_eq!(
        scan("hello"),
        vec![TokenKind::StreamStart, plain("hello"), TokenKind::StreamEnd]
    );
}

#[test]
fn test_plain_scalar_folds_line_breaks() {
    assert_eq!(
        scan("foo\nbar"),
        vec![TokenKind::StreamStart, plain("foo bar"), TokenKind::StreamEnd]
    );
    assert_eq!(
        scan("foo\n\nbar"),
        vec![
            TokenKind::StreamStart,
            plain("foo\nbar"),
            TokenKind::StreamEnd
        ]
    );
}

#[test]
fn test_plain_scalar_with_embedded_colon() {
    assert_eq!(
        scan("a:b"),
        vec![TokenKind::StreamStart, plain("a:b"), TokenKind::StreamEnd]
    );
}

#[test]
fn test_block_mapping() {
    assert_eq!(
        scan("a: 1"),
        vec![
            TokenKind::StreamStart,
            TokenKind::BlockMappingStart,
            TokenKind::Key,
            plain("a"),
            TokenKind::Value,
            plain("1"),
            TokenKind::BlockEnd,
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_block_mapping_two_keys() {
    assert_eq!(
        scan("a: 1\nb: 2"),
        vec![
            TokenKind::StreamStart,
            TokenKind::BlockMappingStart,
            TokenKind::Key,
            plain("a"),
            TokenKind::Value,
            plain("1"),
            TokenKind::Key,
            plain("b"),
            TokenKind::Value,
            plain("2"),
            TokenKind::BlockEnd,
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_block_sequence() {
    assert_eq!(
        scan("- a\n- b"),
        vec![
            TokenKind::StreamStart,
            TokenKind::BlockSequenceStart,
            TokenKind::BlockEntry,
            plain("a"),
            TokenKind::BlockEntry,
            plain("b"),
            TokenKind::BlockEnd,
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_nested_block_mapping() {
    assert_eq!(
        scan("a:\n  b: c"),
        vec![
            TokenKind::StreamStart,
            TokenKind::BlockMappingStart,
            TokenKind::Key,
            plain("a"),
            TokenKind::Value,
            TokenKind::BlockMappingStart,
            TokenKind::Key,
            plain("b"),
            TokenKind::Value,
            plain("c"),
            TokenKind::BlockEnd,
            TokenKind::BlockEnd,
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_mapping_inside_sequence_entry() {
    assert_eq!(
        scan("- a: 1"),
        vec![
            TokenKind::StreamStart,
            TokenKind::BlockSequenceStart,
            TokenKind::BlockEntry,
            TokenKind::BlockMappingStart,
            TokenKind::Key,
            plain("a"),
            TokenKind::Value,
            plain("1"),
            TokenKind::BlockEnd,
            TokenKind::BlockEnd,
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_explicit_key() {
    assert_eq!(
        scan("? a\n: b"),
        vec![
            TokenKind::StreamStart,
            TokenKind::BlockMappingStart,
            TokenKind::Key,
            plain("a"),
            TokenKind::Value,
            plain("b"),
            TokenKind::BlockEnd,
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_document_markers() {
    assert_eq!(
        scan("---\na\n...\n"),
        vec![
            TokenKind::StreamStart,
            TokenKind::DocumentStart,
            plain("a"),
            TokenKind::DocumentEnd,
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_multiple_documents() {
    assert_eq!(
        scan("---\na\n---\nb\n"),
        vec![
            TokenKind::StreamStart,
            TokenKind::DocumentStart,
            plain("a"),
            TokenKind::DocumentStart,
            plain("b"),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_block_ends_unwind_in_lifo_order() {
    let kinds = scan("a:\n  b:\n    c: 1");
    let starts = kinds
        .iter()
        .filter(|k| {
            matches!(
                k,
                TokenKind::BlockMappingStart | TokenKind::BlockSequenceStart
            )
        })
        .count();
    let ends = kinds
        .iter()
        .filter(|k| matches!(k, TokenKind::BlockEnd))
        .count();
    assert_eq!(starts, 3);
    assert_eq!(starts, ends);
    // All three ends are pending at end of input and come out innermost
    // first, right before the stream end.
    assert_eq!(
        &kinds[kinds.len() - 4..],
        &[
            TokenKind::BlockEnd,
            TokenKind::BlockEnd,
            TokenKind::BlockEnd,
            TokenKind::StreamEnd
        ]
    );
}

#[test]
fn test_leading_byte_order_mark_is_skipped() {
    let tokens = scan_tokens("\u{FEFF}abc");
    assert_eq!(tokens[1].kind, plain("abc"));
    let mark = tokens[1].start_mark.unwrap();
    assert_eq!((mark.line, mark.column), (0, 0));
}

// Flow collections

#[test]
fn test_flow_sequence() {
    assert_eq!(
        scan("[1, 2]"),
        vec![
            TokenKind::StreamStart,
            TokenKind::FlowSequenceStart,
            plain("1"),
            TokenKind::FlowEntry,
            plain("2"),
            TokenKind::FlowSequenceEnd,
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_flow_sequence_trailing_comma() {
    assert_eq!(
        scan("[1,2,]"),
        vec![
            TokenKind::StreamStart,
            TokenKind::FlowSequenceStart,
            plain("1"),
            TokenKind::FlowEntry,
            plain("2"),
            TokenKind::FlowEntry,
            TokenKind::FlowSequenceEnd,
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_flow_mapping() {
    assert_eq!(
        scan("{a: 1}"),
        vec![
            TokenKind::StreamStart,
            TokenKind::FlowMappingStart,
            TokenKind::Key,
            plain("a"),
            TokenKind::Value,
            plain("1"),
            TokenKind::FlowMappingEnd,
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_nested_flow_collections() {
    assert_eq!(
        scan("[a, [b, c]]"),
        vec![
            TokenKind::StreamStart,
            TokenKind::FlowSequenceStart,
            plain("a"),
            TokenKind::FlowEntry,
            TokenKind::FlowSequenceStart,
            plain("b"),
            TokenKind::FlowEntry,
            plain("c"),
            TokenKind::FlowSequenceEnd,
            TokenKind::FlowSequenceEnd,
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_unterminated_flow_collection() {
    let err = scan_err("[1,2");
    assert_eq!(err.problem(), "found unexpected end of stream");
    assert_eq!(err.context(), Some("while scanning a flow collection"));
    assert_eq!(err.context_mark().unwrap().column, 0);
}

#[test]
fn test_unmatched_flow_end() {
    let err = scan_err("]");
    assert_eq!(err.problem(), "found ']' without a matching '['");
    let err = scan_err("a: 1\n}");
    assert_eq!(err.problem(), "found '}' without a matching '{'");
}

#[test]
fn test_flow_entry_outside_flow_context() {
    let err = scan_err("&a,b");
    assert_eq!(err.problem(), "flow entries are not allowed here");
}

// Simple keys

#[test]
fn test_required_key_going_stale_is_an_error() {
    let err = scan_err("a: 1\nb\nc: 2");
    assert_eq!(err.problem(), "could not find expected ':'");
    assert_eq!(err.context(), Some("while scanning a simple key"));
    // The error points at the unresolved key on line 2.
    assert_eq!(err.context_mark().unwrap().line, 1);
}

#[test]
fn test_required_key_unresolved_at_end_of_stream() {
    let err = scan_err("a: 1\nb");
    assert_eq!(err.problem(), "could not find expected ':'");
}

#[test]
fn test_value_without_key_where_none_allowed() {
    let err = scan_err("a: b: c");
    assert_eq!(err.problem(), "mapping values are not allowed here");
}

#[test]
fn test_long_flow_key_is_dropped_silently() {
    // An optional simple key past the staleness limit no longer produces
    // a Key token; the scan itself succeeds.
    let long = "x".repeat(MAX_SIMPLE_KEY_LENGTH + 10);
    let kinds = scan(&format!("[{long}\n]"));
    assert!(!kinds.contains(&TokenKind::Key));
}

// Anchors and aliases

#[test]
fn test_anchor_and_alias() {
    assert_eq!(
        scan("a: &x 1\nb: *x"),
        vec![
            TokenKind::StreamStart,
            TokenKind::BlockMappingStart,
            TokenKind::Key,
            plain("a"),
            TokenKind::Value,
            TokenKind::Anchor("x".to_string()),
            plain("1"),
            TokenKind::Key,
            plain("b"),
            TokenKind::Value,
            TokenKind::Alias("x".to_string()),
            TokenKind::BlockEnd,
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_anchor_name_accepts_alphanumerics() {
    assert_eq!(
        scan("&a1 b"),
        vec![
            TokenKind::StreamStart,
            TokenKind::Anchor("a1".to_string()),
            plain("b"),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_anchor_with_bad_follow_character() {
    let err = scan_err("&a[");
    assert_eq!(err.context(), Some("while scanning an anchor"));
    assert!(err.problem().starts_with("unexpected character found"));
}

#[test]
fn test_empty_anchor_name() {
    let err = scan_err("& a");
    assert_eq!(err.context(), Some("while scanning an anchor"));
}

// Block scalars

#[test]
fn test_literal_clip_chomping() {
    assert_eq!(
        scan("|\n a\n b\n\n"),
        vec![
            TokenKind::StreamStart,
            styled("a\nb\n", ScalarStyle::Literal),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_literal_strip_chomping() {
    assert_eq!(
        scan("|-\n a\n b\n\n"),
        vec![
            TokenKind::StreamStart,
            styled("a\nb", ScalarStyle::Literal),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_literal_keep_chomping() {
    assert_eq!(
        scan("|+\n a\n b\n\n"),
        vec![
            TokenKind::StreamStart,
            styled("a\nb\n\n", ScalarStyle::Literal),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_folded_joins_content_lines_with_a_space() {
    assert_eq!(
        scan(">\n a\n b\n"),
        vec![
            TokenKind::StreamStart,
            styled("a b\n", ScalarStyle::Folded),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_folded_preserves_break_before_indented_line() {
    assert_eq!(
        scan(">\n a\n  b\n"),
        vec![
            TokenKind::StreamStart,
            styled("a\n b\n", ScalarStyle::Folded),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_block_scalar_explicit_increment() {
    assert_eq!(
        scan("|2\n  a\n"),
        vec![
            TokenKind::StreamStart,
            styled("a\n", ScalarStyle::Literal),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_block_scalar_in_mapping() {
    assert_eq!(
        scan("a: |\n  text\n"),
        vec![
            TokenKind::StreamStart,
            TokenKind::BlockMappingStart,
            TokenKind::Key,
            plain("a"),
            TokenKind::Value,
            styled("text\n", ScalarStyle::Literal),
            TokenKind::BlockEnd,
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_block_scalar_zero_increment() {
    let err = scan_err("|0\na\n");
    assert_eq!(
        err.problem(),
        "expected indentation indicator in the range 1-9, but found 0"
    );
}

#[test]
fn test_block_scalar_junk_after_header() {
    let err = scan_err("| junk\n a\n");
    assert_eq!(err.context(), Some("while scanning a block scalar"));
    assert!(err.problem().starts_with("expected a comment or a line break"));
}

// Flow scalars

#[test]
fn test_single_quoted_escaped_quote() {
    assert_eq!(
        scan("'a''b'"),
        vec![
            TokenKind::StreamStart,
            styled("a'b", ScalarStyle::SingleQuoted),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_double_quoted_escapes() {
    assert_eq!(
        scan(r#""a\nb\tc\\d""#),
        vec![
            TokenKind::StreamStart,
            styled("a\nb\tc\\d", ScalarStyle::DoubleQuoted),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_double_quoted_hex_escapes() {
    assert_eq!(
        scan(r#""\u0041\x42\U00000043""#),
        vec![
            TokenKind::StreamStart,
            styled("ABC", ScalarStyle::DoubleQuoted),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_double_quoted_unknown_escape() {
    let err = scan_err(r#""\q""#);
    assert_eq!(err.context(), Some("while scanning a double-quoted scalar"));
    assert!(err.problem().starts_with("found unknown escape character"));
}

#[test]
fn test_double_quoted_bad_hex_digits() {
    let err = scan_err(r#""\xZZ""#);
    assert!(
        err.problem()
            .starts_with("expected escape sequence of 2 hexadecimal numbers")
    );
}

#[test]
fn test_quoted_scalar_folds_line_breaks() {
    assert_eq!(
        scan("'a\nb'"),
        vec![
            TokenKind::StreamStart,
            styled("a b", ScalarStyle::SingleQuoted),
            TokenKind::StreamEnd,
        ]
    );
    assert_eq!(
        scan("'a\n\nb'"),
        vec![
            TokenKind::StreamStart,
            styled("a\nb", ScalarStyle::SingleQuoted),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_unterminated_quoted_scalar() {
    let err = scan_err("'abc");
    assert_eq!(err.context(), Some("while scanning a quoted scalar"));
    assert_eq!(err.problem(), "found unexpected end of stream");
}

#[test]
fn test_document_separator_inside_quoted_scalar() {
    let err = scan_err("'a\n---\nb'");
    assert_eq!(err.problem(), "found unexpected document separator");
}

#[test]
fn test_plain_scalar_in_flow_stops_at_comma() {
    assert_eq!(
        scan("[a b, c]"),
        vec![
            TokenKind::StreamStart,
            TokenKind::FlowSequenceStart,
            plain("a b"),
            TokenKind::FlowEntry,
            plain("c"),
            TokenKind::FlowSequenceEnd,
            TokenKind::StreamEnd,
        ]
    );
}

// Directives

#[test]
fn test_yaml_directive() {
    assert_eq!(
        scan("%YAML 1.2\n---\na"),
        vec![
            TokenKind::StreamStart,
            TokenKind::Directive {
                name: "YAML".to_string(),
                value: Some(DirectiveValue::Yaml { major: 1, minor: 2 }),
            },
            TokenKind::DocumentStart,
            plain("a"),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_tag_directive() {
    assert_eq!(
        scan("%TAG !e! tag:example.com,2000:app/\na"),
        vec![
            TokenKind::StreamStart,
            TokenKind::Directive {
                name: "TAG".to_string(),
                value: Some(DirectiveValue::Tag {
                    handle: "!e!".to_string(),
                    prefix: "tag:example.com,2000:app/".to_string(),
                }),
            },
            plain("a"),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_unknown_directive_has_no_value() {
    assert_eq!(
        scan("%FOO bar baz\na"),
        vec![
            TokenKind::StreamStart,
            TokenKind::Directive {
                name: "FOO".to_string(),
                value: None,
            },
            plain("a"),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_yaml_directive_with_bad_version() {
    let err = scan_err("%YAML 1.x\n");
    assert_eq!(err.context(), Some("while scanning a directive"));
    assert!(err.problem().starts_with("expected a digit"));
}

// Tags

#[test]
fn test_secondary_tag_handle() {
    assert_eq!(
        scan("!!str a"),
        vec![
            TokenKind::StreamStart,
            TokenKind::Tag {
                handle: Some("!!".to_string()),
                suffix: "str".to_string(),
            },
            plain("a"),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_primary_tag_handle() {
    assert_eq!(
        scan("!foo a"),
        vec![
            TokenKind::StreamStart,
            TokenKind::Tag {
                handle: Some("!".to_string()),
                suffix: "foo".to_string(),
            },
            plain("a"),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_verbatim_tag() {
    assert_eq!(
        scan("!<tag:a,b> x"),
        vec![
            TokenKind::StreamStart,
            TokenKind::Tag {
                handle: None,
                suffix: "tag:a,b".to_string(),
            },
            plain("x"),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_non_specific_tag() {
    assert_eq!(
        scan("! a"),
        vec![
            TokenKind::StreamStart,
            TokenKind::Tag {
                handle: None,
                suffix: "!".to_string(),
            },
            plain("a"),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_tag_suffix_uri_escapes_decode() {
    assert_eq!(
        scan("!%21 a"),
        vec![
            TokenKind::StreamStart,
            TokenKind::Tag {
                handle: Some("!".to_string()),
                suffix: "!".to_string(),
            },
            plain("a"),
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_tag_bad_uri_escape() {
    let err = scan_err("!%zz a");
    assert!(
        err.problem()
            .starts_with("expected URI escape sequence of 2 hexadecimal numbers")
    );
}

// Comments

#[test]
fn test_comments_are_discarded_by_default() {
    let kinds = scan("# header\na: 1 # trailing\n");
    assert!(!kinds.iter().any(|k| k.is_comment()));
}

#[test]
fn test_inline_comment() {
    let opts = ScanOptions::new().parse_comments(true);
    assert_eq!(
        scan_with("a: 1 # trailing\n", opts),
        vec![
            TokenKind::StreamStart,
            TokenKind::BlockMappingStart,
            TokenKind::Key,
            plain("a"),
            TokenKind::Value,
            plain("1"),
            TokenKind::Comment {
                kind: CommentKind::Inline,
                value: " trailing".to_string(),
            },
            TokenKind::BlockEnd,
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_own_line_comment() {
    let opts = ScanOptions::new().parse_comments(true);
    let kinds = scan_with("# header\na: 1\n", opts);
    assert_eq!(
        kinds[1],
        TokenKind::Comment {
            kind: CommentKind::Block,
            value: " header".to_string(),
        }
    );
}

#[test]
fn test_blank_line_comment() {
    let opts = ScanOptions::new().parse_comments(true);
    assert_eq!(
        scan_with("a: 1\n\nb: 2\n", opts),
        vec![
            TokenKind::StreamStart,
            TokenKind::BlockMappingStart,
            TokenKind::Key,
            plain("a"),
            TokenKind::Value,
            plain("1"),
            TokenKind::Comment {
                kind: CommentKind::BlankLine,
                value: "\n".to_string(),
            },
            TokenKind::Key,
            plain("b"),
            TokenKind::Value,
            plain("2"),
            TokenKind::BlockEnd,
            TokenKind::StreamEnd,
        ]
    );
}

#[test]
fn test_comment_after_block_entry_dash() {
    let opts = ScanOptions::new().parse_comments(true);
    let kinds = scan_with("- # note\n  a\n", opts);
    assert_eq!(
        kinds[3],
        TokenKind::Comment {
            kind: CommentKind::Block,
            value: " note".to_string(),
        }
    );
}

#[test]
fn test_comment_on_block_scalar_header() {
    let opts = ScanOptions::new().parse_comments(true);
    let kinds = scan_with("a: | # note\n  text\n", opts);
    let comment_at = kinds
        .iter()
        .position(|k| k.is_comment())
        .expect("header comment token");
    // The header comment is staged before the scalar it annotates.
    assert!(matches!(kinds[comment_at + 1], TokenKind::Scalar { .. }));
}

// Options and error surface

#[test]
fn test_error_carries_label() {
    let opts = ScanOptions::new().label("config.yaml");
    let mut scanner = Scanner::with_options("]", opts);
    let err = loop {
        match scanner.next_token() {
            Ok(Some(_)) => {}
            Ok(None) => panic!("expected a scan error"),
            Err(err) => break err,
        }
    };
    assert_eq!(err.label(), Some("config.yaml"));
    assert!(err.to_string().ends_with("(in config.yaml)"));
}

#[test]
fn test_marks_disabled() {
    let opts = ScanOptions::new().use_marks(false);
    let tokens: Vec<Token> = Scanner::with_options("a: 1", opts)
        .map(|token| token.expect("scan failed"))
        .collect();
    assert!(tokens.iter().all(|t| t.start_mark.is_none()));
    assert!(tokens.iter().all(|t| t.end_mark.is_none()));
}

#[test]
fn test_scalar_marks() {
    let tokens = scan_tokens("abc");
    let scalar = &tokens[1];
    let start = scalar.start_mark.unwrap();
    let end = scalar.end_mark.unwrap();
    assert_eq!((start.index, start.line, start.column), (0, 0, 0));
    assert_eq!((end.index, end.line, end.column), (3, 0, 3));
}

#[test]
fn test_failure_is_terminal() {
    let mut scanner = Scanner::new("]");
    assert!(matches!(scanner.next_token(), Ok(Some(_))));
    let first = scanner.next_token().unwrap_err();
    let second = scanner.next_token().unwrap_err();
    assert_eq!(first.problem(), second.problem());
}

#[test]
fn test_iterator_fuses_after_error() {
    let mut scanner = Scanner::new("]");
    assert!(matches!(scanner.next(), Some(Ok(_))));
    assert!(matches!(scanner.next(), Some(Err(_))));
    assert!(scanner.next().is_none());
    assert!(scanner.next().is_none());
}

#[test]
fn test_peek_token_matches_next_token() {
    let mut scanner = Scanner::new("a");
    let peeked = scanner.peek_token().unwrap().cloned();
    let taken = scanner.next_token().unwrap();
    assert_eq!(peeked, taken);
    assert!(scanner.has_next_token().unwrap());
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn bare_scalar() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_-]{0,10}").unwrap()
    }

    /// Generate a nested flow document out of sequences and mappings.
    fn flow_document() -> impl Strategy<Value = String> {
        bare_scalar().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4)
                    .prop_map(|items| format!("[{}]", items.join(", "))),
                prop::collection::vec((bare_scalar(), inner), 0..4).prop_map(|entries| {
                    let body = entries
                        .into_iter()
                        .map(|(key, value)| format!("{key}: {value}"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("{{{body}}}")
                }),
            ]
        })
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::new(source)
            .map(|token| token.expect("generated document must scan").kind)
            .collect()
    }

    proptest! {
        /// Every flow start has a matching end and nesting never goes
        /// negative.
        #[test]
        fn flow_brackets_balance(doc in flow_document()) {
            let mut depth = 0i64;
            for kind in kinds(&doc) {
                if kind.is_flow_start() {
                    depth += 1;
                }
                if kind.is_flow_end() {
                    prop_assert!(depth > 0);
                    depth -= 1;
                }
            }
            prop_assert_eq!(depth, 0);
        }

        /// Block starts and ends pair up in LIFO order.
        #[test]
        fn block_structure_nests(keys in prop::collection::vec(bare_scalar(), 1..5)) {
            let mut doc = String::new();
            for (depth, key) in keys.iter().enumerate() {
                doc.push_str(&" ".repeat(depth));
                doc.push_str(key);
                doc.push(':');
                if depth + 1 == keys.len() {
                    doc.push_str(" leaf");
                }
                doc.push('\n');
            }
            let mut open = 0i64;
            for kind in kinds(&doc) {
                match kind {
                    TokenKind::BlockMappingStart | TokenKind::BlockSequenceStart => open += 1,
                    TokenKind::BlockEnd => {
                        prop_assert!(open > 0);
                        open -= 1;
                    }
                    _ => {}
                }
            }
            prop_assert_eq!(open, 0);
        }

        /// Two scans of the same input agree token for token.
        #[test]
        fn scanning_is_deterministic(doc in flow_document()) {
            prop_assert_eq!(kinds(&doc), kinds(&doc));
        }

        /// Re-serializing a scanned scalar in the same style scans to the
        /// same token sequence.
        #[test]
        fn single_quoted_rescan_is_identical(s in bare_scalar()) {
            let first = kinds(&format!("'{s}'"));
            let TokenKind::Scalar { value, .. } = &first[1] else {
                return Err(TestCaseError::fail("expected a scalar token"));
            };
            let second = kinds(&format!("'{value}'"));
            prop_assert_eq!(&first, &second);
        }
    }
}
