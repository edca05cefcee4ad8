use alloc::string::ToString;

use rstest::rstest;

use crate::{ErrorSource, Expected, ParseError, ParserOptions, SyntaxError, TokenKind, parse};

fn parse_err(src: &str) -> ParseError {
    parse(src.as_bytes(), ParserOptions::default()).unwrap_err()
}

fn assert_err_contains(err: &ParseError, expected_sub: &str, offset: usize) {
    let s = err.to_string();
    assert!(s.contains(expected_sub), "expected substring {expected_sub:?} in {s:?}");
    assert_eq!(err.offset(), offset);
}

#[test_log::test]
fn trailing_comma_in_object_aborts() {
    let err = parse_err(r#"{"a":1,}"#);
    assert_eq!(
        err.kind(),
        &ErrorSource::Syntax(SyntaxError::UnexpectedToken {
            expected: Expected::Key,
            found: TokenKind::RightBrace,
        })
    );
    assert_eq!(
        err.to_string(),
        "syntax error: expected an object key, found `}` at byte 7"
    );
}

#[rstest]
#[case(r#"{"a" 1}"#, Expected::Colon, TokenKind::Number, 5)]
#[case(r#"{"a":1 "b":2}"#, Expected::CommaOrObjectEnd, TokenKind::String, 7)]
#[case(r#"{"a":[1,]}"#, Expected::Value, TokenKind::RightBracket, 8)]
#[case(r#"{"a":[1 2]}"#, Expected::CommaOrArrayEnd, TokenKind::Number, 8)]
#[case(r#"{1:2}"#, Expected::Key, TokenKind::Number, 1)]
#[case(r#"{"a":}"#, Expected::Value, TokenKind::RightBrace, 5)]
#[case(r#"{"a":1"#, Expected::CommaOrObjectEnd, TokenKind::EndOfInput, 6)]
#[case(r#"{"a":["#, Expected::Value, TokenKind::EndOfInput, 6)]
#[case(r#"{"a":1}}"#, Expected::EndOfInput, TokenKind::RightBrace, 7)]
#[case(r#"{,}"#, Expected::Key, TokenKind::Comma, 1)]
#[case(r#"{"a"::1}"#, Expected::Value, TokenKind::Colon, 5)]
#[case(r#"{"a":1,,"b":2}"#, Expected::Key, TokenKind::Comma, 7)]
#[case(r#"{"a":[1]]}"#, Expected::CommaOrObjectEnd, TokenKind::RightBracket, 8)]
#[case(r#"{"a":{"b":1]}"#, Expected::CommaOrObjectEnd, TokenKind::RightBracket, 11)]
#[case(r#""a""#, Expected::ObjectStart, TokenKind::String, 0)]
#[case(r#"  "#, Expected::ObjectStart, TokenKind::EndOfInput, 2)]
fn grammar_violations(
    #[case] src: &str,
    #[case] expected: Expected,
    #[case] found: TokenKind,
    #[case] offset: usize,
) {
    let err = parse_err(src);
    assert_eq!(
        err.kind(),
        &ErrorSource::Syntax(SyntaxError::UnexpectedToken { expected, found }),
        "{src}"
    );
    assert_eq!(err.offset(), offset, "{src}");
}

#[rstest]
#[case(r#"{"a":true}"#, "invalid character 't'", 5)]
#[case(r#"{"a":null}"#, "invalid character 'n'", 5)]
#[case(r#"{"a":-1}"#, "invalid character '-'", 5)]
#[case(r#"{"a":1e3}"#, "invalid character 'e'", 6)]
#[case(r#"{'a':1}"#, "invalid character '\\''", 1)]
#[case(r#"{"a":"b}"#, "unterminated string", 5)]
#[case(r#"{"a"#, "unterminated string", 1)]
fn lexical_errors(#[case] src: &str, #[case] message: &str, #[case] offset: usize) {
    let err = parse_err(src);
    assert_err_contains(&err, message, offset);
}

#[test]
fn error_source_is_exposed() {
    use core::error::Error as _;

    let err = parse_err(r#"{"a":-1}"#);
    let source = err.source().unwrap().to_string();
    assert_eq!(source, "syntax error: invalid character '-'");
}

#[test]
fn exhaustion_error_names_the_arena() {
    let options = ParserOptions {
        capacities: Some(crate::ArenaCapacities {
            tokens: 3,
            literal_bytes: 64,
            tree_slots: 64,
        }),
        ..ParserOptions::default()
    };
    let err = parse(br#"{"a":1}"#, options).unwrap_err();
    assert_err_contains(
        &err,
        "allocation error: `tokens` arena exhausted: requested 1 more, 3 of 3 used",
        4,
    );
}
