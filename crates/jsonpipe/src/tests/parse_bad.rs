use alloc::{string::ToString, vec};

use rstest::rstest;

use super::{parse_chunks, parser, strings};
use crate::{
    JsonParser, JsonParserOptions, ParseError, SelectorError, Token, TokenParserError,
    TokenParserState, TokenizerError, TokenizerState, value_fn,
};

fn first_error(src: &str) -> ParseError {
    let (collector, result) = parse_chunks(JsonParserOptions::default(), &[src]);
    let err = result.unwrap_err();
    assert_eq!(collector.errors, vec![err.clone()], "reported exactly once");
    err
}

#[rstest]
#[case::missing_colon(r#"{"a" 1}"#, r#"Unexpected NUMBER (1) in state COLON"#)]
#[case::missing_value(r#"{"a": }"#, r#"Unexpected RIGHT_BRACE ("}") in state VALUE"#)]
#[case::trailing_comma_array("[1,]", r#"Unexpected RIGHT_BRACKET ("]") in state VALUE"#)]
#[case::trailing_comma_object(r#"{"a":1,}"#, r#"Unexpected RIGHT_BRACE ("}") in state KEY"#)]
#[case::non_string_key("{1:2}", "Unexpected NUMBER (1) in state KEY")]
#[case::mismatched("[1}", r#"Unexpected RIGHT_BRACE ("}") in state COMMA"#)]
#[case::missing_comma("[1 2]", "Unexpected NUMBER (2) in state COMMA")]
#[case::stray_close("]", r#"Unexpected RIGHT_BRACKET ("]") in state VALUE"#)]
#[case::stray_colon(":", r#"Unexpected COLON (":") in state VALUE"#)]
fn structural_errors(#[case] src: &str, #[case] message: &str) {
    let err = first_error(src);
    assert!(matches!(err, ParseError::TokenParser(_)));
    assert_eq!(err.to_string(), message);
}

#[rstest]
#[case::bare_word("nope", r#"Unexpected "o" at position "1" in state NULL1"#)]
#[case::single_quotes("'a'", r#"Unexpected "'" at position "0" in state START"#)]
#[case::newline_in_string("\"a\nb\"", "Unexpected \"\n\" at position \"2\" in state STRING_DEFAULT")]
#[case::bad_escape(r#""\j""#, r#"Unexpected "j" at position "2" in state STRING_AFTER_BACKSLASH"#)]
#[case::short_unicode(r#""\ua""#, r#"Unexpected """ at position "4" in state STRING_UNICODE_DIGIT_2"#)]
#[case::plus_sign("+1", r#"Unexpected "+" at position "0" in state START"#)]
fn lexical_errors(#[case] src: &str, #[case] message: &str) {
    let err = first_error(src);
    assert!(matches!(err, ParseError::Tokenizer(_)));
    assert_eq!(err.to_string(), message);
}

#[rstest]
#[case("\\j")]
#[case("\\ua")]
#[case("\\u1*")]
#[case("\\u12*")]
#[case("\\u123*")]
fn invalid_escapes_fail_when_chunked(#[case] body: &str) {
    let (_, result) = parse_chunks(JsonParserOptions::default(), &["\"", body, "\""]);
    assert!(matches!(
        result,
        Err(ParseError::Tokenizer(TokenizerError::UnexpectedByte { .. }))
    ));
}

#[test]
fn trailing_data_after_document() {
    let err = first_error(r#"""test"""#);
    assert_eq!(
        err,
        ParseError::Tokenizer(TokenizerError::UnexpectedByte {
            byte: b'e',
            offset: 3,
            state: TokenizerState::True1,
        })
    );
}

#[rstest]
#[case("*", r#"Invalid selector "*". Should start with "$"."#)]
#[case(".*", r#"Invalid selector ".*". Should start with "$"."#)]
#[case("$..*", r#"Invalid selector "$..*". ".." syntax not supported."#)]
fn invalid_selectors(#[case] path: &str, #[case] message: &str) {
    let err = JsonParser::new(JsonParserOptions {
        paths: strings(&[path]),
        ..Default::default()
    })
    .unwrap_err();
    assert!(matches!(
        err,
        ParseError::Selector(SelectorError::MissingRoot(_) | SelectorError::RecursiveDescent(_))
    ));
    assert_eq!(err.to_string(), message);
}

#[test]
fn missing_value_handler() {
    let mut p = JsonParser::new(JsonParserOptions::default()).unwrap();
    let err = p.write(r#""test""#).unwrap_err();
    assert_eq!(err, ParseError::CallbackNotSet("onValue"));
    assert_eq!(
        err.to_string(),
        r#"Can't emit data before the "onValue" callback has been set up."#
    );
}

#[test]
fn handler_errors_are_propagated() {
    let mut calls = 0;
    let mut p = JsonParser::with_handler(
        JsonParserOptions::default(),
        value_fn(|_| {
            calls += 1;
            Err(ParseError::CallbackNotSet("stop"))
        }),
    )
    .unwrap();
    assert_eq!(p.write("[1,2]"), Err(ParseError::CallbackNotSet("stop")));
    assert!(p.write("3").is_err());
    drop(p);
    assert_eq!(calls, 1);
}

#[test]
fn errors_leave_both_stages_failed() {
    let mut p = parser(JsonParserOptions::default());
    p.write("[1 x").unwrap_err();
    assert_eq!(p.tokenizer_state(), TokenizerState::Error);
    assert_eq!(p.parser().state(), TokenParserState::Comma);
    assert!(!p.is_ended());
    assert_eq!(
        p.write("]"),
        Err(ParseError::Tokenizer(TokenizerError::Closed {
            state: TokenizerState::Error
        }))
    );
    assert_eq!(p.handler().errors.len(), 2);
}

#[test]
fn unexpected_token_carries_the_token() {
    let err = first_error("[1:");
    assert_eq!(
        err,
        ParseError::TokenParser(TokenParserError::UnexpectedToken {
            token: Token::Colon,
            state: TokenParserState::Comma,
        })
    );
}
