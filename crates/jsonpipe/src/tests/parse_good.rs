use alloc::{format, string::String, vec, vec::Vec};

use rstest::rstest;

use super::{json, parse_chunks, parse_values};
use crate::{JsonParserOptions, PathItem, Value};

fn root(src: &str) -> Value {
    parse_values(src, JsonParserOptions::default())
        .pop()
        .unwrap()
}

#[rstest]
#[case("0")]
#[case("0e1")]
#[case("0e+1")]
#[case("0e-1")]
#[case("0.123")]
#[case("0.123e00")]
#[case("0.123E+1")]
#[case("0.123e-1")]
#[case("-0")]
#[case("-0.123E-1")]
#[case("-123")]
#[case("-123e+1")]
#[case("123.456e-7")]
#[case("1e400")]
#[case("9007199254740993")]
fn numbers(#[case] src: &str) {
    let expected: f64 = src.parse().unwrap();
    assert_eq!(
        parse_values(src, JsonParserOptions {
            separator: Some(String::new()),
            ..Default::default()
        }),
        vec![Value::Number(expected)]
    );
}

#[rstest]
#[case("-a")]
#[case("-e")]
#[case("1a")]
#[case("1.a")]
#[case("1.e")]
#[case("1.-")]
#[case("1.0ea")]
#[case("1.0e1.2")]
fn invalid_numbers(#[case] src: &str) {
    let (_, result) = parse_chunks(JsonParserOptions::default(), &[src]);
    assert!(result.is_err(), "{src:?} should fail");
}

#[rstest]
#[case::ascii("Hello world!")]
#[case::escapes(r#"\r\n\f\t\\\/\""#)]
#[case::greek(r"\u039b\u03ac\u03bc\u03b2\u03b4\u03b1")]
#[case::snowman("\u{2603}")]
#[case::box_drawing("\u{251c}\u{2500}\u{2500}")]
#[case::mixed("snow: \u{2603}!")]
#[case::latin("\u{f5}")]
#[case::surrogates(r"\uD83D\uDE0B")]
fn strings_char_by_char(
    #[case] body: &str,
    #[values(0, 5, 64 * 1024)] string_buffer_size: usize,
) {
    let expected = json(&format!("\"{body}\""));
    let mut chunks: Vec<String> = vec!["\"".into()];
    chunks.extend(body.chars().map(String::from));
    chunks.push("\"".into());

    let (collector, result) = parse_chunks(
        JsonParserOptions {
            string_buffer_size,
            ..Default::default()
        },
        &chunks,
    );
    result.unwrap();
    assert_eq!(collector.values(), vec![expected]);
}

#[rstest]
#[case::two_bytes(&[0xd0, 0xb4], "\u{434}")]
#[case::three_bytes(&[0xe6, 0x88, 0x91], "\u{6211}")]
#[case::four_bytes(&[0xf0, 0xa0, 0x9c, 0x8e], "\u{2070e}")]
fn multi_byte_characters(#[case] bytes: &[u8], #[case] expected: &str) {
    for i in 0..=bytes.len() {
        let (a, b) = bytes.split_at(i);
        let chunks: [&[u8]; 4] = [b"\"", a, b, b"\""];
        let (collector, result) = parse_chunks(JsonParserOptions::default(), &chunks);
        result.unwrap();
        assert_eq!(collector.values(), vec![Value::from(expected)], "split at {i}");
    }
}

#[test]
fn eclectic_string_split_anywhere() {
    let bytes = "A\u{436}\u{6587}\u{20731}B".as_bytes();
    for i in 0..=bytes.len() {
        let (a, b) = bytes.split_at(i);
        let chunks: [&[u8]; 4] = [b"\"", a, b, b"\""];
        let (collector, result) = parse_chunks(
            JsonParserOptions {
                string_buffer_size: 64 * 1024,
                ..Default::default()
            },
            &chunks,
        );
        result.unwrap();
        assert_eq!(
            collector.values(),
            vec![Value::from("A\u{436}\u{6587}\u{20731}B")]
        );
    }
}

#[test]
fn chunked_surrogate_pair() {
    let (collector, result) = parse_chunks(
        JsonParserOptions::default(),
        &["\"", r"\uD83D", r"\uDE0B", "\""],
    );
    result.unwrap();
    assert_eq!(collector.values(), vec![Value::from("\u{1F60B}")]);
}

#[test]
fn broken_surrogate_pair_is_replaced() {
    assert_eq!(root(r#""\uD83D\uEFFF""#), Value::from("\u{FFFD}\u{EFFF}"));
}

#[test]
fn small_string_buffer_flushes_before_overflow() {
    let (collector, result) = parse_chunks(
        JsonParserOptions {
            string_buffer_size: 5,
            ..Default::default()
        },
        &["\"", "aaaa", "\u{2070E}", "\""],
    );
    result.unwrap();
    assert_eq!(collector.values(), vec![Value::from("aaaa\u{2070E}")]);
}

#[test]
fn small_number_buffer() {
    assert_eq!(
        parse_values("[123456789.125, -1e-3]", JsonParserOptions {
            number_buffer_size: 2,
            paths: Some(vec!["$".into()]),
            ..Default::default()
        }),
        vec![Value::Array(vec![
            Value::Number(123_456_789.125),
            Value::Number(-0.001)
        ])]
    );
}

#[rstest]
#[case::literals("[true, false, null]")]
#[case::empty_containers(r#"{"a": [], "b": {}, "c": [{}]}"#)]
#[case::nested(r#"{"a": {"b": [1, [2, [3, {"c": "d"}]]]}}"#)]
#[case::whitespace(" \t\r\n[ 1 ,\n\t2 ] \n")]
#[case::unicode_keys(r#"{"κλειδί": "τιμή", "\u0000": null}"#)]
fn documents_match_serde_json(#[case] src: &str) {
    assert_eq!(root(src), json(src));
}

#[test]
fn values_are_emitted_innermost_first() {
    let values = parse_values(r#"{"a": [1, {"b": true}], "c": null}"#, JsonParserOptions::default());
    let rendered: Vec<String> = values.iter().map(|v| format!("{v}")).collect();
    assert_eq!(
        rendered,
        vec![
            "1",
            "true",
            r#"{"b":true}"#,
            r#"[1,{"b":true}]"#,
            "null",
            r#"{"a":[1,{"b":true}],"c":null}"#,
        ]
    );
}

#[test]
fn element_keys_and_paths() {
    let (collector, result) = parse_chunks(JsonParserOptions::default(), &[r#"{"a": [10, 20]}"#]);
    result.unwrap();
    let seen: Vec<_> = collector
        .emitted
        .iter()
        .map(|e| (e.key.clone(), e.path.clone(), e.parent.as_ref().and_then(Value::len)))
        .collect();
    assert_eq!(
        seen,
        vec![
            (Some(PathItem::Index(0)), crate::path!["a", 0], Some(1)),
            (Some(PathItem::Index(1)), crate::path!["a", 1], Some(2)),
            (Some(PathItem::from("a")), crate::path!["a"], Some(1)),
            (None, crate::path![], None),
        ]
    );
}

#[rstest]
#[case::utf8(&[0xEF, 0xBB, 0xBF])]
#[case::utf16_be(&[0xFE, 0xFF])]
#[case::utf16_le(&[0xFF, 0xFE])]
#[case::utf32_le(&[0xFF, 0xFE, 0x00, 0x00])]
#[case::utf32_be(&[0x00, 0x00, 0xFE, 0xFF])]
fn leading_bom_is_ignored(#[case] bom: &[u8]) {
    let mut input = bom.to_vec();
    input.extend_from_slice(br#"{"a": 1}"#);
    for i in 0..=bom.len() {
        let (a, b) = input.split_at(i);
        let (collector, result) = parse_chunks(JsonParserOptions::default(), &[a, b]);
        result.unwrap();
        assert_eq!(collector.values().last(), Some(&json(r#"{"a": 1}"#)));
    }
}
