use alloc::{string::ToString, vec, vec::Vec};

use rstest::rstest;

use super::{json, parse_chunks};
use crate::{JsonParserOptions, TokenParserState, Value};

const DOCUMENTS: [&str; 6] = [
    "true",
    "false",
    "null",
    r#""string""#,
    "[1,2,3]",
    r#"{ "a": 0, "b": 1, "c": -1 }"#,
];

fn expected() -> Vec<Value> {
    [
        "true",
        "false",
        "null",
        r#""string""#,
        "1",
        "2",
        "3",
        "[1,2,3]",
        "0",
        "1",
        "-1",
        r#"{"a":0,"b":1,"c":-1}"#,
    ]
    .into_iter()
    .map(json)
    .collect()
}

#[test]
fn empty_separator_concatenates_values() {
    let (collector, result) = parse_chunks(
        JsonParserOptions {
            separator: Some("".into()),
            ..Default::default()
        },
        &DOCUMENTS,
    );
    result.unwrap();
    assert_eq!(collector.values(), expected());
    assert!(collector.ended);
}

#[rstest]
#[case::nd_json("\n")]
#[case::tab_newline("\t\n")]
#[case::word("abc")]
#[case::long_word("SEPARATOR")]
fn separated_values(#[case] separator: &str) {
    let chunks: Vec<&str> = DOCUMENTS
        .iter()
        .flat_map(|doc| [*doc, separator])
        .collect();
    let (collector, result) = parse_chunks(
        JsonParserOptions {
            separator: Some(separator.into()),
            ..Default::default()
        },
        &chunks,
    );
    result.unwrap();
    assert_eq!(collector.values(), expected());
}

#[test]
fn separator_split_across_writes() {
    let (collector, result) = parse_chunks(
        JsonParserOptions {
            separator: Some("SEPARATOR".into()),
            ..Default::default()
        },
        &["1SEP", "ARA", "TOR2SEPARATOR", "3"],
    );
    result.unwrap();
    assert_eq!(
        collector.values(),
        vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]
    );
}

#[test]
fn wrong_separator_fails() {
    let (_, result) = parse_chunks(
        JsonParserOptions {
            separator: Some("abc".into()),
            ..Default::default()
        },
        &["abe"],
    );
    assert_eq!(
        result.unwrap_err().to_string(),
        r#"Unexpected "e" at position "2" in state SEPARATOR"#
    );
}

#[test]
fn missing_separator_fails() {
    let mut p = super::parser(JsonParserOptions {
        separator: Some("\n".into()),
        ..Default::default()
    });
    p.write("{}").unwrap();
    assert_eq!(p.parser().state(), TokenParserState::Separator);
    assert_eq!(
        p.write("{}").unwrap_err().to_string(),
        r#"Unexpected LEFT_BRACE ("{") in state SEPARATOR"#
    );
}

#[test]
fn whitespace_around_separator() {
    let (collector, result) = parse_chunks(
        JsonParserOptions {
            separator: Some("\n".into()),
            ..Default::default()
        },
        &["1 \n 2\t\n", "\"x\"\n"],
    );
    result.unwrap();
    assert_eq!(
        collector.values(),
        vec![Value::Number(1.0), Value::Number(2.0), Value::from("x")]
    );
}
