#![no_main]

use arbitrary::Arbitrary;
use jsonpipe::{JsonParser, JsonParserOptions, Map, ParsedElement, Value, value_fn};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    flags: u8,
    splits: Vec<u16>,
    data: Vec<u8>,
}

fn from_serde(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::Array(items.into_iter().map(from_serde).collect()),
        serde_json::Value::Object(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), from_serde(v)))
                .collect::<Map>(),
        ),
    }
}

/// Cuts `data` at the given offsets, modulo its length.
fn chunks<'a>(data: &'a [u8], splits: &[u16]) -> Vec<&'a [u8]> {
    let mut cuts: Vec<usize> = splits
        .iter()
        .map(|&s| usize::from(s) % (data.len() + 1))
        .collect();
    cuts.push(data.len());
    cuts.sort_unstable();
    let mut out = Vec::with_capacity(cuts.len());
    let mut start = 0;
    for cut in cuts {
        out.push(&data[start..cut]);
        start = cut;
    }
    out
}

fn run(input: &Input) {
    let options = JsonParserOptions {
        string_buffer_size: usize::from(input.flags & 1) * 8,
        number_buffer_size: usize::from(input.flags & 2) * 4,
        emit_partial_values: input.flags & 4 != 0,
        keep_stack: input.flags & 8 == 0,
        separator: (input.flags & 16 != 0).then(|| "\n".into()),
        ..Default::default()
    };
    let comparable = options.separator.is_none() && options.keep_stack;

    let mut root = None;
    let handler = value_fn(|el: ParsedElement<'_>| {
        if !el.partial && el.stack.is_empty() {
            root = el.value.cloned();
        }
        Ok(())
    });
    let mut parser = JsonParser::with_handler(options, handler).unwrap();
    let result = chunks(&input.data, &input.splits)
        .into_iter()
        .try_for_each(|chunk| parser.write(chunk))
        .and_then(|()| parser.end());
    drop(parser);

    if !comparable {
        return;
    }
    if let Ok(expected) = serde_json::from_slice::<serde_json::Value>(&input.data) {
        assert!(result.is_ok(), "rejected valid JSON: {result:?}");
        assert_eq!(root, Some(from_serde(expected)));
    }
}

fuzz_target!(|input: Input| run(&input));
