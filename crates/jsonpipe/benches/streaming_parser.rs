//! Benchmark – `jsonpipe::JsonParser`
#![allow(missing_docs)]

use std::{fmt::Write, time::Duration};

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jsonpipe::{JsonParser, JsonParserOptions, ParsedElement, value_fn};

/// A deterministic array of small records, at least `target_len` bytes long.
fn make_records_payload(target_len: usize) -> String {
    let mut s = String::with_capacity(target_len + 64);
    s.push('[');
    let mut i = 0usize;
    while s.len() < target_len {
        if i > 0 {
            s.push(',');
        }
        write!(
            s,
            r#"{{"id":{i},"name":"item é{i}","score":{}.5,"tags":["a","b"],"ok":true}}"#,
            i % 97
        )
        .unwrap();
        i += 1;
    }
    s.push(']');
    s
}

/// One long string property, the worst case for the string buffer.
fn make_string_payload(target_len: usize) -> String {
    let mut s = String::with_capacity(target_len);
    s.push_str("{\"data\":\"");
    s.extend(std::iter::repeat_n('a', target_len.saturating_sub(11)));
    s.push_str("\"}");
    s
}

/// Feeds `payload` in `parts` chunks and returns the number of emissions.
fn run_parser(payload: &str, parts: usize, options: &JsonParserOptions) -> usize {
    assert!(parts > 0);
    let chunk_size = payload.len().div_ceil(parts);

    let mut produced = 0usize;
    let handler = value_fn(|_: ParsedElement<'_>| {
        produced += 1;
        Ok(())
    });
    let mut parser = JsonParser::with_handler(options.clone(), handler).unwrap();
    for chunk in payload.as_bytes().chunks(chunk_size) {
        parser.write(chunk).unwrap();
    }
    parser.end().unwrap();
    drop(parser);
    produced
}

fn scenarios() -> [(&'static str, JsonParserOptions); 4] {
    [
        ("all", JsonParserOptions::default()),
        ("elements", JsonParserOptions {
            paths: Some(vec!["$.*".into()]),
            keep_stack: false,
            ..Default::default()
        }),
        ("buffered", JsonParserOptions {
            string_buffer_size: 64 * 1024,
            number_buffer_size: 64,
            ..Default::default()
        }),
        ("partial", JsonParserOptions {
            emit_partial_values: true,
            ..Default::default()
        }),
    ]
}

fn bench_streaming_parser(c: &mut Criterion) {
    let records = make_records_payload(100_000);
    let mut group = c.benchmark_group("streaming_parser_records");
    for &parts in &[1usize, 100, 1_000] {
        for (name, options) in scenarios() {
            group.bench_with_input(BenchmarkId::new(parts.to_string(), name), &options, |b, o| {
                b.iter(|| black_box(run_parser(black_box(&records), parts, o)));
            });
        }
    }
    group.finish();

    let string = make_string_payload(10_000);
    let mut group = c.benchmark_group("streaming_parser_string");
    for &parts in &[100usize, 1_000, 5_000] {
        for (name, options) in scenarios() {
            group.bench_with_input(BenchmarkId::new(parts.to_string(), name), &options, |b, o| {
                b.iter(|| black_box(run_parser(black_box(&string), parts, o)));
            });
        }
    }
    group.finish();
}

fn criterion() -> Criterion {
    let mut c = Criterion::default();
    if cfg!(feature = "bench-fast") {
        c = c
            .warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10);
    } else {
        c = c
            .warm_up_time(Duration::from_secs(5))
            .measurement_time(Duration::from_secs(10));
    }
    c
}

criterion_group! { name = benches; config = criterion(); targets = bench_streaming_parser }
criterion_main!(benches);
