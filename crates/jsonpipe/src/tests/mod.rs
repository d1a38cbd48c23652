
mod parse_bad;
mod parse_good;
mod separator;

use alloc::{string::String, vec::Vec};

use crate::{
    JsonParser, JsonParserOptions, Map, ParseError, ParsedElement, Path, PathItem, Value,
    ValueHandler,
};

/// An owned copy of one [`ParsedElement`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Emitted {
    pub value: Option<Value>,
    pub key: Option<PathItem>,
    pub parent: Option<Value>,
    pub path: Path,
    pub partial: bool,
}

/// Records everything a parser reports.
#[derive(Debug, Default)]
pub(crate) struct Collector {
    pub emitted: Vec<Emitted>,
    pub errors: Vec<ParseError>,
    pub ended: bool,
}

impl Collector {
    /// Values of the complete emissions, in order.
    pub fn values(&self) -> Vec<Value> {
        self.emitted
            .iter()
            .filter(|e| !e.partial)
            .filter_map(|e| e.value.clone())
            .collect()
    }
}

impl ValueHandler for Collector {
    fn on_value(&mut self, element: ParsedElement<'_>) -> Result<(), ParseError> {
        self.emitted.push(Emitted {
            value: element.value.cloned(),
            key: element.key.cloned(),
            parent: element.parent.cloned(),
            path: element.path(),
            partial: element.partial,
        });
        Ok(())
    }

    fn on_end(&mut self) {
        self.ended = true;
    }

    fn on_error(&mut self, error: &ParseError) {
        self.errors.push(error.clone());
    }
}

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn parser(options: JsonParserOptions) -> JsonParser<Collector> {
    init_logging();
    JsonParser::with_handler(options, Collector::default()).unwrap()
}

/// Writes `chunks` until the first error, then ends the parser if nothing
/// failed.
pub(crate) fn parse_chunks<C: AsRef<[u8]>>(
    options: JsonParserOptions,
    chunks: &[C],
) -> (Collector, Result<(), ParseError>) {
    let mut p = parser(options);
    let result = chunks
        .iter()
        .try_for_each(|chunk| p.write(chunk))
        .and_then(|()| p.end());
    (p.into_handler(), result)
}

/// Parses one document in a single chunk and returns every complete value.
pub(crate) fn parse_values(src: &str, options: JsonParserOptions) -> Vec<Value> {
    let (collector, result) = parse_chunks(options, &[src]);
    result.unwrap();
    collector.values()
}

pub(crate) fn from_serde(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().map(from_serde).collect())
        }
        serde_json::Value::Object(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), from_serde(v)))
                .collect::<Map>(),
        ),
    }
}

/// Parses `src` with `serde_json` into a [`Value`].
pub(crate) fn json(src: &str) -> Value {
    from_serde(serde_json::from_str(src).unwrap())
}

pub(crate) fn strings(items: &[&str]) -> Option<Vec<String>> {
    Some(items.iter().map(|&s| s.into()).collect())
}
