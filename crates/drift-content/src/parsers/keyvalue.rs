//! Line-oriented `key=value` and `key value` parsers

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::format::{FormatKind, FormatParser, Parsed};

/// Parser for `key=value` files
#[derive(Debug, Default)]
pub struct KeyValueParser;

impl KeyValueParser {
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for KeyValueParser {
    fn format(&self) -> FormatKind {
        FormatKind::KeyValue
    }

    fn parse(&self, source: &str) -> Result<Parsed> {
        parse_lines(source, "keyvalue", |line| {
            line.split_once('=')
                .ok_or("no equal sign")
        })
    }
}

/// Parser for `key value` files split on the first whitespace run
#[derive(Debug, Default)]
pub struct KeySpaceValueParser;

impl KeySpaceValueParser {
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for KeySpaceValueParser {
    fn format(&self) -> FormatKind {
        FormatKind::KeySpaceValue
    }

    fn parse(&self, source: &str) -> Result<Parsed> {
        parse_lines(source, "keyspacevalue", |line| {
            line.split_once(char::is_whitespace)
                .filter(|(_, value)| !value.trim().is_empty())
                .ok_or("expected a key and a value")
        })
    }
}

fn parse_lines<'a>(
    source: &'a str,
    format: &str,
    split: impl Fn(&'a str) -> std::result::Result<(&'a str, &'a str), &'static str>,
) -> Result<Parsed> {
    let mut entries = Map::new();
    for (idx, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = split(line)
            .map_err(|reason| Error::line(format, idx + 1, format!("{reason}: {line}")))?;
        entries.insert(key.trim().to_string(), Value::String(value.trim().to_string()));
    }
    Ok(Parsed::Structured(Value::Object(entries)))
}
