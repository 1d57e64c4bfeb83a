//! INI parser
//!
//! Produces `{section: {key: value}}`. Keys are lower-cased, `=` or `:`
//! delimits, keys without a value map to `""`, indented lines continue the
//! previous value and `[DEFAULT]` entries are inherited by every section.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::format::{FormatKind, FormatParser, Parsed};

const DEFAULT_SECTION: &str = "DEFAULT";

/// Parser for INI files
#[derive(Debug, Default)]
pub struct IniParser;

impl IniParser {
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for IniParser {
    fn format(&self) -> FormatKind {
        FormatKind::Ini
    }

    fn parse(&self, source: &str) -> Result<Parsed> {
        parse_ini(source).map(Parsed::Structured)
    }
}

fn parse_ini(source: &str) -> Result<Value> {
    let mut defaults: Map<String, Value> = Map::new();
    let mut sections: Vec<(String, Map<String, Value>)> = Vec::new();
    // Index into `sections`, or None while inside [DEFAULT]
    let mut current: Option<Option<usize>> = None;
    let mut last_key: Option<String> = None;

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim_end_matches('\r');
        let trimmed = line.trim();

        if trimmed.is_empty() {
            last_key = None;
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indented = line.starts_with(' ') || line.starts_with('\t');
        if indented && let (Some(section), Some(key)) = (current, last_key.as_ref()) {
            let entries = section_entries(&mut defaults, &mut sections, section);
            if let Some(Value::String(existing)) = entries.get_mut(key) {
                if existing.is_empty() {
                    existing.push_str(trimmed);
                } else {
                    existing.push('\n');
                    existing.push_str(trimmed);
                }
            }
            continue;
        }

        if let Some(name) = trimmed.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            let name = name.trim();
            last_key = None;
            if name == DEFAULT_SECTION {
                current = Some(None);
            } else if let Some(pos) = sections.iter().position(|(n, _)| n == name) {
                current = Some(Some(pos));
            } else {
                sections.push((name.to_string(), Map::new()));
                current = Some(Some(sections.len() - 1));
            }
            continue;
        }

        let Some(section) = current else {
            return Err(Error::line("INI", line_no, "key outside of any section"));
        };

        let (key, value) = match trimmed.find(['=', ':']) {
            Some(pos) => (&trimmed[..pos], strip_inline_comment(trimmed[pos + 1..].trim())),
            None => (trimmed, ""),
        };
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return Err(Error::line("INI", line_no, "empty key"));
        }

        let entries = section_entries(&mut defaults, &mut sections, section);
        entries.insert(key.clone(), Value::String(value.to_string()));
        last_key = Some(key);
    }

    let mut root = Map::new();
    for (name, entries) in sections {
        let mut merged = defaults.clone();
        merged.extend(entries);
        root.insert(name, Value::Object(merged));
    }
    Ok(Value::Object(root))
}

fn section_entries<'a>(
    defaults: &'a mut Map<String, Value>,
    sections: &'a mut [(String, Map<String, Value>)],
    section: Option<usize>,
) -> &'a mut Map<String, Value> {
    match section {
        Some(pos) => &mut sections[pos].1,
        None => defaults,
    }
}

/// Drop a trailing `;` comment that is preceded by whitespace
fn strip_inline_comment(value: &str) -> &str {
    value
        .char_indices()
        .find(|&(i, c)| c == ';' && i > 0 && value[..i].ends_with([' ', '\t']))
        .map(|(i, _)| value[..i].trim_end())
        .unwrap_or(value)
}
