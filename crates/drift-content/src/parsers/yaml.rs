//! YAML parser using serde_yaml

use serde_yaml::Value as YamlValue;

use crate::error::{Error, Result};
use crate::format::{FormatKind, FormatParser, Parsed};

/// Parser for YAML documents
#[derive(Debug, Default)]
pub struct YamlParser;

impl YamlParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse YAML text straight into the JSON data model
    pub fn parse_value(&self, source: &str) -> Result<serde_json::Value> {
        let yaml_value: YamlValue =
            serde_yaml::from_str(source).map_err(|e| Error::parse("YAML", e.to_string()))?;
        Ok(yaml_to_json(&yaml_value))
    }
}

impl FormatParser for YamlParser {
    fn format(&self) -> FormatKind {
        FormatKind::Yaml
    }

    fn parse(&self, source: &str) -> Result<Parsed> {
        self.parse_value(source).map(Parsed::Structured)
    }
}

/// Convert a YAML value into the JSON data model.
///
/// Non-string mapping keys are stringified and tags are dropped.
pub fn yaml_to_json(value: &YamlValue) -> serde_json::Value {
    match value {
        YamlValue::Null => serde_json::Value::Null,
        YamlValue::Bool(b) => serde_json::Value::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_json::Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                serde_json::Value::Number(u.into())
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null)
            } else {
                serde_json::Value::Null
            }
        }
        YamlValue::String(s) => serde_json::Value::String(s.clone()),
        YamlValue::Sequence(items) => {
            serde_json::Value::Array(items.iter().map(yaml_to_json).collect())
        }
        YamlValue::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (key, value) in map {
                json_map.insert(key_to_string(key), yaml_to_json(value));
            }
            serde_json::Value::Object(json_map)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

fn key_to_string(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        YamlValue::Null => "null".to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Tagged(tagged) => key_to_string(&tagged.value),
        other => serde_json::to_string(&yaml_to_json(other)).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_yaml_key_order_is_irrelevant() {
        let parser = YamlParser::new();
        let a = parser.parse_value("b: 2\na: 1\n").unwrap();
        let b = parser.parse_value("a: 1\nb: 2\n").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_yaml_non_string_keys_are_stringified() {
        let parser = YamlParser::new();
        let value = parser.parse_value("1: one\ntrue: yes\n").unwrap();
        assert_eq!(value, json!({"1": "one", "true": "yes"}));
    }

    #[test]
    fn test_yaml_tags_are_dropped() {
        let parser = YamlParser::new();
        let value = parser.parse_value("secret: !vault plain\n").unwrap();
        assert_eq!(value, json!({"secret": "plain"}));
    }

    #[test]
    fn test_yaml_parse_error() {
        let parser = YamlParser::new();
        assert!(parser.parse("invalid: yaml: content: [unclosed").is_err());
    }

    #[test]
    fn test_empty_yaml_is_null() {
        let parser = YamlParser::new();
        assert_eq!(parser.parse("").unwrap(), Parsed::Structured(serde_json::Value::Null));
    }
}
