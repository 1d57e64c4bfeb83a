//! JSON parser using serde_json

use crate::error::{Error, Result};
use crate::format::{FormatKind, FormatParser, Parsed};

/// Parser for JSON documents
#[derive(Debug, Default)]
pub struct JsonParser;

impl JsonParser {
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for JsonParser {
    fn format(&self) -> FormatKind {
        FormatKind::Json
    }

    fn parse(&self, source: &str) -> Result<Parsed> {
        let value: serde_json::Value =
            serde_json::from_str(source).map_err(|e| Error::parse("JSON", e.to_string()))?;
        Ok(Parsed::Structured(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_parse() {
        let parsed = JsonParser::new().parse(r#"{"port": 8080, "hosts": ["a", "b"]}"#).unwrap();
        assert_eq!(parsed, Parsed::Structured(json!({"port": 8080, "hosts": ["a", "b"]})));
    }

    #[test]
    fn test_json_parse_error() {
        let err = JsonParser::new().parse("{\"port\": }").unwrap_err();
        assert!(err.to_string().contains("JSON"));
    }
}
