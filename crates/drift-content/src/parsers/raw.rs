//! Raw text "parser": whitespace tokenization only

use crate::error::Result;
use crate::format::{FormatKind, FormatParser, Parsed};

/// Splits raw text into whitespace-separated tokens
#[derive(Debug, Default)]
pub struct RawParser;

impl RawParser {
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for RawParser {
    fn format(&self) -> FormatKind {
        FormatKind::Raw
    }

    fn parse(&self, source: &str) -> Result<Parsed> {
        Ok(Parsed::Tokens(
            source.split_whitespace().map(str::to_string).collect(),
        ))
    }
}
