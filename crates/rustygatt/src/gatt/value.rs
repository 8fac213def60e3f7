//! Declaration fields and literal values

use crate::error::{CompileError, CompileResult};
use std::fmt;

/// One comma-separated field of a declaration line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field text, trimmed of whitespace and surrounding quotes
    pub text: String,
    /// Whether the field was written as a double-quoted string
    pub quoted: bool,
}

impl Field {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: false,
        }
    }

    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Bytes of a literal value.
    ///
    /// Quoted strings are taken verbatim. Unquoted text made only of
    /// whitespace-separated hex tokens is decoded to raw bytes; any other
    /// unquoted text is taken verbatim as well.
    pub fn literal_bytes(&self) -> CompileResult<Vec<u8>> {
        if self.quoted || !is_hex_sequence(&self.text) {
            return Ok(self.text.as_bytes().to_vec());
        }

        let mut bytes = Vec::new();
        for token in self.text.split_whitespace() {
            if token.len() <= 2 {
                bytes.push(parse_hex_byte(token)?);
            } else {
                let decoded = hex::decode(token)
                    .map_err(|e| CompileError::InvalidValue(format!("'{}': {}", token, e)))?;
                bytes.extend(decoded);
            }
        }
        Ok(bytes)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn is_hex_sequence(text: &str) -> bool {
    text.split_whitespace()
        .all(|token| token.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Parse a single hexadecimal byte, with or without a `0x` prefix
pub fn parse_hex_byte(text: &str) -> CompileResult<u8> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u8::from_str_radix(digits, 16)
        .map_err(|_| CompileError::InvalidValue(format!("'{}' is not a hex byte", text)))
}

/// Field `index` of a declaration, or a `MissingField` error
pub fn field<'a>(
    fields: &'a [Field],
    index: usize,
    keyword: &'static str,
) -> CompileResult<&'a Field> {
    fields
        .get(index)
        .ok_or(CompileError::MissingField { keyword, index })
}
