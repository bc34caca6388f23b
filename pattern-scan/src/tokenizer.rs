//! Turns input lines into detector tokens.
//!
//! Blank lines and `#` comments are ignored. When an extract pattern is set,
//! lines it does not match are ignored as well and only the captured text is
//! parsed.

use regex::Regex;

use crate::error::Result;
use crate::settings::{ScanSettings, TokenFormat};

/// Outcome of parsing one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineToken {
    Token(u64),
    /// Nothing to scan on this line
    Ignored,
    /// The line should hold a token but could not be parsed
    Invalid,
}

#[derive(Debug, Clone)]
pub struct TokenParser {
    format: TokenFormat,
    extract: Option<Regex>,
}

impl TokenParser {
    pub fn new(format: TokenFormat, extract_pattern: Option<&str>) -> Result<Self> {
        let extract = match extract_pattern {
            Some(pattern) => Some(Regex::new(pattern)?),
            None => None,
        };
        Ok(Self { format, extract })
    }

    pub fn from_settings(settings: &ScanSettings) -> Result<Self> {
        Self::new(settings.token_format, settings.extract_pattern.as_deref())
    }

    pub fn parse_line(&self, line: &str) -> LineToken {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return LineToken::Ignored;
        }

        let text = match &self.extract {
            Some(re) => match re.captures(trimmed) {
                Some(caps) => match caps.get(1).or_else(|| caps.get(0)) {
                    Some(m) => m.as_str().trim(),
                    None => return LineToken::Ignored,
                },
                None => return LineToken::Ignored,
            },
            None => trimmed,
        };

        match parse_token(text, self.format) {
            Some(token) => LineToken::Token(token),
            None => LineToken::Invalid,
        }
    }
}

/// Parse a single token in the given format.
pub fn parse_token(text: &str, format: TokenFormat) -> Option<u64> {
    match format {
        TokenFormat::Decimal => parse_decimal(text),
        TokenFormat::Hex => parse_hex(text),
        TokenFormat::Text => Some(hash_text(text)),
        TokenFormat::Auto => {
            if has_hex_prefix(text) {
                parse_hex(text).or_else(|| Some(hash_text(text)))
            } else {
                parse_decimal(text).or_else(|| Some(hash_text(text)))
            }
        }
    }
}

fn has_hex_prefix(text: &str) -> bool {
    text.starts_with("0x") || text.starts_with("0X")
}

/// Unsigned decimal, or a negative value kept as its two's complement bits.
fn parse_decimal(text: &str) -> Option<u64> {
    text.parse::<u64>()
        .ok()
        .or_else(|| text.parse::<i64>().ok().map(|v| v as u64))
}

fn parse_hex(text: &str) -> Option<u64> {
    let digits = if has_hex_prefix(text) { &text[2..] } else { text };
    u64::from_str_radix(digits, 16).ok()
}

fn hash_text(text: &str) -> u64 {
    u64::from(crc32fast::hash(text.as_bytes()))
}
