//! GPGL Lexer
//!
//! Splits delimited GPGL text into records and each record into an
//! instruction code and its raw parameter tokens. No numeric parsing here.

use regex::Regex;
use std::sync::LazyLock;

/// Control byte terminating every GPGL record
pub const RECORD_DELIMITER: char = '\x03';

/// Leading instruction, then an optional single space (extended protocol),
/// then the parameter list.
static RECORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*([^\s0-9,+\-]+) ?(.*)$").expect("record pattern is valid")
});

/// A single complete record split into its parts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record<'a> {
    /// Instruction code (e.g. "D", "]", "BZ")
    pub instruction: &'a str,
    /// Everything after the instruction, still comma separated
    pub params: &'a str,
}

impl<'a> Record<'a> {
    /// Raw parameter tokens, trimmed. An empty parameter list yields no tokens.
    pub fn param_tokens(&self) -> Vec<&'a str> {
        if self.params.trim().is_empty() {
            return Vec::new();
        }
        self.params.split(',').map(str::trim).collect()
    }
}

/// Split text into complete records and the trailing partial record.
///
/// The partial record is everything after the last delimiter and is empty
/// when the text ends exactly on a boundary.
pub fn split_records(text: &str) -> (Vec<&str>, &str) {
    match text.rfind(RECORD_DELIMITER) {
        Some(idx) => {
            let complete = text[..idx].split(RECORD_DELIMITER).collect();
            (complete, &text[idx + RECORD_DELIMITER.len_utf8()..])
        }
        None => (Vec::new(), text),
    }
}

/// Locate the instruction code of a record.
///
/// Returns `None` for blank records and records that start with a number.
pub fn tokenize_record(record: &str) -> Option<Record<'_>> {
    let captures = RECORD_PATTERN.captures(record)?;
    let instruction = captures.get(1)?.as_str();
    let params = captures.get(2).map_or("", |m| m.as_str());
    Some(Record {
        instruction,
        params,
    })
}
