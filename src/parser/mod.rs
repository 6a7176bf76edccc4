//! GPGL Decoder
//!
//! Stream decoding of delimited GPGL text into typed commands.
//! Holds no state between calls: the caller threads the leftover record.

pub mod ast;
pub mod lexer;

pub use ast::{record_to_command, Command, RecordError};
pub use lexer::{split_records, tokenize_record, Record, RECORD_DELIMITER};

use crate::diagnostics::{Diagnostic, Diagnostics};

/// Output of one decode call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodeResult {
    /// Commands in stream order
    pub commands: Vec<Command>,
    /// Unterminated trailing record, to be prepended to the next chunk
    pub leftover: String,
    /// One entry per skipped record
    pub diagnostics: Vec<Diagnostic>,
}

/// Decode `leftover + chunk` into commands.
///
/// Records that cannot be decoded are skipped and reported in
/// `diagnostics`; decoding always continues with the next record.
pub fn decode(leftover: &str, chunk: &str) -> DecodeResult {
    let mut text = String::with_capacity(leftover.len() + chunk.len());
    text.push_str(leftover);
    text.push_str(chunk);

    let (records, partial) = lexer::split_records(&text);
    let mut commands = Vec::with_capacity(records.len());
    let mut diagnostics = Diagnostics::new();

    for (index, raw) in records.into_iter().enumerate() {
        let Some(record) = lexer::tokenize_record(raw) else {
            if !raw.trim().is_empty() {
                diagnostics.add_info(index, RecordError::MissingInstruction.to_string());
            }
            continue;
        };

        match ast::record_to_command(&record) {
            Ok(command) => commands.push(command),
            Err(err @ RecordError::UnknownInstruction(_)) => {
                diagnostics.add_info(index, err.to_string());
            }
            Err(err) => diagnostics.add_warning(index, err.to_string()),
        }
    }

    DecodeResult {
        commands,
        leftover: partial.to_string(),
        diagnostics: diagnostics.into_vec(),
    }
}

/// Caller-owned decoder state for a single stream.
///
/// Wraps [`decode`] and keeps the leftover record between chunks. One value
/// per stream; it must not be shared between streams.
#[derive(Debug, Clone, Default)]
pub struct StreamDecoder {
    leftover: String,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk of the stream
    pub fn feed(&mut self, chunk: &str) -> DecodeResult {
        let result = decode(&self.leftover, chunk);
        self.leftover.clone_from(&result.leftover);
        result
    }

    /// Text received since the last delimiter
    pub fn leftover(&self) -> &str {
        &self.leftover
    }

    /// Consume the decoder, returning any unterminated record
    pub fn finish(self) -> String {
        self.leftover
    }
}
