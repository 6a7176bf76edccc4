//! Diagnostics
//!
//! Non-fatal findings from decoding and tracing. Nothing here aborts a batch;
//! diagnostics only describe what was skipped or approximated.

use serde::Serialize;

/// Severity of a diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A finding attached to one record (decoder) or one command (engine)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// 0-based index of the record or command within its batch
    pub record: usize,
    pub message: String,
    pub severity: Severity,
}

/// Accumulates diagnostics for a single decode or trace call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn add_warning(&mut self, record: usize, message: String) {
        log::warn!("record {}: {}", record, message);
        self.items.push(Diagnostic {
            record,
            message,
            severity: Severity::Warning,
        });
    }

    pub fn add_info(&mut self, record: usize, message: String) {
        log::debug!("record {}: {}", record, message);
        self.items.push(Diagnostic {
            record,
            message,
            severity: Severity::Info,
        });
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
