//! GPGL Decoder
//!
//! Decodes plotter GPGL streams and reconstructs the drawing as path
//! primitives.
//!
//! This library provides:
//! - Streaming GPGL record decoding with caller-threaded leftover text
//! - Typed plotter commands
//! - Path reconstruction, including full and relative circles
//! - SVG path output and a stream host for files, stdin and TCP

pub mod config;
pub mod diagnostics;
pub mod geometry;
pub mod host;
pub mod parser;
pub mod path;

// Re-exports for clean public API
pub use config::Config;
pub use diagnostics::{Diagnostic, Severity};
pub use geometry::{Angle, Vector};
pub use parser::{decode, Command, DecodeResult, StreamDecoder};
pub use path::{trace, PathPrimitive, PenState};
