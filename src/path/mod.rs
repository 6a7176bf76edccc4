//! Path Reconstruction
//!
//! Turns decoded commands into renderer-ready path primitives.

pub mod engine;
pub mod svg;

pub use engine::{step, trace, trace_with_diagnostics, PathPrimitive, PenState};
pub use self::svg::{append_batch, to_combined_document, to_document, to_path_data, SvgOptions};
