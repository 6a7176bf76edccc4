//! GPGL Command Model
//!
//! Typed commands built from lexed records. Every supported plotter
//! instruction maps to exactly one variant.

use std::fmt;

use serde::Serialize;

use crate::geometry::{Angle, Vector};
use crate::parser::lexer::Record;

/// A decoded plotter command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    /// `M`: move the pen to an absolute position
    Move { position: Vector },
    /// `O`: move the pen by an offset
    RelativeMove { offset: Vector },
    /// `D`: draw lines through absolute points
    Draw { points: Vec<Vector> },
    /// `E`: draw lines through successive offsets
    RelativeDraw { offsets: Vec<Vector> },
    /// `W`: arc around an explicit center
    Circle {
        center: Vector,
        start_radius: f64,
        end_radius: f64,
        start_angle: Angle,
        end_angle: Angle,
    },
    /// `]`: arc whose start point is the current pen position
    RelativeCircle {
        start_radius: f64,
        end_radius: f64,
        start_angle: Angle,
        end_angle: Angle,
    },
    /// `BZ`: cubic bezier curve
    BezierCurve {
        start: Vector,
        control1: Vector,
        control2: Vector,
        end: Vector,
    },
}

/// Why a record did not produce a command
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    /// Blank record or a record starting with a number
    MissingInstruction,
    UnknownInstruction(String),
    InvalidNumber { instruction: String, token: String },
    MissingParameters {
        instruction: String,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::MissingInstruction => write!(f, "Record has no instruction"),
            RecordError::UnknownInstruction(code) => {
                write!(f, "Unknown instruction '{}'", code)
            }
            RecordError::InvalidNumber { instruction, token } => write!(
                f,
                "Invalid number '{}' in '{}' record",
                token, instruction
            ),
            RecordError::MissingParameters {
                instruction,
                expected,
                found,
            } => write!(
                f,
                "Instruction '{}' needs {} parameters, found {}",
                instruction, expected, found
            ),
        }
    }
}

impl std::error::Error for RecordError {}

/// Build a command from a lexed record
pub fn record_to_command(record: &Record<'_>) -> Result<Command, RecordError> {
    let instruction = record.instruction;

    // Unknown codes are rejected before their parameters are looked at.
    if !matches!(instruction, "D" | "E" | "M" | "O" | "W" | "]" | "BZ") {
        return Err(RecordError::UnknownInstruction(instruction.to_string()));
    }

    let params = parse_params(record)?;

    let command = match instruction {
        "D" => Command::Draw {
            points: pair_up(&params),
        },
        "E" => Command::RelativeDraw {
            offsets: pair_up(&params),
        },
        "M" => {
            let p = take::<2>(instruction, &params)?;
            Command::Move {
                position: vector(p[0], p[1]),
            }
        }
        "O" => {
            let p = take::<2>(instruction, &params)?;
            Command::RelativeMove {
                offset: vector(p[0], p[1]),
            }
        }
        "W" => {
            let p = take::<6>(instruction, &params)?;
            Command::Circle {
                center: vector(p[0], p[1]),
                start_radius: p[2] as f64,
                end_radius: p[3] as f64,
                start_angle: Angle::new(p[4]),
                end_angle: Angle::new(p[5]),
            }
        }
        "]" => {
            let p = take::<4>(instruction, &params)?;
            Command::RelativeCircle {
                start_radius: p[0] as f64,
                end_radius: p[1] as f64,
                start_angle: Angle::new(p[2]),
                end_angle: Angle::new(p[3]),
            }
        }
        "BZ" => {
            // The leading parameter's effect on the plotter is unknown; it is ignored.
            let p = take::<9>(instruction, &params)?;
            Command::BezierCurve {
                start: vector(p[1], p[2]),
                control1: vector(p[3], p[4]),
                control2: vector(p[5], p[6]),
                end: vector(p[7], p[8]),
            }
        }
        _ => return Err(RecordError::UnknownInstruction(instruction.to_string())),
    };

    Ok(command)
}

/// Parse every parameter token as a base-10 integer.
///
/// A single malformed token rejects the whole record.
fn parse_params(record: &Record<'_>) -> Result<Vec<i64>, RecordError> {
    record
        .param_tokens()
        .into_iter()
        .map(|token| {
            token
                .parse::<i64>()
                .map_err(|_| RecordError::InvalidNumber {
                    instruction: record.instruction.to_string(),
                    token: token.to_string(),
                })
        })
        .collect()
}

/// Group values two at a time into vectors.
///
/// An odd trailing value is dropped. This is inherited plotter-driver
/// behaviour and is kept as-is.
fn pair_up(values: &[i64]) -> Vec<Vector> {
    values
        .chunks_exact(2)
        .map(|pair| vector(pair[0], pair[1]))
        .collect()
}

/// The first `N` values of a fixed-arity instruction; extras are ignored
fn take<const N: usize>(instruction: &str, values: &[i64]) -> Result<[i64; N], RecordError> {
    values
        .get(..N)
        .and_then(|head| <[i64; N]>::try_from(head).ok())
        .ok_or_else(|| RecordError::MissingParameters {
            instruction: instruction.to_string(),
            expected: N,
            found: values.len(),
        })
}

fn vector(x: i64, y: i64) -> Vector {
    Vector::new(x as f64, y as f64)
}
