//! Path Reconstruction Engine
//!
//! Folds a batch of GPGL commands into path primitives. The only state is
//! the pen position, carried explicitly in [`PenState`].

use serde::Serialize;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::geometry::{Angle, Vector};
use crate::parser::Command;

/// A drawing primitive ready for a renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathPrimitive {
    MoveTo(Vector),
    LineTo(Vector),
    /// Two-point circular arc from the current point to `end`
    Arc {
        radius: f64,
        large_arc: bool,
        sweep: bool,
        end: Vector,
    },
    /// Full circle as two semicircles: current point to `opposite`, then
    /// back to `start`. Both halves use zero flags.
    FullCircleArcs {
        radius: f64,
        opposite: Vector,
        start: Vector,
    },
    CubicCurve {
        control1: Vector,
        control2: Vector,
        end: Vector,
    },
}

/// Pen state threaded through a batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenState {
    pub position: Vector,
}

impl PenState {
    /// Every batch starts here
    pub fn origin() -> Self {
        Self {
            position: Vector::ZERO,
        }
    }

    pub fn at(position: Vector) -> Self {
        Self { position }
    }
}

impl Default for PenState {
    fn default() -> Self {
        Self::origin()
    }
}

/// Trace a batch from the origin
pub fn trace(commands: &[Command]) -> Vec<PathPrimitive> {
    trace_with_diagnostics(commands).0
}

/// Trace a batch from the origin, also returning geometry warnings
pub fn trace_with_diagnostics(commands: &[Command]) -> (Vec<PathPrimitive>, Vec<Diagnostic>) {
    let mut diagnostics = Diagnostics::new();
    let mut primitives = Vec::with_capacity(commands.len());
    let mut state = PenState::origin();

    for (index, command) in commands.iter().enumerate() {
        if let Some(message) = radius_mismatch(command) {
            diagnostics.add_warning(index, message);
        }
        let (next, emitted) = step(state, command);
        primitives.extend(emitted);
        state = next;
    }

    (primitives, diagnostics.into_vec())
}

/// Apply one command to the pen state
pub fn step(state: PenState, command: &Command) -> (PenState, Vec<PathPrimitive>) {
    let position = state.position;

    match command {
        Command::Move { position: target } => {
            (PenState::at(*target), vec![PathPrimitive::MoveTo(*target)])
        }
        Command::RelativeMove { offset } => {
            let target = position + *offset;
            (PenState::at(target), vec![PathPrimitive::MoveTo(target)])
        }
        Command::Draw { points } => {
            let primitives: Vec<_> = points.iter().copied().map(PathPrimitive::LineTo).collect();
            let last = points.last().copied().unwrap_or(position);
            (PenState::at(last), primitives)
        }
        Command::RelativeDraw { offsets } => {
            let mut current = position;
            let primitives: Vec<_> = offsets
                .iter()
                .map(|offset| {
                    current = current + *offset;
                    PathPrimitive::LineTo(current)
                })
                .collect();
            (PenState::at(current), primitives)
        }
        Command::Circle {
            center,
            start_radius,
            start_angle,
            end_angle,
            ..
        } => {
            let arc = circular_arc(*center, *start_radius, *start_angle, *end_angle);
            let mut primitives = vec![PathPrimitive::MoveTo(arc.start)];
            primitives.push(arc.primitive);
            (PenState::at(arc.end), primitives)
        }
        Command::RelativeCircle {
            start_radius,
            start_angle,
            end_angle,
            ..
        } => {
            // The pen sits on the circle at the start angle.
            let center = position + start_angle.opposite().unit_vector() * *start_radius;
            let arc = circular_arc(center, *start_radius, *start_angle, *end_angle);
            (PenState::at(arc.end), vec![arc.primitive])
        }
        Command::BezierCurve {
            start,
            control1,
            control2,
            end,
        } => (
            PenState::at(*end),
            vec![
                PathPrimitive::MoveTo(*start),
                PathPrimitive::CubicCurve {
                    control1: *control1,
                    control2: *control2,
                    end: *end,
                },
            ],
        ),
    }
}

struct TracedArc {
    start: Vector,
    end: Vector,
    primitive: PathPrimitive,
}

/// Arc geometry shared by absolute and relative circles
fn circular_arc(center: Vector, radius: f64, start_angle: Angle, end_angle: Angle) -> TracedArc {
    let delta = start_angle.degree_delta(end_angle);
    let start = center + start_angle.unit_vector() * radius;

    if delta.abs() >= 360.0 {
        let opposite = center + start_angle.opposite().unit_vector() * radius;
        return TracedArc {
            start,
            end: start,
            primitive: PathPrimitive::FullCircleArcs {
                radius,
                opposite,
                start,
            },
        };
    }

    let end = center + end_angle.unit_vector() * radius;
    // Inverted on purpose: the renderer swaps x and y, which mirrors the
    // arc's orientation back.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    let sweep = !(delta < 0.0);
    TracedArc {
        start,
        end,
        primitive: PathPrimitive::Arc {
            radius,
            large_arc: delta.abs() > 180.0,
            sweep,
            end,
        },
    }
}

fn radius_mismatch(command: &Command) -> Option<String> {
    let (start_radius, end_radius) = match command {
        Command::Circle {
            start_radius,
            end_radius,
            ..
        }
        | Command::RelativeCircle {
            start_radius,
            end_radius,
            ..
        } => (*start_radius, *end_radius),
        _ => return None,
    };

    (start_radius != end_radius).then(|| {
        format!(
            "Arc radius changes from {} to {}; spirals are unsupported, drawing with radius {}",
            start_radius, end_radius, start_radius
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Vector, expected: Vector) {
        assert!(
            (actual.x - expected.x).abs() < 1e-9 && (actual.y - expected.y).abs() < 1e-9,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn test_move_sets_position() {
        let (state, primitives) = step(
            PenState::origin(),
            &Command::Move {
                position: Vector::new(3.0, 4.0),
            },
        );
        assert_eq!(state.position, Vector::new(3.0, 4.0));
        assert_eq!(primitives, vec![PathPrimitive::MoveTo(Vector::new(3.0, 4.0))]);
    }

    #[test]
    fn test_relative_move_adds_offset() {
        let (state, primitives) = step(
            PenState::at(Vector::new(1.0, 1.0)),
            &Command::RelativeMove {
                offset: Vector::new(2.0, -3.0),
            },
        );
        assert_eq!(state.position, Vector::new(3.0, -2.0));
        assert_eq!(primitives, vec![PathPrimitive::MoveTo(Vector::new(3.0, -2.0))]);
    }

    #[test]
    fn test_draw_from_origin() {
        let (state, primitives) = step(
            PenState::origin(),
            &Command::Draw {
                points: vec![Vector::new(0.0, 0.0), Vector::new(10.0, 0.0)],
            },
        );
        assert_eq!(
            primitives,
            vec![
                PathPrimitive::LineTo(Vector::new(0.0, 0.0)),
                PathPrimitive::LineTo(Vector::new(10.0, 0.0)),
            ]
        );
        assert_eq!(state.position, Vector::new(10.0, 0.0));
    }

    #[test]
    fn test_empty_draw_keeps_position() {
        let start = PenState::at(Vector::new(7.0, 7.0));
        let (state, primitives) = step(start, &Command::Draw { points: vec![] });
        assert!(primitives.is_empty());
        assert_eq!(state, start);
    }

    #[test]
    fn test_relative_draw_accumulates() {
        let (state, primitives) = step(
            PenState::at(Vector::new(1.0, 1.0)),
            &Command::RelativeDraw {
                offsets: vec![Vector::new(5.0, 0.0), Vector::new(0.0, 5.0)],
            },
        );
        assert_eq!(
            primitives,
            vec![
                PathPrimitive::LineTo(Vector::new(6.0, 1.0)),
                PathPrimitive::LineTo(Vector::new(6.0, 6.0)),
            ]
        );
        assert_eq!(state.position, Vector::new(6.0, 6.0));
    }

    #[test]
    fn test_quarter_circle() {
        let (state, primitives) = step(
            PenState::origin(),
            &Command::Circle {
                center: Vector::new(0.0, 0.0),
                start_radius: 10.0,
                end_radius: 10.0,
                start_angle: Angle::new(0),
                end_angle: Angle::new(900),
            },
        );

        assert_eq!(primitives.len(), 2);
        assert_eq!(primitives[0], PathPrimitive::MoveTo(Vector::new(10.0, 0.0)));
        match &primitives[1] {
            PathPrimitive::Arc {
                radius,
                large_arc,
                sweep,
                end,
            } => {
                assert_eq!(*radius, 10.0);
                assert!(!large_arc);
                assert!(sweep);
                assert_close(*end, Vector::new(0.0, 10.0));
            }
            other => panic!("Expected arc, got {:?}", other),
        }
        assert_close(state.position, Vector::new(0.0, 10.0));
    }

    #[test]
    fn test_large_arc_flag() {
        let (_, primitives) = step(
            PenState::origin(),
            &Command::Circle {
                center: Vector::ZERO,
                start_radius: 10.0,
                end_radius: 10.0,
                start_angle: Angle::new(0),
                end_angle: Angle::new(2700),
            },
        );
        assert!(matches!(
            primitives[1],
            PathPrimitive::Arc {
                large_arc: true,
                sweep: true,
                ..
            }
        ));
    }

    #[test]
    fn test_full_circle_emits_two_semicircles() {
        let (state, primitives) = step(
            PenState::origin(),
            &Command::Circle {
                center: Vector::new(100.0, 0.0),
                start_radius: 10.0,
                end_radius: 10.0,
                start_angle: Angle::new(0),
                end_angle: Angle::new(3600),
            },
        );

        assert_eq!(primitives[0], PathPrimitive::MoveTo(Vector::new(110.0, 0.0)));
        match &primitives[1] {
            PathPrimitive::FullCircleArcs {
                radius,
                opposite,
                start,
            } => {
                assert_eq!(*radius, 10.0);
                assert_close(*opposite, Vector::new(90.0, 0.0));
                assert_close(*start, Vector::new(110.0, 0.0));
            }
            other => panic!("Expected full circle, got {:?}", other),
        }
        assert_eq!(state.position, Vector::new(110.0, 0.0));
    }

    #[test]
    fn test_relative_circle_derives_center() {
        let (state, primitives) = step(
            PenState::origin(),
            &Command::RelativeCircle {
                start_radius: 10.0,
                end_radius: 10.0,
                start_angle: Angle::new(0),
                end_angle: Angle::new(900),
            },
        );

        // Center is (-10, 0): the end point at 90 degrees is (-10, 10).
        assert_eq!(primitives.len(), 1);
        match &primitives[0] {
            PathPrimitive::Arc { end, .. } => assert_close(*end, Vector::new(-10.0, 10.0)),
            other => panic!("Expected arc, got {:?}", other),
        }
        assert_close(state.position, Vector::new(-10.0, 10.0));
    }

    #[test]
    fn test_relative_full_circle_returns_to_pen() {
        let (state, primitives) = step(
            PenState::at(Vector::new(5.0, 5.0)),
            &Command::RelativeCircle {
                start_radius: 20.0,
                end_radius: 20.0,
                start_angle: Angle::new(900),
                end_angle: Angle::new(4500),
            },
        );
        assert_eq!(primitives.len(), 1);
        match &primitives[0] {
            PathPrimitive::FullCircleArcs {
                opposite, start, ..
            } => {
                assert_close(*start, Vector::new(5.0, 5.0));
                assert_close(*opposite, Vector::new(5.0, -35.0));
            }
            other => panic!("Expected full circle, got {:?}", other),
        }
        assert_close(state.position, Vector::new(5.0, 5.0));
    }

    #[test]
    fn test_bezier_moves_then_curves() {
        let (state, primitives) = step(
            PenState::origin(),
            &Command::BezierCurve {
                start: Vector::new(1.0, 1.0),
                control1: Vector::new(2.0, 2.0),
                control2: Vector::new(3.0, 3.0),
                end: Vector::new(4.0, 4.0),
            },
        );
        assert_eq!(
            primitives,
            vec![
                PathPrimitive::MoveTo(Vector::new(1.0, 1.0)),
                PathPrimitive::CubicCurve {
                    control1: Vector::new(2.0, 2.0),
                    control2: Vector::new(3.0, 3.0),
                    end: Vector::new(4.0, 4.0),
                },
            ]
        );
        assert_eq!(state.position, Vector::new(4.0, 4.0));
    }

    #[test]
    fn test_radius_mismatch_warns_and_uses_start_radius() {
        let commands = vec![Command::Circle {
            center: Vector::ZERO,
            start_radius: 10.0,
            end_radius: 20.0,
            start_angle: Angle::new(0),
            end_angle: Angle::new(1800),
        }];

        let (primitives, diagnostics) = trace_with_diagnostics(&commands);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].record, 0);
        match &primitives[1] {
            PathPrimitive::Arc { radius, end, .. } => {
                assert_eq!(*radius, 10.0);
                assert_close(*end, Vector::new(-10.0, 0.0));
            }
            other => panic!("Expected arc, got {:?}", other),
        }
    }

    #[test]
    fn test_trace_starts_every_batch_at_origin() {
        let batch = vec![Command::RelativeMove {
            offset: Vector::new(5.0, 5.0),
        }];
        assert_eq!(trace(&batch), trace(&batch));
        assert_eq!(trace(&batch), vec![PathPrimitive::MoveTo(Vector::new(5.0, 5.0))]);
    }
}
