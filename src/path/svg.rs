//! SVG Output
//!
//! Serializes path primitives as SVG path data. SVG's x axis is the
//! plotter's y axis (and vice versa), and coordinates are written in
//! millimetres.

use serde::Deserialize;
use svg::node::element::path::Data;
use svg::node::element::Path;
use svg::node::Value;
use svg::Document;

use crate::geometry::Vector;
use crate::path::engine::PathPrimitive;

/// Plotter device units per millimetre
pub const UNITS_PER_MM: f64 = 20.0;

/// Page and stroke settings for standalone documents
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SvgOptions {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub stroke_width_mm: f64,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            stroke_width_mm: 0.3,
        }
    }
}

/// Append one batch to `data` as a subpath.
///
/// A batch always begins at the pen origin, so a batch whose first primitive
/// draws gets an explicit `M0,0` first.
pub fn append_batch(mut data: Data, primitives: &[PathPrimitive]) -> Data {
    if let Some(first) = primitives.first() {
        if !matches!(first, PathPrimitive::MoveTo(_)) {
            data = data.move_to(point(Vector::ZERO));
        }
    }

    primitives.iter().fold(data, |data, primitive| match primitive {
        PathPrimitive::MoveTo(p) => data.move_to(point(*p)),
        PathPrimitive::LineTo(p) => data.line_to(point(*p)),
        PathPrimitive::Arc {
            radius,
            large_arc,
            sweep,
            end,
        } => data.elliptical_arc_to(arc(*radius, *large_arc, *sweep, *end)),
        PathPrimitive::FullCircleArcs {
            radius,
            opposite,
            start,
        } => data
            .elliptical_arc_to(arc(*radius, false, false, *opposite))
            .elliptical_arc_to(arc(*radius, false, false, *start)),
        PathPrimitive::CubicCurve {
            control1,
            control2,
            end,
        } => {
            let mut parameters = point(*control1);
            parameters.extend(point(*control2));
            parameters.extend(point(*end));
            data.cubic_curve_to(parameters)
        }
    })
}

/// SVG `d` attribute for one batch
pub fn to_path_data(primitives: &[PathPrimitive]) -> String {
    Value::from(append_batch(Data::new(), primitives)).to_string()
}

/// Standalone SVG document with a single `<path>` for one batch
pub fn to_document(primitives: &[PathPrimitive], options: &SvgOptions) -> String {
    to_combined_document([primitives], options)
}

/// Standalone SVG document with every non-empty batch as a subpath of a
/// single `<path>`
pub fn to_combined_document<'a>(
    batches: impl IntoIterator<Item = &'a [PathPrimitive]>,
    options: &SvgOptions,
) -> String {
    let mut drawn = false;
    let data = batches
        .into_iter()
        .filter(|batch| !batch.is_empty())
        .fold(Data::new(), |data, batch| {
            drawn = true;
            append_batch(data, batch)
        });

    let width = mm(options.page_width_mm);
    let height = mm(options.page_height_mm);
    let mut document = Document::new()
        .set("width", format!("{}mm", width))
        .set("height", format!("{}mm", height))
        .set("viewBox", format!("0 0 {} {}", width, height));

    if drawn {
        let path = Path::new()
            .set("fill", "none")
            .set("stroke", "black")
            .set("stroke-width", mm(options.stroke_width_mm).to_string())
            .set("d", data);
        document = document.add(path);
    }

    format!("{}\n", document)
}

/// Device point to SVG parameters, axes exchanged
fn point(p: Vector) -> Vec<f32> {
    vec![length(p.y), length(p.x)]
}

fn arc(radius: f64, large_arc: bool, sweep: bool, end: Vector) -> Vec<f32> {
    let r = length(radius);
    let mut parameters = vec![r, r, 0.0, flag(large_arc), flag(sweep)];
    parameters.extend(point(end));
    parameters
}

fn length(units: f64) -> f32 {
    mm(units / UNITS_PER_MM)
}

fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}

/// At most three decimals, no negative zero
fn mm(value: f64) -> f32 {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 { 0.0 } else { rounded as f32 }
}
