//! Style Compositor Module
//!
//! Paints the base matrix onto a surface: background fill, shaped data
//! modules, finder-pattern corners and an optional foreground gradient.
//! Runs for every generation; callers that supply no style get
//! [`StyleOptions::default`], so raster and vector materialization share
//! this one code path.

use crate::encoder::ModuleMatrix;
use crate::error::Result;
use crate::models::{CornerShape, DotShape, Gradient, GradientDirection, StyleOptions};
use crate::render::{fmt_num, RasterSurface, Surface, VectorDocument};

/// Deterministic id of the foreground gradient def.
const GRADIENT_ID: &str = "fg-gradient";

// == Module Grid ==
/// Pixel layout of the module grid on a surface, quiet zone included.
struct GridLayout {
    scale: f32,
    margin: u32,
}

impl GridLayout {
    fn new(target: u32, matrix: &ModuleMatrix, margin: u32) -> Self {
        let total = (matrix.size() + 2 * margin) as f32;
        Self {
            scale: target as f32 / total,
            margin,
        }
    }

    /// Pixel bounds `(x0, y0, x1, y1)` of the module cell at `(x, y)`.
    fn cell(&self, x: u32, y: u32) -> (f32, f32, f32, f32) {
        let x0 = (self.margin + x) as f32 * self.scale;
        let y0 = (self.margin + y) as f32 * self.scale;
        (x0, y0, x0 + self.scale, y0 + self.scale)
    }
}

// == Style Compositor ==
/// Applies background, module shaping and gradient onto a surface.
///
/// The surface dimensions are never changed.
pub fn apply(
    surface: &mut Surface,
    matrix: &ModuleMatrix,
    style: &StyleOptions,
    margin: u32,
) -> Result<()> {
    match surface {
        Surface::Raster(raster) => apply_raster(raster, matrix, style, margin),
        Surface::Vector(vector) => apply_vector(vector, matrix, style, margin),
    }
    Ok(())
}

/// Shape drawn for a module at `(x, y)`: finder patterns follow the
/// corner shape, data modules follow the dot shape.
fn module_shape(matrix: &ModuleMatrix, style: &StyleOptions, x: u32, y: u32) -> DotShape {
    if matrix.in_finder_pattern(x, y) {
        match style.corner_shape {
            CornerShape::Square => DotShape::Square,
            CornerShape::Rounded => DotShape::Rounded,
        }
    } else {
        style.dot_shape
    }
}

// == Raster Path ==
fn apply_raster(raster: &mut RasterSurface, matrix: &ModuleMatrix, style: &StyleOptions, margin: u32) {
    let layout = GridLayout::new(raster.width(), matrix, margin);
    let (width, height) = (raster.width() as f32, raster.height() as f32);

    raster.fill(style.background);

    for y in 0..matrix.size() {
        for x in 0..matrix.size() {
            if !matrix.get(x as i64, y as i64) {
                continue;
            }
            let (x0, y0, x1, y1) = layout.cell(x, y);
            let px0 = x0.round() as i64;
            let py0 = y0.round() as i64;
            let pw = (x1.round() as i64 - px0).max(0) as u32;
            let ph = (y1.round() as i64 - py0).max(0) as u32;
            if pw == 0 || ph == 0 {
                continue;
            }

            let color = match &style.gradient {
                Some(gradient) => {
                    let t =
                        gradient.axis_position((x0 + x1) / 2.0, (y0 + y1) / 2.0, width, height);
                    gradient.color_at(t)
                }
                None => style.foreground,
            };

            match module_shape(matrix, style, x, y) {
                DotShape::Square => raster.fill_rect(px0, py0, pw, ph, color),
                DotShape::Rounded => {
                    raster.fill_rounded_rect(px0, py0, pw, ph, layout.scale * 0.3, color)
                }
                DotShape::Circle => raster.fill_circle(
                    (x0 + x1) / 2.0,
                    (y0 + y1) / 2.0,
                    layout.scale / 2.0,
                    color,
                ),
            }
        }
    }

    if style.border_radius > 0 {
        raster.round_corners(style.border_radius as f32);
    }
}

// == Vector Path ==
fn apply_vector(vector: &mut VectorDocument, matrix: &ModuleMatrix, style: &StyleOptions, margin: u32) {
    let layout = GridLayout::new(vector.width(), matrix, margin);
    let (width, height) = (vector.width(), vector.height());

    let foreground_fill = match &style.gradient {
        Some(gradient) => {
            vector.push_def(gradient_def(gradient, width, height));
            format!("url(#{})", GRADIENT_ID)
        }
        None => style.foreground.to_hex(),
    };

    let rx_attr = if style.border_radius > 0 {
        format!(" rx=\"{}\"", style.border_radius)
    } else {
        String::new()
    };
    vector.push(format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"{}/>",
        style.background.to_hex(),
        rx_attr
    ));

    let mut modules = format!("<g fill=\"{}\">", foreground_fill);
    for y in 0..matrix.size() {
        for x in 0..matrix.size() {
            if !matrix.get(x as i64, y as i64) {
                continue;
            }
            let (x0, y0, x1, y1) = layout.cell(x, y);
            let element = match module_shape(matrix, style, x, y) {
                DotShape::Square => format!(
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/>",
                    fmt_num(x0),
                    fmt_num(y0),
                    fmt_num(x1 - x0),
                    fmt_num(y1 - y0)
                ),
                DotShape::Rounded => format!(
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\"/>",
                    fmt_num(x0),
                    fmt_num(y0),
                    fmt_num(x1 - x0),
                    fmt_num(y1 - y0),
                    fmt_num(layout.scale * 0.3)
                ),
                DotShape::Circle => format!(
                    "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"/>",
                    fmt_num((x0 + x1) / 2.0),
                    fmt_num((y0 + y1) / 2.0),
                    fmt_num(layout.scale / 2.0)
                ),
            };
            modules.push_str(&element);
        }
    }
    modules.push_str("</g>");
    vector.push(modules);
}

/// Builds the foreground gradient def in user-space coordinates so one
/// gradient spans the whole module grid.
fn gradient_def(gradient: &Gradient, width: u32, height: u32) -> String {
    let (x2, y2) = match gradient.direction {
        GradientDirection::Horizontal => (width, 0),
        GradientDirection::Vertical => (0, height),
        GradientDirection::Diagonal => (width, height),
    };
    format!(
        "<linearGradient id=\"{}\" gradientUnits=\"userSpaceOnUse\" x1=\"0\" y1=\"0\" x2=\"{}\" y2=\"{}\">\
         <stop offset=\"0\" stop-color=\"{}\"/><stop offset=\"1\" stop-color=\"{}\"/>\
         </linearGradient>",
        GRADIENT_ID,
        x2,
        y2,
        gradient.start.to_hex(),
        gradient.end.to_hex()
    )
}
