//! Overlay Compositor Module
//!
//! Embeds a logo image centered on a finished surface, with optional
//! background box, border, circular clipping and opacity. Loading the
//! image is the pipeline's only suspension point.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::imageops::FilterType;
use image::RgbaImage;
#[cfg(test)]
use image::ImageFormat;

use crate::error::{GenerateError, Result};
use crate::models::{Color, OverlayOptions, OverlayShape};
use crate::render::{fmt_num, RasterSurface, Surface, VectorDocument};

/// Deterministic id of the overlay clip path def.
const CLIP_ID: &str = "overlay-clip";

// == Placement ==
/// Resolved geometry of an overlay on a surface.
///
/// The image is always centered; the background/border box insets the
/// image position by the configured margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPlacement {
    /// Image top-left
    pub x: i64,
    pub y: i64,
    /// Image edge length
    pub size: u32,
    /// Background/border box top-left
    pub box_x: i64,
    pub box_y: i64,
    /// Background/border box edge length
    pub box_size: u32,
}

/// Computes centered placement for an overlay on a `w`×`h` surface.
pub fn placement(width: u32, height: u32, options: &OverlayOptions) -> OverlayPlacement {
    let size = options.effective_size(width.min(height));
    let x = (width as i64 - size as i64) / 2;
    let y = (height as i64 - size as i64) / 2;
    let margin = options.margin as i64;
    OverlayPlacement {
        x,
        y,
        size,
        box_x: x - margin,
        box_y: y - margin,
        box_size: size + 2 * options.margin,
    }
}

// == Source Loading ==
/// Loads the overlay source bytes.
///
/// A `data:` URI is decoded inline; anything else is read from the
/// filesystem.
pub async fn load_source(source: &str) -> Result<Vec<u8>> {
    if let Some(rest) = source.strip_prefix("data:") {
        let payload = rest
            .split_once(";base64,")
            .map(|(_, payload)| payload)
            .ok_or_else(|| {
                GenerateError::OverlayLoad("Data URI is not base64-encoded".to_string())
            })?;
        BASE64
            .decode(payload)
            .map_err(|e| GenerateError::OverlayLoad(format!("Invalid data URI payload: {}", e)))
    } else {
        tokio::fs::read(source)
            .await
            .map_err(|e| GenerateError::OverlayLoad(format!("Cannot read '{}': {}", source, e)))
    }
}

// == Overlay Compositor ==
/// Loads the overlay image and draws it onto the surface.
///
/// The surface dimensions are never changed. Load and decode failures
/// surface as [`GenerateError::OverlayLoad`]; the caller decides whether
/// that aborts the artifact.
pub async fn apply(surface: &mut Surface, options: &OverlayOptions) -> Result<()> {
    let bytes = load_source(&options.source).await?;
    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| GenerateError::OverlayLoad(format!("Cannot decode overlay image: {}", e)))?
        .to_rgba8();

    let place = placement(surface.width(), surface.height(), options);
    match surface {
        Surface::Raster(raster) => apply_raster(raster, &decoded, options, &place),
        Surface::Vector(vector) => apply_vector(vector, &bytes, options, &place),
    }
    Ok(())
}

// == Raster Path ==
fn apply_raster(
    raster: &mut RasterSurface,
    decoded: &RgbaImage,
    options: &OverlayOptions,
    place: &OverlayPlacement,
) {
    let resized = image::imageops::resize(decoded, place.size, place.size, FilterType::Triangle);

    let box_center_x = place.box_x as f32 + place.box_size as f32 / 2.0;
    let box_center_y = place.box_y as f32 + place.box_size as f32 / 2.0;

    if let Some(background) = options.background_color {
        match options.shape {
            OverlayShape::Circle => raster.fill_circle(
                box_center_x,
                box_center_y,
                place.box_size as f32 / 2.0,
                background,
            ),
            OverlayShape::Square => raster.fill_rect(
                place.box_x,
                place.box_y,
                place.box_size,
                place.box_size,
                background,
            ),
        }
    }

    if options.border_width > 0 {
        let stroke = options.border_width as f32;
        match options.shape {
            OverlayShape::Circle => raster.stroke_circle(
                box_center_x,
                box_center_y,
                place.box_size as f32 / 2.0,
                stroke,
                options.border_color,
            ),
            OverlayShape::Square => raster.stroke_rect(
                place.box_x,
                place.box_y,
                place.box_size,
                place.box_size,
                stroke,
                options.border_color,
            ),
        }
    }

    // Image draw, clipped to a circle when requested
    let clip_center_x = place.x as f32 + place.size as f32 / 2.0;
    let clip_center_y = place.y as f32 + place.size as f32 / 2.0;
    let clip_r2 = {
        let r = place.size as f32 / 2.0;
        r * r
    };
    for (dx, dy, pixel) in resized.enumerate_pixels() {
        let tx = place.x + dx as i64;
        let ty = place.y + dy as i64;
        if options.shape == OverlayShape::Circle {
            let fx = tx as f32 + 0.5 - clip_center_x;
            let fy = ty as f32 + 0.5 - clip_center_y;
            if fx * fx + fy * fy > clip_r2 {
                continue;
            }
        }
        let color = Color {
            r: pixel[0],
            g: pixel[1],
            b: pixel[2],
            a: pixel[3],
        };
        raster.blend_pixel(tx, ty, color, options.opacity);
    }
}

// == Vector Path ==
fn apply_vector(
    vector: &mut VectorDocument,
    bytes: &[u8],
    options: &OverlayOptions,
    place: &OverlayPlacement,
) {
    let href = if options.source.starts_with("data:") {
        options.source.clone()
    } else {
        let mime = image::guess_format(bytes)
            .map(|f| f.to_mime_type())
            .unwrap_or("image/png");
        format!("data:{};base64,{}", mime, BASE64.encode(bytes))
    };

    let box_cx = place.box_x as f32 + place.box_size as f32 / 2.0;
    let box_cy = place.box_y as f32 + place.box_size as f32 / 2.0;

    let mut group = String::from("<g class=\"overlay\">");
    if let Some(background) = options.background_color {
        group.push_str(&match options.shape {
            OverlayShape::Circle => format!(
                "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\"/>",
                fmt_num(box_cx),
                fmt_num(box_cy),
                fmt_num(place.box_size as f32 / 2.0),
                background.to_hex()
            ),
            OverlayShape::Square => format!(
                "<rect x=\"{}\" y=\"{}\" width=\"{2}\" height=\"{2}\" fill=\"{3}\"/>",
                place.box_x,
                place.box_y,
                place.box_size,
                background.to_hex()
            ),
        });
    }

    if options.border_width > 0 {
        group.push_str(&match options.shape {
            OverlayShape::Circle => format!(
                "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
                fmt_num(box_cx),
                fmt_num(box_cy),
                fmt_num(place.box_size as f32 / 2.0),
                options.border_color.to_hex(),
                options.border_width
            ),
            OverlayShape::Square => format!(
                "<rect x=\"{}\" y=\"{}\" width=\"{2}\" height=\"{2}\" fill=\"none\" stroke=\"{3}\" stroke-width=\"{4}\"/>",
                place.box_x,
                place.box_y,
                place.box_size,
                options.border_color.to_hex(),
                options.border_width
            ),
        });
    }

    let clip_attr = if options.shape == OverlayShape::Circle {
        vector.push_def(format!(
            "<clipPath id=\"{}\"><circle cx=\"{}\" cy=\"{}\" r=\"{}\"/></clipPath>",
            CLIP_ID,
            fmt_num(place.x as f32 + place.size as f32 / 2.0),
            fmt_num(place.y as f32 + place.size as f32 / 2.0),
            fmt_num(place.size as f32 / 2.0)
        ));
        format!(" clip-path=\"url(#{})\"", CLIP_ID)
    } else {
        String::new()
    };

    let opacity_attr = if options.opacity < 1.0 {
        format!(" opacity=\"{}\"", options.opacity)
    } else {
        String::new()
    };

    group.push_str(&format!(
        "<image x=\"{}\" y=\"{}\" width=\"{2}\" height=\"{2}\" href=\"{3}\"{4}{5}/>",
        place.x, place.y, place.size, href, clip_attr, opacity_attr
    ));
    group.push_str("</g>");
    vector.push(group);
}
