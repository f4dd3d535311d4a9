//! Generation request and option types
//!
//! Defines the incoming request DTO, the resolved option bundle and the
//! paint/shape vocabulary used by the compositors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GenerateError;

// == Public Constants ==
/// Maximum allowed target edge length in pixels
pub const MAX_TARGET_SIZE: u32 = 4096;

/// Default target edge length in pixels
pub const DEFAULT_TARGET_SIZE: u32 = 200;

/// Default quiet-zone width in modules
pub const DEFAULT_MARGIN: u32 = 4;

// == Output Format ==
/// Output representation of a generated artifact.
///
/// A closed set: adding a representation forces every dispatch site to be
/// revisited at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// In-memory RGBA pixel buffer
    Raster,
    /// SVG document string
    Vector,
    /// Base64 PNG data URI string
    EncodedImage,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Raster
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Raster => "raster",
            OutputFormat::Vector => "vector",
            OutputFormat::EncodedImage => "encoded-image",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for OutputFormat {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raster" => Ok(OutputFormat::Raster),
            "vector" => Ok(OutputFormat::Vector),
            "encoded-image" => Ok(OutputFormat::EncodedImage),
            other => Err(GenerateError::UnsupportedFormat(other.to_string())),
        }
    }
}

// == Error Tolerance ==
/// Error-correction tolerance of the encoded matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorTolerance {
    /// Tolerates ~7% damage
    Low,
    /// Tolerates ~15% damage
    Medium,
    /// Tolerates ~25% damage
    Quartile,
    /// Tolerates ~30% damage
    High,
}

impl Default for ErrorTolerance {
    fn default() -> Self {
        ErrorTolerance::Medium
    }
}

// == Color ==
/// An RGBA color, serialized as a `#rrggbb` / `#rrggbbaa` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Creates an opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Parses a `#rgb`, `#rrggbb` or `#rrggbbaa` hex string.
    pub fn from_hex(s: &str) -> Result<Self, GenerateError> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        let invalid = || GenerateError::InvalidData(format!("Invalid color: {}", s));

        let expand = |c: u8| (c << 4) | c;
        match hex.len() {
            3 => {
                let digits = u16::from_str_radix(hex, 16).map_err(|_| invalid())?;
                Ok(Self::rgb(
                    expand(((digits >> 8) & 0xf) as u8),
                    expand(((digits >> 4) & 0xf) as u8),
                    expand((digits & 0xf) as u8),
                ))
            }
            6 => {
                let digits = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
                Ok(Self::rgb(
                    (digits >> 16) as u8,
                    (digits >> 8) as u8,
                    digits as u8,
                ))
            }
            8 => {
                let digits = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
                Ok(Self {
                    r: (digits >> 24) as u8,
                    g: (digits >> 16) as u8,
                    b: (digits >> 8) as u8,
                    a: digits as u8,
                })
            }
            _ => Err(invalid()),
        }
    }

    /// Formats as a `#rrggbb` or `#rrggbbaa` hex string.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Linear interpolation between two colors, `t` clamped to [0, 1].
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = GenerateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_hex()
    }
}

// == Gradient ==
/// Direction of a two-stop linear gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientDirection {
    Horizontal,
    Vertical,
    Diagonal,
}

/// A two-stop linear gradient used as a foreground paint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    pub start: Color,
    pub end: Color,
    pub direction: GradientDirection,
}

impl Gradient {
    /// Position of `(x, y)` along the gradient axis of a `w`×`h` surface,
    /// in [0, 1].
    pub fn axis_position(&self, x: f32, y: f32, w: f32, h: f32) -> f32 {
        match self.direction {
            GradientDirection::Horizontal => x / w.max(1.0),
            GradientDirection::Vertical => y / h.max(1.0),
            GradientDirection::Diagonal => (x + y) / (w + h).max(1.0),
        }
    }

    /// Color at position `t` along the axis.
    pub fn color_at(&self, t: f32) -> Color {
        self.start.lerp(self.end, t)
    }
}

// == Shapes ==
/// Shape of an individual data module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DotShape {
    Square,
    Rounded,
    Circle,
}

/// Shape of the three finder patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CornerShape {
    Square,
    Rounded,
}

/// Shape of the overlay clipping region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayShape {
    Square,
    Circle,
}

/// What to do when the overlay image cannot be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayErrorPolicy {
    /// Abort the whole artifact with an overlay-load error
    Fail,
    /// Log a warning and return the styled artifact without the overlay
    Degrade,
}

// == Style Options ==
/// Visual styling applied on top of the base matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleOptions {
    /// Background fill
    pub background: Color,
    /// Foreground (module) fill
    pub foreground: Color,
    /// Optional foreground gradient; overrides the flat foreground color
    pub gradient: Option<Gradient>,
    /// Shape of data modules
    pub dot_shape: DotShape,
    /// Shape of the finder patterns
    pub corner_shape: CornerShape,
    /// Corner radius of the overall artifact, in pixels
    pub border_radius: u32,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            foreground: Color::BLACK,
            gradient: None,
            dot_shape: DotShape::Square,
            corner_shape: CornerShape::Square,
            border_radius: 0,
        }
    }
}

// == Overlay Options ==
/// An image embedded centered on the finished surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayOptions {
    /// Filesystem path or `data:` URI of the overlay image
    pub source: String,
    /// Edge length in pixels; None derives 20% of the target size
    #[serde(default)]
    pub size: Option<u32>,
    /// Inset between the image and its background/border box
    #[serde(default)]
    pub margin: u32,
    /// Clipping shape of the image and its box
    #[serde(default = "OverlayOptions::default_shape")]
    pub shape: OverlayShape,
    /// Border stroke width; 0 disables the border
    #[serde(default)]
    pub border_width: u32,
    /// Border stroke color
    #[serde(default = "OverlayOptions::default_border_color")]
    pub border_color: Color,
    /// Optional fill behind the image
    #[serde(default)]
    pub background_color: Option<Color>,
    /// Image opacity in [0, 1]
    #[serde(default = "OverlayOptions::default_opacity")]
    pub opacity: f32,
    /// Failure policy for this call
    #[serde(default = "OverlayOptions::default_policy")]
    pub on_error: OverlayErrorPolicy,
}

impl OverlayOptions {
    /// Creates overlay options for a source with all defaults.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            size: None,
            margin: 0,
            shape: OverlayShape::Square,
            border_width: 0,
            border_color: Color::WHITE,
            background_color: None,
            opacity: 1.0,
            on_error: OverlayErrorPolicy::Fail,
        }
    }

    /// Effective overlay edge length for a given target size.
    pub fn effective_size(&self, target_size: u32) -> u32 {
        self.size.unwrap_or(target_size / 5)
    }

    fn default_shape() -> OverlayShape {
        OverlayShape::Square
    }

    fn default_border_color() -> Color {
        Color::WHITE
    }

    fn default_opacity() -> f32 {
        1.0
    }

    fn default_policy() -> OverlayErrorPolicy {
        OverlayErrorPolicy::Fail
    }
}

// == Generation Options ==
/// Fully resolved options for one generation call.
///
/// Immutable once resolved; the cache key is derived from every field
/// except `cache_enabled`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationOptions {
    /// Output edge length in pixels
    pub target_size: u32,
    /// Output representation
    pub format: OutputFormat,
    /// Error-correction tolerance
    pub error_tolerance: ErrorTolerance,
    /// Quiet-zone width in modules
    pub margin: u32,
    /// Visual styling; None renders black-on-white squares
    pub style: Option<StyleOptions>,
    /// Centered overlay image
    pub overlay: Option<OverlayOptions>,
    /// Whether this call consults and populates the artifact cache
    pub cache_enabled: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            format: OutputFormat::default(),
            error_tolerance: ErrorTolerance::default(),
            margin: DEFAULT_MARGIN,
            style: None,
            overlay: None,
            cache_enabled: true,
        }
    }
}

impl GenerationOptions {
    /// Validates the resolved option bundle.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.target_size == 0 {
            return Some("Target size must be greater than zero".to_string());
        }
        if self.target_size > MAX_TARGET_SIZE {
            return Some(format!(
                "Target size exceeds maximum of {} pixels",
                MAX_TARGET_SIZE
            ));
        }
        if let Some(overlay) = &self.overlay {
            if overlay.source.is_empty() {
                return Some("Overlay source cannot be empty".to_string());
            }
            if !(0.0..=1.0).contains(&overlay.opacity) {
                return Some("Overlay opacity must be within [0, 1]".to_string());
            }
            if overlay.effective_size(self.target_size) > self.target_size {
                return Some("Overlay size exceeds target size".to_string());
            }
        }
        None
    }
}

// == Generation Request ==
/// Partial options as supplied by a caller.
///
/// Every field is optional; [`GenerationRequest::resolve`] merges the
/// request over the generator's stored defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationRequest {
    pub target_size: Option<u32>,
    pub format: Option<OutputFormat>,
    pub error_tolerance: Option<ErrorTolerance>,
    pub margin: Option<u32>,
    pub style: Option<StyleOptions>,
    pub overlay: Option<OverlayOptions>,
    pub cache_enabled: Option<bool>,
}

impl GenerationRequest {
    /// Merges this request over the given defaults into resolved options.
    pub fn resolve(&self, defaults: &GenerationOptions) -> GenerationOptions {
        GenerationOptions {
            target_size: self.target_size.unwrap_or(defaults.target_size),
            format: self.format.unwrap_or(defaults.format),
            error_tolerance: self.error_tolerance.unwrap_or(defaults.error_tolerance),
            margin: self.margin.unwrap_or(defaults.margin),
            style: self.style.clone().or_else(|| defaults.style.clone()),
            overlay: self.overlay.clone().or_else(|| defaults.overlay.clone()),
            cache_enabled: self.cache_enabled.unwrap_or(defaults.cache_enabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#000000").unwrap(), Color::BLACK);
        assert_eq!(Color::from_hex("#ffffff").unwrap(), Color::WHITE);
        assert_eq!(Color::from_hex("ff0000").unwrap(), Color::rgb(255, 0, 0));
        assert_eq!(Color::from_hex("#fff").unwrap(), Color::WHITE);
        assert_eq!(
            Color::from_hex("#11223344").unwrap(),
            Color {
                r: 0x11,
                g: 0x22,
                b: 0x33,
                a: 0x44
            }
        );
    }

    #[test]
    fn test_color_from_hex_invalid() {
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#gggggg").is_err());
        assert!(Color::from_hex("").is_err());
    }

    #[test]
    fn test_color_hex_round_trip() {
        let color = Color::rgb(18, 52, 86);
        assert_eq!(Color::from_hex(&color.to_hex()).unwrap(), color);
    }

    #[test]
    fn test_color_lerp_endpoints() {
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 0.0), Color::BLACK);
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 1.0), Color::WHITE);
        let mid = Color::BLACK.lerp(Color::WHITE, 0.5);
        assert_eq!(mid.r, mid.g);
        assert_eq!(mid.g, mid.b);
    }

    #[test]
    fn test_output_format_round_trip() {
        for format in [
            OutputFormat::Raster,
            OutputFormat::Vector,
            OutputFormat::EncodedImage,
        ] {
            let parsed: OutputFormat = format.to_string().parse().unwrap();
            assert_eq!(parsed, format);
        }
    }

    #[test]
    fn test_output_format_unknown() {
        let result: Result<OutputFormat, _> = "tiff".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_request_deserialize_kebab_format() {
        let json = r#"{"targetSize": 300, "format": "encoded-image"}"#;
        let req: GenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.target_size, Some(300));
        assert_eq!(req.format, Some(OutputFormat::EncodedImage));
        assert!(req.style.is_none());
    }

    #[test]
    fn test_request_resolve_over_defaults() {
        let defaults = GenerationOptions {
            target_size: 400,
            margin: 2,
            ..GenerationOptions::default()
        };
        let request = GenerationRequest {
            target_size: Some(100),
            ..GenerationRequest::default()
        };

        let resolved = request.resolve(&defaults);
        assert_eq!(resolved.target_size, 100);
        assert_eq!(resolved.margin, 2);
        assert_eq!(resolved.format, OutputFormat::Raster);
    }

    #[test]
    fn test_options_validate_zero_size() {
        let options = GenerationOptions {
            target_size: 0,
            ..GenerationOptions::default()
        };
        assert!(options.validate().is_some());
    }

    #[test]
    fn test_options_validate_oversized() {
        let options = GenerationOptions {
            target_size: MAX_TARGET_SIZE + 1,
            ..GenerationOptions::default()
        };
        assert!(options.validate().is_some());
    }

    #[test]
    fn test_options_validate_overlay_opacity() {
        let mut overlay = OverlayOptions::new("logo.png");
        overlay.opacity = 1.5;
        let options = GenerationOptions {
            overlay: Some(overlay),
            ..GenerationOptions::default()
        };
        assert!(options.validate().is_some());
    }

    #[test]
    fn test_overlay_effective_size_default() {
        let overlay = OverlayOptions::new("logo.png");
        assert_eq!(overlay.effective_size(200), 40);
        let sized = OverlayOptions {
            size: Some(64),
            ..OverlayOptions::new("logo.png")
        };
        assert_eq!(sized.effective_size(200), 64);
    }

    #[test]
    fn test_style_defaults() {
        let style = StyleOptions::default();
        assert_eq!(style.background, Color::WHITE);
        assert_eq!(style.foreground, Color::BLACK);
        assert_eq!(style.dot_shape, DotShape::Square);
        assert!(style.gradient.is_none());
    }

    #[test]
    fn test_gradient_axis_position() {
        let gradient = Gradient {
            start: Color::BLACK,
            end: Color::WHITE,
            direction: GradientDirection::Horizontal,
        };
        assert!(gradient.axis_position(0.0, 50.0, 100.0, 100.0) < 0.01);
        assert!((gradient.axis_position(50.0, 0.0, 100.0, 100.0) - 0.5).abs() < 0.01);
    }
}
