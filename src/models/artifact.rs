//! Artifact Module
//!
//! The finished output of one generation request.

use image::RgbaImage;

use crate::models::{GenerationOptions, OutputFormat};

// == Artifact Payload ==
/// Representation-specific payload of a generated artifact.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactPayload {
    /// RGBA pixel buffer
    Raster(RgbaImage),
    /// SVG document
    Vector(String),
    /// Base64 PNG data URI
    EncodedImage(String),
}

impl ArtifactPayload {
    /// Output format this payload belongs to.
    pub fn format(&self) -> OutputFormat {
        match self {
            ArtifactPayload::Raster(_) => OutputFormat::Raster,
            ArtifactPayload::Vector(_) => OutputFormat::Vector,
            ArtifactPayload::EncodedImage(_) => OutputFormat::EncodedImage,
        }
    }

    /// Approximate in-memory size of the payload in bytes.
    ///
    /// A heuristic, not an exact accounting; it is monotonic with payload
    /// size so eviction ordering stays meaningful.
    pub fn approx_size_bytes(&self) -> usize {
        match self {
            ArtifactPayload::Raster(image) => {
                (image.width() as usize) * (image.height() as usize) * 4
            }
            ArtifactPayload::Vector(markup) => markup.len(),
            ArtifactPayload::EncodedImage(uri) => uri.len(),
        }
    }
}

// == Artifact ==
/// The produced visual output of one generation request.
///
/// The cache holds its own clone; callers own the returned value and must
/// not assume identity survives eviction.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Output representation kind; always matches the payload variant
    pub format: OutputFormat,
    /// Representation-specific payload
    pub payload: ArtifactPayload,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
    /// True when served from the artifact cache
    pub from_cache: bool,
    /// Generation timestamp (Unix milliseconds)
    pub generated_at_ms: i64,
    /// Echo of the resolved options that produced this artifact
    pub options: GenerationOptions,
}

impl Artifact {
    /// Wraps a payload into an artifact stamped with the current time.
    pub fn new(payload: ArtifactPayload, width: u32, height: u32, options: GenerationOptions) -> Self {
        Self {
            format: payload.format(),
            payload,
            width,
            height,
            from_cache: false,
            generated_at_ms: chrono::Utc::now().timestamp_millis(),
            options,
        }
    }

    /// Approximate in-memory size of this artifact in bytes.
    pub fn approx_size_bytes(&self) -> usize {
        self.payload.approx_size_bytes()
    }

    /// Returns a copy tagged as served from the cache.
    pub fn as_cached(&self) -> Self {
        let mut copy = self.clone();
        copy.from_cache = true;
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_format_match() {
        let raster = ArtifactPayload::Raster(RgbaImage::new(4, 4));
        assert_eq!(raster.format(), OutputFormat::Raster);

        let vector = ArtifactPayload::Vector("<svg/>".to_string());
        assert_eq!(vector.format(), OutputFormat::Vector);

        let encoded = ArtifactPayload::EncodedImage("data:image/png;base64,".to_string());
        assert_eq!(encoded.format(), OutputFormat::EncodedImage);
    }

    #[test]
    fn test_payload_size_monotonic() {
        let small = ArtifactPayload::Raster(RgbaImage::new(4, 4));
        let large = ArtifactPayload::Raster(RgbaImage::new(8, 8));
        assert!(large.approx_size_bytes() > small.approx_size_bytes());
        assert_eq!(small.approx_size_bytes(), 4 * 4 * 4);

        let short = ArtifactPayload::Vector("<svg/>".to_string());
        let long = ArtifactPayload::Vector("<svg>more markup</svg>".to_string());
        assert!(long.approx_size_bytes() > short.approx_size_bytes());
    }

    #[test]
    fn test_artifact_new_stamps_metadata() {
        let options = GenerationOptions::default();
        let artifact = Artifact::new(
            ArtifactPayload::Vector("<svg/>".to_string()),
            200,
            200,
            options.clone(),
        );

        assert_eq!(artifact.format, OutputFormat::Vector);
        assert_eq!(artifact.width, 200);
        assert_eq!(artifact.height, 200);
        assert!(!artifact.from_cache);
        assert!(artifact.generated_at_ms > 0);
        assert_eq!(artifact.options, options);
    }

    #[test]
    fn test_as_cached_flips_flag_only() {
        let artifact = Artifact::new(
            ArtifactPayload::Vector("<svg/>".to_string()),
            100,
            100,
            GenerationOptions::default(),
        );
        let cached = artifact.as_cached();

        assert!(cached.from_cache);
        assert_eq!(cached.payload, artifact.payload);
        assert_eq!(cached.generated_at_ms, artifact.generated_at_ms);
    }
}
