//! Generation Pipeline Module
//!
//! Orchestrates one generation request: cache lookup, base encode,
//! style and overlay composition, finalization, cache store and metrics
//! emission. [`Generator::generate`] is the single public entry point.

use std::io::Cursor;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{canonicalize, ArtifactCache, CacheKey, CacheStats};
use crate::config::GeneratorConfig;
use crate::encoder;
use crate::error::{ErrorKind, GenerateError, Result};
use crate::metrics::{OperationTimer, PerformanceMetric, PerformanceRecorder};
use crate::models::{
    Artifact, ArtifactPayload, GenerationOptions, GenerationRequest, OutputFormat,
    OverlayErrorPolicy,
};
use crate::render::{self, RasterSurface, Surface, VectorDocument};

// == Generator ==
/// The generation pipeline with its cache and performance recorder.
///
/// Defaults are an immutable snapshot: replacing them via
/// [`Generator::set_defaults`] clears the cache in the same call, since
/// previously cached artifacts no longer reflect current defaults.
///
/// Concurrent calls for the same key are not deduplicated: each runs
/// the full pipeline and the last to finish overwrites the cache entry.
/// Wasted work, not a correctness hazard.
#[derive(Clone)]
pub struct Generator {
    /// Default options merged under every request
    defaults: GenerationOptions,
    /// Shared artifact cache
    cache: Arc<RwLock<ArtifactCache>>,
    /// Shared performance sample buffer
    recorder: Arc<RwLock<PerformanceRecorder>>,
}

impl Generator {
    // == Constructors ==
    /// Creates a generator with library default options.
    pub fn new(config: &GeneratorConfig) -> Self {
        Self::with_defaults(config, GenerationOptions::default())
    }

    /// Creates a generator with an explicit default option snapshot.
    pub fn with_defaults(config: &GeneratorConfig, defaults: GenerationOptions) -> Self {
        Self {
            defaults,
            cache: Arc::new(RwLock::new(ArtifactCache::from_config(config))),
            recorder: Arc::new(RwLock::new(PerformanceRecorder::new(
                config.metrics_capacity,
            ))),
        }
    }

    // == Defaults ==
    /// The current default option snapshot.
    pub fn defaults(&self) -> &GenerationOptions {
        &self.defaults
    }

    /// Replaces the default snapshot and clears the cache.
    ///
    /// Cached artifacts were produced under the old defaults; keeping
    /// them would serve stale renderings for requests that rely on
    /// defaulted fields.
    pub async fn set_defaults(&mut self, defaults: GenerationOptions) {
        self.defaults = defaults;
        self.cache.write().await.clear();
    }

    // == Cache Access ==
    /// Shared handle to the artifact cache, e.g. for the cleanup task.
    pub fn cache_handle(&self) -> Arc<RwLock<ArtifactCache>> {
        Arc::clone(&self.cache)
    }

    /// Current cache statistics.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    /// Removes every cached artifact.
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    /// Removes the cached artifact for one request. Returns whether an
    /// entry was removed.
    pub async fn invalidate(&self, payload: &str, request: &GenerationRequest) -> bool {
        let options = request.resolve(&self.defaults);
        match canonicalize(payload, &options) {
            Ok(key) => self.cache.write().await.delete(&key),
            Err(_) => false,
        }
    }

    // == Metrics Access ==
    /// Snapshot of the retained performance samples.
    pub async fn metrics(&self) -> Vec<PerformanceMetric> {
        self.recorder.read().await.metrics()
    }

    /// Fraction of recorded operations served from the cache.
    pub async fn cache_hit_rate(&self) -> f64 {
        self.recorder.read().await.cache_hit_rate()
    }

    /// Average duration over recorded operations, optionally filtered by
    /// operation name.
    pub async fn average_duration_ms(&self, operation: Option<&str>) -> f64 {
        self.recorder.read().await.average_duration_ms(operation)
    }

    // == Generate ==
    /// Generates an artifact for a payload and request options.
    ///
    /// A performance sample is recorded on every path, success or
    /// failure.
    pub async fn generate(&self, payload: &str, request: &GenerationRequest) -> Result<Artifact> {
        let timer = OperationTimer::start("generate");
        let mut cache_hit = false;

        let result = self.generate_inner(payload, request, &mut cache_hit).await;

        let (success, size) = match &result {
            Ok(artifact) => (true, artifact.approx_size_bytes()),
            Err(_) => (false, 0),
        };
        self.recorder
            .write()
            .await
            .record(timer.finish(cache_hit, success, size));

        result
    }

    async fn generate_inner(
        &self,
        payload: &str,
        request: &GenerationRequest,
        cache_hit: &mut bool,
    ) -> Result<Artifact> {
        // 1. Validate
        if payload.is_empty() {
            return Err(GenerateError::InvalidData(
                "Payload cannot be empty".to_string(),
            ));
        }
        let options = request.resolve(&self.defaults);
        if let Some(message) = options.validate() {
            return Err(GenerateError::InvalidData(message));
        }

        // 2. Canonicalize; a key failure downgrades to uncached generation
        let key = match canonicalize(payload, &options) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!("Cache key derivation failed, generating uncached: {}", e);
                None
            }
        };

        // 3. Cache lookup
        if options.cache_enabled {
            if let Some(key) = &key {
                if let Some(artifact) = self.cache.write().await.get(key) {
                    *cache_hit = true;
                    debug!(key = %key, "Serving artifact from cache");
                    return Ok(artifact.as_cached());
                }
            }
        }

        // 4. Base encode; terminal on failure
        let matrix = encoder::encode(payload, options.error_tolerance)?;

        // 5. Materialize the surface for the requested representation
        let mut surface = match options.format {
            OutputFormat::Raster | OutputFormat::EncodedImage => Surface::Raster(
                RasterSurface::new(options.target_size, options.target_size),
            ),
            OutputFormat::Vector => Surface::Vector(VectorDocument::new(
                options.target_size,
                options.target_size,
            )),
        };

        // 6. Style; errors always propagate
        let style = options.style.clone().unwrap_or_default();
        render::style::apply(&mut surface, &matrix, &style, options.margin)?;

        // 7. Overlay; failure handling follows the per-call policy
        if let Some(overlay) = &options.overlay {
            match render::overlay::apply(&mut surface, overlay).await {
                Ok(()) => {}
                Err(e)
                    if e.kind() == ErrorKind::OverlayLoad
                        && overlay.on_error == OverlayErrorPolicy::Degrade =>
                {
                    warn!("Overlay skipped, returning artifact without it: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        // 8. Finalize into an artifact
        let payload_out = finalize(surface, options.format)?;
        let artifact = Artifact::new(
            payload_out,
            options.target_size,
            options.target_size,
            options.clone(),
        );

        // 9. Cache store; failures never abort generation
        if options.cache_enabled {
            if let Some(key) = key {
                self.store_artifact(key, &artifact).await;
            }
        }

        Ok(artifact)
    }

    async fn store_artifact(&self, key: CacheKey, artifact: &Artifact) {
        if let Err(e) = self.cache.write().await.set(key, artifact.clone(), None) {
            warn!("Cache store failed, artifact served uncached: {}", e);
        }
    }
}

// == Finalize ==
/// Converts a composited surface into the representation-specific
/// payload.
fn finalize(surface: Surface, format: OutputFormat) -> Result<ArtifactPayload> {
    match (surface, format) {
        (Surface::Raster(raster), OutputFormat::Raster) => {
            Ok(ArtifactPayload::Raster(raster.into_image()))
        }
        (Surface::Raster(raster), OutputFormat::EncodedImage) => {
            let mut bytes = Vec::new();
            image::DynamicImage::ImageRgba8(raster.into_image())
                .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
                .map_err(|e| GenerateError::Internal(format!("PNG encoding failed: {}", e)))?;
            Ok(ArtifactPayload::EncodedImage(format!(
                "data:image/png;base64,{}",
                BASE64.encode(&bytes)
            )))
        }
        (Surface::Vector(vector), OutputFormat::Vector) => {
            Ok(ArtifactPayload::Vector(vector.finish()))
        }
        (_, format) => Err(GenerateError::Internal(format!(
            "Materialized surface does not match requested format '{}'",
            format
        ))),
    }
}
