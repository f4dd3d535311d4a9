//! qrgen - A QR artifact generation pipeline
//!
//! Turns a payload plus rendering options into a raster image, an SVG
//! document or a PNG data URI, backed by a content-addressed artifact
//! cache with TTL expiry, LRU eviction and a memory-pressure safety
//! valve.

pub mod cache;
pub mod config;
pub mod encoder;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod tasks;

pub use config::GeneratorConfig;
pub use error::{ErrorKind, GenerateError, Result};
pub use models::{Artifact, ArtifactPayload, GenerationOptions, GenerationRequest};
pub use pipeline::Generator;
pub use tasks::spawn_cleanup_task;
