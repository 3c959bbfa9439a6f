//! HTTP client for the external content-generation service.
//!
//! Exposes the [`GenerationService`] seam consumed by the import
//! pipeline's enricher. The client never applies fallback content itself;
//! failures propagate as [`GenAiError`] for the caller to absorb.

pub mod client;
pub mod config;

pub use client::{GenAiError, GenerationService, OpenAiClient};
pub use config::GenAiConfig;
