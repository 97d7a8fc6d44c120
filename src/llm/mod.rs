//! Text-generation integration.
//!
//! The pipeline talks to a `GenerationService` trait object; the concrete
//! implementation is a Gemini REST client. Failures carry an explicit retry
//! tag (`GenerationError::Transient` vs `Permanent`) so the summarizer's
//! retry driver matches on structure, not on error strings.

pub mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

use crate::error::GenerationError;

/// A text-generation service: prompt in, free-form text out.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, prompt: &str, temperature: f64) -> Result<String, GenerationError>;
}
