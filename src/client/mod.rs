//! Enhancement client module.

mod gemini;

pub use gemini::{GeminiClient, GeminiClientBuilder, GeminiModel, API_KEY_ENV};

use crate::error::Result;
use crate::image::EncodedImage;
use async_trait::async_trait;

/// Trait for remote image enhancement backends.
///
/// The session controller is generic over this trait so tests can
/// substitute a scripted backend for the real service.
#[async_trait]
pub trait Enhancer: Send + Sync {
    /// Sends `image` with `instruction` in a single round trip and returns
    /// the enhanced image.
    ///
    /// Exactly one remote call per invocation; implementations do not retry.
    async fn enhance(&self, image: &EncodedImage, instruction: &str) -> Result<EncodedImage>;

    /// Returns the backend name for display.
    fn name(&self) -> &str;
}
