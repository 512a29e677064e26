//! Gemini-backed enhancement client.

use crate::client::Enhancer;
use crate::error::{parse_retry_after, sanitize_error_message, EnhanceError, Result};
use crate::image::{EncodedImage, ImageFormat};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable consulted for the API key when none is set
/// explicitly on the builder.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 2.5 Flash Image (fast, economical).
    #[default]
    Flash,
    /// Gemini 3 Pro Image (highest quality).
    Pro,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flash => "gemini-2.5-flash-image",
            Self::Pro => "nano-banana-pro-preview",
        }
    }
}

/// Builder for [`GeminiClient`].
#[derive(Debug, Clone, Default)]
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    model: GeminiModel,
}

impl GeminiClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit API key instead of reading [`API_KEY_ENV`].
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Builds the client.
    ///
    /// The API key is resolved on every call rather than here, so a key
    /// exported after startup is still picked up and a missing key only
    /// fails the calls that need it.
    pub fn build(self) -> GeminiClient {
        GeminiClient {
            client: reqwest::Client::new(),
            api_key: self.api_key,
            model: self.model,
        }
    }
}

/// Client for the Gemini image generation API.
///
/// One call per enhancement: no retries, no streaming, and no timeout
/// beyond the transport default.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    model: GeminiModel,
}

impl GeminiClient {
    /// Creates a new [`GeminiClientBuilder`].
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::new()
    }

    /// Resolves the credential for one call.
    fn credential(&self) -> Result<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                EnhanceError::Auth(format!("{API_KEY_ENV} not set and no API key provided"))
            })
    }

    async fn enhance_impl(&self, image: &EncodedImage, instruction: &str) -> Result<EncodedImage> {
        let api_key = self.credential()?;

        let url = format!("{API_BASE}/{}:generateContent", self.model.as_str());
        let body = GeminiRequest::new(image, instruction);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        let reply: GeminiResponse = response.json().await?;
        extract_image(reply)
    }
}

#[async_trait]
impl Enhancer for GeminiClient {
    async fn enhance(&self, image: &EncodedImage, instruction: &str) -> Result<EncodedImage> {
        match self.enhance_impl(image, instruction).await {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::error!(model = self.model.as_str(), "enhancement failed: {e}");
                Err(e)
            }
        }
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }
}

/// Maps a non-2xx response onto the error taxonomy, preserving the
/// upstream message.
fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> EnhanceError {
    let message = sanitize_error_message(text);
    match status {
        401 | 403 => EnhanceError::Auth(message),
        404 => EnhanceError::InvalidInput(
            "model not found; verify the model name is correct".into(),
        ),
        429 => EnhanceError::RateLimited {
            retry_after: parse_retry_after(headers).map(Duration::from_secs),
        },
        _ => {
            let lower = message.to_lowercase();
            if lower.contains("safety") || lower.contains("blocked") || lower.contains("prohibited")
            {
                EnhanceError::ContentBlocked(message)
            } else {
                EnhanceError::Api { status, message }
            }
        }
    }
}

/// Takes the first inline-image part of a successful reply.
///
/// The service may in principle return several image parts; only the first
/// is used. Blocks reported inside an HTTP 200 (prompt feedback or a
/// safety finish reason) surface as [`EnhanceError::ContentBlocked`].
fn extract_image(reply: GeminiResponse) -> Result<EncodedImage> {
    if let Some(feedback) = reply.prompt_feedback {
        if let Some(reason) = feedback.block_reason {
            let message = feedback
                .block_reason_message
                .unwrap_or_else(|| format!("prompt blocked: {reason}"));
            return Err(EnhanceError::ContentBlocked(message));
        }
    }

    let candidate = reply
        .candidates
        .into_iter()
        .next()
        .ok_or(EnhanceError::EmptyResponse)?;

    if let Some(ref reason) = candidate.finish_reason {
        match reason.as_str() {
            "SAFETY" | "IMAGE_SAFETY" | "IMAGE_PROHIBITED_CONTENT" | "RECITATION"
            | "PROHIBITED_CONTENT" | "BLOCKLIST" => {
                return Err(EnhanceError::ContentBlocked(format!(
                    "blocked by safety filter: {reason}"
                )));
            }
            _ => {} // STOP, MAX_TOKENS, etc. are normal
        }
    }

    let inline = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .find_map(|part| part.inline_data)
        .ok_or(EnhanceError::EmptyResponse)?;

    let data = base64::engine::general_purpose::STANDARD
        .decode(inline.data.as_bytes())
        .map_err(|e| EnhanceError::Decode(e.to_string()))?;
    let format = ImageFormat::from_mime(&inline.mime_type).unwrap_or(ImageFormat::Png);

    Ok(EncodedImage::new(data, format))
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - inline image data or text.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    InlineData { inline_data: GeminiInlineData },
    Text { text: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
}

impl GeminiRequest {
    /// Builds the request body: the image first, then the instruction,
    /// asking for an image-typed response.
    fn new(image: &EncodedImage, instruction: &str) -> Self {
        let parts = vec![
            GeminiRequestPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: image.format.mime_type().to_string(),
                    data: image.to_base64(),
                },
            },
            GeminiRequestPart::Text {
                text: instruction.to_string(),
            },
        ];

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["IMAGE".to_string()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}
