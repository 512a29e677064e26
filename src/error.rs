//! Error types for image enhancement.

use std::time::Duration;

/// Errors that can occur while loading or enhancing an image.
#[derive(Debug, thiserror::Error)]
pub enum EnhanceError {
    /// API key missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code of the failed request.
        status: u16,
        /// Upstream error message.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait from the `Retry-After` header, when present.
        retry_after: Option<Duration>,
    },

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Unsupported upload type, malformed data URL, or similar caller error.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The service answered successfully but returned no image part.
    #[error("no image data in response")]
    EmptyResponse,

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (reading an upload, saving a result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for enhancement operations.
pub type Result<T> = std::result::Result<T, EnhanceError>;

/// Parses the `Retry-After` header as a number of seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// Extracts a human-readable message from an error response body.
///
/// Prefers the `error.message` field of a JSON body. Falls back to the raw
/// text, truncated so an HTML error page does not flood the session error.
/// An empty body yields a generic message.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    const MAX_LEN: usize = 300;

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text) {
        if let Some(message) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return message.to_string();
        }
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "request failed with no error message".into();
    }
    if trimmed.len() <= MAX_LEN {
        return trimmed.to_string();
    }
    let mut end = MAX_LEN;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}
