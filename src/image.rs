//! Encoded images and the data-URL codec.

use crate::error::{EnhanceError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image formats accepted for upload and returned by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Attempts to map a declared MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// A fully materialized image payload with its declared media type.
///
/// This is the unit of exchange for the whole crate: uploads are read into
/// one, the remote call takes one and returns one, and saving a result
/// writes one back out. There is no streaming; the bytes are always held
/// in memory whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Declared media type of `data`.
    pub format: ImageFormat,
}

impl EncodedImage {
    /// Creates an encoded image from raw bytes and a declared format.
    pub fn new(data: Vec<u8>, format: ImageFormat) -> Self {
        Self { data, format }
    }

    /// Reads a file fully into memory, deriving the format from its
    /// extension.
    ///
    /// The extension check mirrors the upload dialog's file filter; the
    /// content itself is not inspected.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageFormat::from_extension)
            .ok_or_else(|| {
                EnhanceError::InvalidInput(format!(
                    "unsupported file type: {} (expected png, jpg or webp)",
                    path.display()
                ))
            })?;
        let data = std::fs::read(path)?;
        Ok(Self { data, format })
    }

    /// Parses a `data:<mime>;base64,<payload>` URL.
    ///
    /// A missing or unknown media type is treated as JPEG.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let (header, payload) = url
            .split_once(',')
            .ok_or_else(|| EnhanceError::InvalidInput("not a data URL".into()))?;
        let mime = header
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .unwrap_or("");
        let format = ImageFormat::from_mime(mime).unwrap_or(ImageFormat::Jpeg);
        let data = base64::engine::general_purpose::STANDARD
            .decode(payload.trim().as_bytes())
            .map_err(|e| EnhanceError::Decode(e.to_string()))?;
        Ok(Self { data, format })
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Encodes the image data as base64.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the image as a data URL.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            self.to_base64()
        )
    }

    /// Writes the image bytes to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }
}
