//! The fixed set of enhancement operations.

use serde::{Deserialize, Serialize};

/// An enhancement operation offered to the user.
///
/// The set is closed: each variant is bound to a fixed instruction that is
/// sent verbatim to the model. There is no free-form prompting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// Remove a watermark overlay and reconstruct the background.
    RemoveWatermark,
    /// Sharpen, denoise and color-correct the image.
    EnhanceQuality,
    /// Upscale to 8x the original resolution.
    Upscale,
}

impl Operation {
    /// Every operation, in display order.
    pub const ALL: [Operation; 3] = [
        Operation::RemoveWatermark,
        Operation::EnhanceQuality,
        Operation::Upscale,
    ];

    /// Returns the stable identifier used in CLI flags and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RemoveWatermark => "remove-watermark",
            Self::EnhanceQuality => "enhance-quality",
            Self::Upscale => "upscale",
        }
    }

    /// Returns the short human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RemoveWatermark => "Remove watermark",
            Self::EnhanceQuality => "Enhance quality",
            Self::Upscale => "Upscale 8x",
        }
    }

    /// Returns the instruction sent to the model for this operation.
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::RemoveWatermark => {
                "This image contains a watermark. Your task is to remove it completely. \
                 Analyze the image to identify the watermark overlay, then intelligently \
                 inpaint the area, reconstructing the background so it blends seamlessly \
                 with its surroundings. The result must be a clean image with no trace of \
                 the watermark text or logo."
            }
            Self::EnhanceQuality => {
                "Improve the overall quality of this image. Increase sharpness, improve \
                 clarity, correct the colors and reduce noise. The result should be a \
                 visibly superior, high-fidelity version of the original image."
            }
            Self::Upscale => {
                "Upscale this image to 8 times its original resolution. Add realistic \
                 detail and refine textures to produce an ultra-high-definition image \
                 while preserving the original style."
            }
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
