use std::sync::Arc;

use anyhow::Context as _;
use base64::Engine as _;
use image::{DynamicImage, GenericImageView as _, codecs::jpeg::JpegEncoder, imageops::FilterType};
use serde::{Deserialize, Serialize};

use crate::{
    foundation::error::{FlipbookError, FlipbookResult},
    source::RawFrame,
};

pub const DEFAULT_MAX_WIDTH: u32 = 1200;
pub const DEFAULT_QUALITY: u8 = 85;

/// MIME type of every frame the pipeline produces.
pub const FRAME_MIME: &str = "image/jpeg";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSettings {
    /// Frames wider than this are downscaled to exactly this width.
    pub max_width: u32,
    /// JPEG quality, 1..=100.
    pub quality: u8,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            quality: DEFAULT_QUALITY,
        }
    }
}

/// Transport-ready frame. Immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedFrame {
    /// Encoded image bytes.
    pub bytes: Arc<[u8]>,
    pub mime: &'static str,
    /// Dimensions of the decoded input.
    pub source_width: u32,
    pub source_height: u32,
    /// Dimensions after downscaling.
    pub width: u32,
    pub height: u32,
    data_url: String,
}

impl EncodedFrame {
    /// `data:<mime>;base64,<payload>`, decodable directly by a browser.
    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

/// Decode, normalize, downscale and re-encode frames.
#[derive(Clone, Debug, Default)]
pub struct FramePipeline {
    settings: PipelineSettings,
}

impl FramePipeline {
    pub fn new(settings: PipelineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> PipelineSettings {
        self.settings
    }

    /// Encode raw image bytes; `DecodeError` if they are not a supported image.
    pub fn encode(&self, bytes: &[u8]) -> FlipbookResult<EncodedFrame> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| FlipbookError::decode(format!("decode image from memory: {e}")))?;
        self.encode_image(&img)
    }

    pub fn encode_raw(&self, raw: &RawFrame) -> FlipbookResult<EncodedFrame> {
        match raw {
            RawFrame::Bytes(bytes) => self.encode(bytes),
            RawFrame::Decoded(img) => self.encode_image(img),
        }
    }

    #[tracing::instrument(skip_all, fields(w = img.width(), h = img.height()))]
    pub fn encode_image(&self, img: &DynamicImage) -> FlipbookResult<EncodedFrame> {
        let (source_width, source_height) = img.dimensions();
        if source_width == 0 || source_height == 0 {
            return Err(FlipbookError::decode("image has zero width or height"));
        }

        let (width, height) =
            scaled_dimensions(source_width, source_height, self.settings.max_width);
        // to_rgb8 drops alpha and widens gray/16-bit layouts to 8-bit RGB.
        let rgb = if (width, height) == (source_width, source_height) {
            img.to_rgb8()
        } else {
            img.resize_exact(width, height, FilterType::Lanczos3).to_rgb8()
        };

        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, self.settings.quality)
            .encode_image(&rgb)
            .context("jpeg encode")?;

        let data_url = format!(
            "data:{FRAME_MIME};base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&buf)
        );
        tracing::debug!(width, height, bytes = buf.len(), "frame encoded");

        Ok(EncodedFrame {
            bytes: buf.into(),
            mime: FRAME_MIME,
            source_width,
            source_height,
            width,
            height,
            data_url,
        })
    }
}

/// Output size for a `w`x`h` input: unchanged up to `max_width`, otherwise exactly `max_width`
/// wide with the height scaled proportionally and rounded.
pub fn scaled_dimensions(w: u32, h: u32, max_width: u32) -> (u32, u32) {
    if w <= max_width {
        return (w, h);
    }
    let scaled = (f64::from(h) * f64::from(max_width) / f64::from(w)).round();
    (max_width, (scaled as u32).max(1))
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
