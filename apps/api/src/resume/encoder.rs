//! Image Encoder: PDF bytes → first page → JPEG → base64.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use serde::Serialize;

use crate::resume::rasterizer::{ExtractionError, PageRasterizer};

pub const JPEG_MEDIA_TYPE: &str = "image/jpeg";

/// A page image ready to be inlined into a multimodal request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedPage {
    pub media_type: String,
    pub data: String,
}

#[derive(Clone)]
pub struct PageEncoder {
    rasterizer: Arc<dyn PageRasterizer>,
    jpeg_quality: u8,
}

impl PageEncoder {
    pub fn new(rasterizer: Arc<dyn PageRasterizer>, jpeg_quality: u8) -> Self {
        Self {
            rasterizer,
            jpeg_quality,
        }
    }

    /// Encodes the first page of `pdf`. Recomputed on every call; nothing is cached.
    pub async fn encode_first_page(&self, pdf: Bytes) -> Result<EncodedPage, ExtractionError> {
        if pdf.is_empty() {
            return Err(ExtractionError::Empty);
        }

        let rasterizer = Arc::clone(&self.rasterizer);
        let quality = self.jpeg_quality;

        tokio::task::spawn_blocking(move || {
            let image = rasterizer.render_first_page(&pdf)?;
            encode_jpeg_base64(&image, quality)
        })
        .await
        .map_err(|e| ExtractionError::Task(e.to_string()))?
    }
}

/// JPEG has no alpha channel, so the image is flattened to RGB first.
pub fn encode_jpeg_base64(image: &DynamicImage, quality: u8) -> Result<EncodedPage, ExtractionError> {
    let rgb = image.to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality)
        .encode_image(&rgb)
        .map_err(|e| ExtractionError::Encode(e.to_string()))?;

    Ok(EncodedPage {
        media_type: JPEG_MEDIA_TYPE.to_string(),
        data: STANDARD.encode(&jpeg),
    })
}
