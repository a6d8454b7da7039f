//! First-page rasterization behind a pluggable trait.
//!
//! Default: `PdfiumRasterizer`, which binds pdfium on every call. `Pdfium` is
//! neither `Send` nor `Sync`, so the binding never outlives the blocking task
//! that renders the page.

use std::path::PathBuf;

use image::DynamicImage;
use pdfium_render::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

/// PDF points per inch.
const POINTS_PER_INCH: f32 = 72.0;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("uploaded file is empty")]
    Empty,

    #[error("pdfium library unavailable: {0}")]
    Library(String),

    #[error("could not open PDF: {0}")]
    Open(String),

    #[error("PDF has no pages")]
    NoPages,

    #[error("could not render first page: {0}")]
    Render(String),

    #[error("could not encode page image: {0}")]
    Encode(String),

    #[error("rasterization task failed: {0}")]
    Task(String),
}

/// Renders the first page of a PDF. Implementations are called from
/// `tokio::task::spawn_blocking` and may block.
pub trait PageRasterizer: Send + Sync {
    fn render_first_page(&self, pdf: &[u8]) -> Result<DynamicImage, ExtractionError>;
}

pub struct PdfiumRasterizer {
    library_dir: Option<PathBuf>,
    dpi: f32,
    max_width_px: i32,
}

impl PdfiumRasterizer {
    pub fn new(library_dir: Option<PathBuf>, dpi: f32) -> Self {
        Self {
            library_dir,
            dpi,
            max_width_px: 2000,
        }
    }

    fn bind(&self) -> Result<Pdfium, ExtractionError> {
        if let Some(dir) = &self.library_dir {
            let lib_path = Pdfium::pdfium_platform_library_name_at_path(dir);
            match Pdfium::bind_to_library(&lib_path) {
                Ok(bindings) => return Ok(Pdfium::new(bindings)),
                Err(e) => warn!("Failed to load pdfium from {:?}: {e}", lib_path),
            }
        }

        Pdfium::bind_to_system_library()
            .map(Pdfium::new)
            .map_err(|e| ExtractionError::Library(e.to_string()))
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn render_first_page(&self, pdf: &[u8]) -> Result<DynamicImage, ExtractionError> {
        let pdfium = self.bind()?;

        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| ExtractionError::Open(e.to_string()))?;

        let pages = document.pages();
        if pages.len() == 0 {
            return Err(ExtractionError::NoPages);
        }

        let page = pages
            .get(0)
            .map_err(|e| ExtractionError::Render(e.to_string()))?;

        let (width, height) = target_size(
            page.width().value,
            page.height().value,
            self.dpi,
            self.max_width_px,
        );
        debug!("Rendering first page at {width}x{height}px");

        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(width)
                    .set_target_height(height),
            )
            .map_err(|e| ExtractionError::Render(e.to_string()))?;

        Ok(bitmap.as_image())
    }
}

/// Pixel size for a page of `width_pt` x `height_pt` points at `dpi`,
/// scaled down proportionally when wider than `max_width_px`.
fn target_size(width_pt: f32, height_pt: f32, dpi: f32, max_width_px: i32) -> (i32, i32) {
    let scale = dpi / POINTS_PER_INCH;
    let mut width = (width_pt * scale).round().max(1.0);
    let mut height = (height_pt * scale).round().max(1.0);

    let max_width = max_width_px as f32;
    if width > max_width {
        height = (height * max_width / width).round().max(1.0);
        width = max_width;
    }

    (width as i32, height as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_size_us_letter_at_150_dpi() {
        // 8.5in x 11in
        assert_eq!(target_size(612.0, 792.0, 150.0, 2000), (1275, 1650));
    }

    #[test]
    fn test_target_size_caps_width_and_keeps_ratio() {
        assert_eq!(target_size(612.0, 792.0, 600.0, 2000), (2000, 2588));
    }

    #[test]
    fn test_target_size_never_zero() {
        assert_eq!(target_size(0.1, 0.1, 72.0, 2000), (1, 1));
    }
}
