//! Raster target sizing and the rendered bitmap type

use crate::error::{PdfError, Result};
use image::{DynamicImage, RgbImage, RgbaImage};

/// Largest width or height PDFium can allocate for a bitmap
pub const MAX_RASTER_SIZE: u32 = 32767;

/// Requested raster size.
///
/// Precedence: `scale` wins, then explicit `width`/`height`. When only one
/// of the two is given the other follows the page aspect ratio. With nothing
/// set the page renders at its natural size (one pixel per page unit).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub scale: Option<f32>,
}

impl RenderRequest {
    /// Natural page size
    #[must_use]
    pub fn natural() -> Self {
        Self::default()
    }

    /// Fixed width, height from the aspect ratio
    #[must_use]
    pub fn width(width: u32) -> Self {
        Self {
            width: Some(width),
            ..Self::default()
        }
    }

    /// Fixed height, width from the aspect ratio
    #[must_use]
    pub fn height(height: u32) -> Self {
        Self {
            height: Some(height),
            ..Self::default()
        }
    }

    /// Exact size (aspect ratio not preserved)
    #[must_use]
    pub fn size(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            scale: None,
        }
    }

    /// Natural size times `scale`
    #[must_use]
    pub fn scale(scale: f32) -> Self {
        Self {
            scale: Some(scale),
            ..Self::default()
        }
    }

    /// Resolve to pixel dimensions for a page of the given size.
    ///
    /// Both dimensions are rounded and clamped to `1..=MAX_RASTER_SIZE`.
    #[must_use]
    pub fn target_size(&self, page_width: f32, page_height: f32) -> (u32, u32) {
        let (width, height) = match (self.scale, self.width, self.height) {
            (Some(scale), _, _) => (page_width * scale, page_height * scale),
            (None, Some(w), Some(h)) => (w as f32, h as f32),
            (None, Some(w), None) => (w as f32, w as f32 * page_height / page_width),
            (None, None, Some(h)) => (h as f32 * page_width / page_height, h as f32),
            (None, None, None) => (page_width, page_height),
        };

        (clamp_dimension(width), clamp_dimension(height))
    }
}

fn clamp_dimension(value: f32) -> u32 {
    if !value.is_finite() {
        return 1;
    }
    (value.round().max(1.0) as u32).min(MAX_RASTER_SIZE)
}

/// A rendered page: tightly packed RGBA8 pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl Bitmap {
    /// Wrap an RGBA8 buffer, checking its length against the dimensions
    pub fn from_rgba(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(PdfError::Unknown {
                context: format!(
                    "bitmap buffer holds {} bytes, expected {expected} for {width}x{height}",
                    pixels.len()
                ),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes, row-major
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Copy into an RGB image, dropping alpha
    pub fn to_rgb_image(&self) -> Result<RgbImage> {
        let rgba = RgbaImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or_else(
            || PdfError::Unknown {
                context: format!("bitmap {}x{} has an invalid buffer", self.width, self.height),
            },
        )?;
        Ok(DynamicImage::ImageRgba8(rgba).to_rgb8())
    }
}
