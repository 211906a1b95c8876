//! Standalone images as single-page documents

use crate::error::{PdfError, Result};
use crate::native::{Binding, NativeDocument, NativePage, RawChar, RawRect, Source};
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Binding that decodes raster images (PNG, JPEG, ...) with the `image`
/// crate. The image becomes page 0, one page unit per pixel, with no text
/// and no vector objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterBinding;

impl Binding for RasterBinding {
    fn open(&self, source: Source, _password: Option<&str>) -> Result<Box<dyn NativeDocument>> {
        let bytes = source.into_bytes()?;
        let image = image::load_from_memory(&bytes).map_err(|e| PdfError::Format {
            reason: e.to_string(),
        })?;
        Ok(Box::new(RasterDocument {
            image: image.to_rgba8(),
        }))
    }
}

struct RasterDocument {
    image: RgbaImage,
}

impl NativeDocument for RasterDocument {
    fn page_count(&self) -> usize {
        1
    }

    fn load_page(&self, _index: usize) -> Result<Box<dyn NativePage>> {
        Ok(Box::new(RasterPage {
            image: self.image.clone(),
        }))
    }
}

struct RasterPage {
    image: RgbaImage,
}

impl NativePage for RasterPage {
    fn size(&self) -> (f32, f32) {
        (self.image.width() as f32, self.image.height() as f32)
    }

    fn render(&self, width: u32, height: u32) -> Result<Vec<u8>> {
        let mut canvas = if (width, height) == self.image.dimensions() {
            self.image.clone()
        } else {
            imageops::resize(&self.image, width, height, FilterType::Triangle)
        };

        // flatten onto white
        for pixel in canvas.pixels_mut() {
            let alpha = u16::from(pixel[3]);
            for channel in 0..3 {
                let value = u16::from(pixel[channel]);
                pixel[channel] = ((value * alpha + 255 * (255 - alpha)) / 255) as u8;
            }
            pixel[3] = 255;
        }

        Ok(canvas.into_raw())
    }

    fn chars(&self) -> Result<Vec<RawChar>> {
        Ok(Vec::new())
    }

    fn path_bounds(&self) -> Result<Vec<RawRect>> {
        Ok(Vec::new())
    }
}
