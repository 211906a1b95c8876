//! Image preparation: whitespace trim, tiling, resize and tensor layout

use docfield_pdfium::Rect;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use ndarray::Array4;

/// A pixel channel must differ from white by more than this to count as content
pub const TRIM_THRESHOLD: u8 = 10;

/// `ImageNet` channel means
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// `ImageNet` channel standard deviations
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Pixel normalization applied after scaling to `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// `x / 255`
    UnitRange,
    /// `(x / 255 - mean) / std` per channel
    MeanStd { mean: [f32; 3], std: [f32; 3] },
}

impl Normalization {
    #[must_use]
    pub fn imagenet() -> Self {
        Normalization::MeanStd {
            mean: IMAGENET_MEAN,
            std: IMAGENET_STD,
        }
    }

    #[inline]
    fn apply(&self, channel: usize, value: u8) -> f32 {
        let scaled = f32::from(value) / 255.0;
        match self {
            Normalization::UnitRange => scaled,
            Normalization::MeanStd { mean, std } => (scaled - mean[channel]) / std[channel],
        }
    }
}

/// A pixel region of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crop {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Crop {
    #[must_use]
    pub fn full(image: &RgbImage) -> Self {
        Self {
            x: 0,
            y: 0,
            width: image.width(),
            height: image.height(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Bounding box of every pixel that is not (nearly) white.
///
/// Returns `None` for a blank image.
#[must_use]
pub fn content_bounds(image: &RgbImage, threshold: u8) -> Option<Crop> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut found = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel.0.iter().any(|&channel| 255 - channel > threshold) {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    found.then(|| Crop {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Content bounds grown by `padding` on every side and clipped to the image.
///
/// `None` padding disables trimming; a blank image keeps its full extent.
#[must_use]
pub fn trim_with_padding(image: &RgbImage, padding: Option<u32>) -> Crop {
    let Some(padding) = padding else {
        return Crop::full(image);
    };
    let Some(content) = content_bounds(image, TRIM_THRESHOLD) else {
        return Crop::full(image);
    };

    let left = content.x.saturating_sub(padding);
    let top = content.y.saturating_sub(padding);
    let right = (content.x + content.width + padding).min(image.width());
    let bottom = (content.y + content.height + padding).min(image.height());

    Crop {
        x: left,
        y: top,
        width: right - left,
        height: bottom - top,
    }
}

/// Regions to run inference on.
///
/// With `split` set and a portrait image, the trimmed region is cut into a
/// top and a bottom half; otherwise the region is used whole.
#[must_use]
pub fn plan_tiles(image_width: u32, image_height: u32, region: Crop, split: bool) -> Vec<Crop> {
    if !split || image_height <= image_width {
        return vec![region];
    }

    let top_height = region.height / 2;
    [
        Crop {
            height: top_height,
            ..region
        },
        Crop {
            y: region.y + top_height,
            height: region.height - top_height,
            ..region
        },
    ]
    .into_iter()
    .filter(|tile| !tile.is_empty())
    .collect()
}

/// How tile pixels map into model input space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale_x: f32,
    pub scale_y: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    /// Tile origin inside the full image
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Transform {
    /// Map model-space corners back to full-image pixels
    #[must_use]
    pub fn to_image(&self, x1: f32, y1: f32, x2: f32, y2: f32) -> Rect {
        Rect::from_corners(
            (x1 - self.pad_x) / self.scale_x + self.offset_x,
            (y1 - self.pad_y) / self.scale_y + self.offset_y,
            (x2 - self.pad_x) / self.scale_x + self.offset_x,
            (y2 - self.pad_y) / self.scale_y + self.offset_y,
        )
    }
}

/// Resize `image` into a `resolution`-square tensor of shape `[1, 3, R, R]`.
///
/// With `aspect_ratio` the image is scaled uniformly and centered on a white
/// canvas; otherwise each axis is scaled independently.
#[must_use]
pub fn prepare_tensor(
    image: &RgbImage,
    resolution: u32,
    aspect_ratio: bool,
    normalization: Normalization,
) -> (Array4<f32>, Transform) {
    let scale_x = resolution as f32 / image.width() as f32;
    let scale_y = resolution as f32 / image.height() as f32;

    let (canvas, transform) = if aspect_ratio {
        let scale = scale_x.min(scale_y);
        let new_width = ((image.width() as f32 * scale).round() as u32).clamp(1, resolution);
        let new_height = ((image.height() as f32 * scale).round() as u32).clamp(1, resolution);
        let pad_x = ((resolution - new_width) as f32 / 2.0).round();
        let pad_y = ((resolution - new_height) as f32 / 2.0).round();

        let resized = imageops::resize(image, new_width, new_height, FilterType::Lanczos3);
        let mut canvas = RgbImage::from_pixel(resolution, resolution, WHITE);
        imageops::replace(&mut canvas, &resized, pad_x as i64, pad_y as i64);

        (
            canvas,
            Transform {
                scale_x: scale,
                scale_y: scale,
                pad_x,
                pad_y,
                offset_x: 0.0,
                offset_y: 0.0,
            },
        )
    } else {
        let resized = imageops::resize(image, resolution, resolution, FilterType::Lanczos3);
        (
            resized,
            Transform {
                scale_x,
                scale_y,
                pad_x: 0.0,
                pad_y: 0.0,
                offset_x: 0.0,
                offset_y: 0.0,
            },
        )
    };

    let size = resolution as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));
    for (x, y, pixel) in canvas.enumerate_pixels() {
        for channel in 0..3 {
            tensor[[0, channel, y as usize, x as usize]] = normalization.apply(channel, pixel[channel]);
        }
    }

    (tensor, transform)
}
