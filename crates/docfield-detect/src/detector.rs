//! Whole-image field detection

use crate::error::Result;
use crate::field::DetectedField;
use crate::model::InferenceModel;
use crate::nms::non_max_suppression;
use crate::params::DetectParams;
use crate::postprocess::decode;
use crate::preprocess::{plan_tiles, prepare_tensor, trim_with_padding};
use docfield_pdfium::sort_reading_order;
use image::RgbImage;
use tracing::debug;

/// Anything that turns a page image into normalized field boxes
pub trait FieldDetector: Send + Sync {
    /// Detect fields in `image`.
    ///
    /// Returned boxes are normalized to the image, clamped to the unit
    /// square, de-duplicated and in reading order.
    fn detect(&self, image: &RgbImage, params: &DetectParams) -> Result<Vec<DetectedField>>;
}

/// Detector used when no model is configured; finds nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDetector;

impl FieldDetector for NullDetector {
    fn detect(&self, _image: &RgbImage, _params: &DetectParams) -> Result<Vec<DetectedField>> {
        Ok(Vec::new())
    }
}

/// Runs an [`InferenceModel`] over trimmed, optionally tiled page images
#[derive(Debug)]
pub struct Detector<M> {
    model: M,
}

impl<M: InferenceModel> Detector<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

impl<M: InferenceModel> FieldDetector for Detector<M> {
    fn detect(&self, image: &RgbImage, params: &DetectParams) -> Result<Vec<DetectedField>> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }

        let resolution = self.model.resolution();
        let normalization = self.model.family().normalization();
        let region = trim_with_padding(image, params.padding);
        let tiles = plan_tiles(width, height, region, params.split_page);

        let mut fields = Vec::new();
        for tile in &tiles {
            let crop = image::imageops::crop_imm(image, tile.x, tile.y, tile.width, tile.height).to_image();
            let (tensor, mut transform) = prepare_tensor(&crop, resolution, params.aspect_ratio, normalization);
            transform.offset_x = tile.x as f32;
            transform.offset_y = tile.y as f32;

            let output = self.model.infer(tensor)?;
            for detection in decode(&output, &transform, resolution, params) {
                let rect = detection
                    .rect
                    .normalize(width as f32, height as f32)
                    .clamp_unit();
                fields.push(DetectedField::new(detection.kind, rect, detection.score));
            }
        }

        let raw = fields.len();
        let mut fields = non_max_suppression(fields, params.nms_iou_threshold, params.containment_threshold);
        sort_reading_order(&mut fields, params.row_tolerance_px / height as f32);

        debug!(
            tiles = tiles.len(),
            raw,
            kept = fields.len(),
            "Detected fields"
        );

        Ok(fields)
    }
}

impl<T: FieldDetector + ?Sized> FieldDetector for Box<T> {
    fn detect(&self, image: &RgbImage, params: &DetectParams) -> Result<Vec<DetectedField>> {
        (**self).detect(image, params)
    }
}

impl<T: FieldDetector + ?Sized> FieldDetector for std::sync::Arc<T> {
    fn detect(&self, image: &RgbImage, params: &DetectParams) -> Result<Vec<DetectedField>> {
        (**self).detect(image, params)
    }
}
