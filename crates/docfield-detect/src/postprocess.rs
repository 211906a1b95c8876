//! Decoding raw model outputs into pixel-space detections

use crate::field::FieldKind;
use crate::params::DetectParams;
use crate::preprocess::{Normalization, Transform};
use docfield_pdfium::Rect;

/// Output layout of a detection model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// Query-based detector: normalized `cxcywh` boxes plus per-class logits
    Queries,
    /// Corner detector: `[x1, y1, x2, y2, score, class]` rows in input pixels
    Corners,
}

impl ModelFamily {
    /// Input normalization the family was trained with
    #[must_use]
    pub fn normalization(&self) -> Normalization {
        match self {
            ModelFamily::Queries => Normalization::imagenet(),
            ModelFamily::Corners => Normalization::UnitRange,
        }
    }
}

/// Raw tensors produced by one inference call
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutput {
    Queries {
        boxes: Vec<[f32; 4]>,
        logits: Vec<Vec<f32>>,
    },
    Corners(Vec<[f32; 6]>),
}

/// A detection in full-image pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelDetection {
    pub kind: FieldKind,
    pub rect: Rect,
    pub score: f32,
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Decode one tile's output.
///
/// Detections scoring at or below `params.confidence` and those with an
/// unknown class are dropped.
#[must_use]
pub fn decode(
    output: &RawOutput,
    transform: &Transform,
    resolution: u32,
    params: &DetectParams,
) -> Vec<PixelDetection> {
    let resolution = resolution as f32;
    let mut detections = Vec::new();

    match output {
        RawOutput::Queries { boxes, logits } => {
            let temperature = if params.temperature > 0.0 {
                params.temperature
            } else {
                1.0
            };

            for (bbox, class_logits) in boxes.iter().zip(logits) {
                let Some((class_id, score)) = class_logits
                    .iter()
                    .map(|&logit| sigmoid(logit / temperature))
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(&b.1))
                else {
                    continue;
                };

                if score <= params.confidence {
                    continue;
                }
                let Some(kind) = FieldKind::from_class_id(class_id) else {
                    continue;
                };

                let [cx, cy, w, h] = *bbox;
                let rect = transform.to_image(
                    (cx - w / 2.0) * resolution,
                    (cy - h / 2.0) * resolution,
                    (cx + w / 2.0) * resolution,
                    (cy + h / 2.0) * resolution,
                );
                detections.push(PixelDetection { kind, rect, score });
            }
        }
        RawOutput::Corners(rows) => {
            for &[x1, y1, x2, y2, score, class] in rows {
                if score <= params.confidence || class < 0.0 {
                    continue;
                }
                let Some(kind) = FieldKind::from_class_id(class.round() as usize) else {
                    continue;
                };

                let rect = transform.to_image(x1, y1, x2, y2);
                detections.push(PixelDetection { kind, rect, score });
            }
        }
    }

    detections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Transform {
        Transform {
            scale_x: 1.0,
            scale_y: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    #[test]
    fn test_queries_decode() {
        let output = RawOutput::Queries {
            boxes: vec![[0.5, 0.5, 0.2, 0.1], [0.1, 0.1, 0.1, 0.1]],
            logits: vec![vec![-5.0, 3.0], vec![-4.0, -4.0]],
        };
        let detections = decode(&output, &identity(), 100, &DetectParams::default());

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].kind, FieldKind::Checkbox);
        assert!(detections[0].rect.approx_eq(&Rect::new(40.0, 45.0, 20.0, 10.0), 1e-4));
        assert!((detections[0].score - sigmoid(3.0)).abs() < 1e-6);
    }

    #[test]
    fn test_temperature_softens_scores() {
        let output = RawOutput::Queries {
            boxes: vec![[0.5, 0.5, 0.2, 0.1]],
            logits: vec![vec![1.0]],
        };
        let params = DetectParams {
            temperature: 2.0,
            ..DetectParams::default()
        };
        let detections = decode(&output, &identity(), 100, &params);
        assert!((detections[0].score - sigmoid(0.5)).abs() < 1e-6);
    }

    #[test]
    fn test_corners_decode_with_offset() {
        let output = RawOutput::Corners(vec![
            [10.0, 20.0, 30.0, 40.0, 0.9, 0.0],
            [10.0, 20.0, 30.0, 40.0, 0.2, 0.0],
            [10.0, 20.0, 30.0, 40.0, 0.9, 5.0],
        ]);
        let transform = Transform {
            scale_x: 0.5,
            scale_y: 0.5,
            pad_x: 10.0,
            pad_y: 0.0,
            offset_x: 0.0,
            offset_y: 100.0,
        };
        let detections = decode(&output, &transform, 100, &DetectParams::default());

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].kind, FieldKind::Text);
        assert!(detections[0].rect.approx_eq(&Rect::new(0.0, 140.0, 40.0, 40.0), 1e-4));
    }

    #[test]
    fn test_score_at_threshold_is_dropped() {
        let output = RawOutput::Corners(vec![[0.0, 0.0, 1.0, 1.0, 0.3, 0.0]]);
        assert!(decode(&output, &identity(), 10, &DetectParams::default()).is_empty());
    }

    #[test]
    fn test_family_normalization() {
        assert_eq!(ModelFamily::Corners.normalization(), Normalization::UnitRange);
        assert_eq!(ModelFamily::Queries.normalization(), Normalization::imagenet());
    }
}
