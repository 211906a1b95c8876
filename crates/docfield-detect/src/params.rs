//! Per-call detection parameters

use serde::{Deserialize, Serialize};

/// Containment ratio at which a lower-scoring nested box is suppressed
pub const CONTAINMENT_THRESHOLD: f32 = 0.7;

/// Row tolerance for ordering detections, in rendered pixels
pub const ROW_TOLERANCE_PX: f32 = 10.0;

/// Detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectParams {
    /// Minimum confidence a raw detection needs (exclusive)
    pub confidence: f32,
    /// `IoU` above which the lower-scoring of two boxes is suppressed
    pub nms_iou_threshold: f32,
    /// Containment ratio at or above which the lower-scoring box is suppressed
    pub containment_threshold: f32,
    /// Logit temperature for query-style models
    pub temperature: f32,
    /// Split tall pages into two halves before inference
    pub split_page: bool,
    /// Letterbox instead of stretching to the model resolution
    pub aspect_ratio: bool,
    /// Margin kept around the trimmed content, in pixels (`None` disables trimming)
    pub padding: Option<u32>,
    /// Row tolerance used when sorting detections, in pixels
    pub row_tolerance_px: f32,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            confidence: 0.3,
            nms_iou_threshold: 0.1,
            containment_threshold: CONTAINMENT_THRESHOLD,
            temperature: 1.0,
            split_page: false,
            aspect_ratio: true,
            padding: Some(20),
            row_tolerance_px: ROW_TOLERANCE_PX,
        }
    }
}
