//! Engine configuration
//!
//! Every field has a default, so a JSON config file only needs the keys it
//! changes:
//!
//! ```json
//! { "confidence": 0.25, "split_page": true, "layout": { "tab_gap": 0.08 } }
//! ```

use crate::error::{FieldError, Result};
use docfield_detect::{DetectParams, CONTAINMENT_THRESHOLD, DEFAULT_RESOLUTION, ROW_TOLERANCE_PX};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// PDF pages are rendered this many times wider than the model resolution
pub const RENDER_SCALE: f32 = 1.5;

/// Detection on PDF pages runs at this fraction of the requested confidence
/// so that underline-backed fields can be boosted over the final threshold
pub const PDF_CONFIDENCE_FACTOR: f32 = 0.25;

/// Limits on how much of a document is processed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagePolicy {
    /// Pages past this count are skipped
    pub max_pages: Option<usize>,
    /// Documents larger than this many bytes only get their first page processed
    pub single_page_above_bytes: Option<usize>,
}

/// Tunable layout heuristics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Same-row tolerance, in rendered pixels
    pub y_tolerance_px: f32,
    /// `IoU` a detection must exceed against an underline candidate to be boosted
    pub boost_iou_threshold: f32,
    /// Confidence added per boosting candidate set
    pub boost_bonus: f32,
    /// Horizontal rulings wider than this fraction of the page are borders
    pub line_width_ratio: f32,
    /// Largest horizontal gap between characters of one underscore run
    pub underscore_gap: f32,
    /// Horizontal gap on one row that is rendered as a tab in the chain text
    pub tab_gap: f32,
    /// Ruling thickness used for intersection tests, in page units
    pub line_thickness_pt: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            y_tolerance_px: ROW_TOLERANCE_PX,
            boost_iou_threshold: docfield_detect::BOOST_IOU_THRESHOLD,
            boost_bonus: docfield_detect::BOOST_BONUS,
            line_width_ratio: docfield_pdfium::BORDER_WIDTH_RATIO,
            underscore_gap: 0.02,
            tab_gap: 0.05,
            line_thickness_pt: 5.0,
        }
    }
}

/// Configuration of a [`FieldEngine`](crate::FieldEngine)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum confidence of an emitted field
    pub confidence: f32,
    pub nms_iou_threshold: f32,
    pub containment_threshold: f32,
    pub temperature: f32,
    pub split_page: bool,
    pub aspect_ratio: bool,
    pub padding: Option<u32>,
    /// Retype text fields from their label
    pub regexp_type: bool,
    /// Model input resolution
    pub resolution: u32,
    pub model_path: Option<PathBuf>,
    /// Directory holding the PDFium shared library
    pub pdfium_library_path: Option<PathBuf>,
    pub page_policy: PagePolicy,
    pub layout: LayoutConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let detect = DetectParams::default();
        Self {
            confidence: detect.confidence,
            nms_iou_threshold: detect.nms_iou_threshold,
            containment_threshold: CONTAINMENT_THRESHOLD,
            temperature: detect.temperature,
            split_page: detect.split_page,
            aspect_ratio: detect.aspect_ratio,
            padding: detect.padding,
            regexp_type: true,
            resolution: DEFAULT_RESOLUTION,
            model_path: None,
            pdfium_library_path: None,
            page_policy: PagePolicy::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Fewer, surer fields; large documents are cut short
    #[must_use]
    pub fn fast() -> Self {
        Self {
            confidence: 0.4,
            split_page: false,
            page_policy: PagePolicy {
                max_pages: Some(20),
                single_page_above_bytes: Some(20 * 1024 * 1024),
            },
            ..Self::default()
        }
    }

    /// More candidates; tall pages are split for extra resolution
    #[must_use]
    pub fn accurate() -> Self {
        Self {
            confidence: 0.2,
            split_page: true,
            ..Self::default()
        }
    }

    /// Load from a JSON file; missing keys keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FieldError::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| FieldError::Config(format!("failed to parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no detection run could use
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: f32| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(FieldError::Config(format!("{name} must be within 0..=1, got {value}")))
            }
        };
        unit("confidence", self.confidence)?;
        unit("nms_iou_threshold", self.nms_iou_threshold)?;
        unit("containment_threshold", self.containment_threshold)?;

        if self.temperature <= 0.0 {
            return Err(FieldError::Config(format!(
                "temperature must be positive, got {}",
                self.temperature
            )));
        }
        if self.resolution == 0 {
            return Err(FieldError::Config("resolution must be positive".to_string()));
        }
        Ok(())
    }

    /// Detection parameters for a run at `confidence`
    #[must_use]
    pub fn detect_params(&self, confidence: f32) -> DetectParams {
        DetectParams {
            confidence,
            nms_iou_threshold: self.nms_iou_threshold,
            containment_threshold: self.containment_threshold,
            temperature: self.temperature,
            split_page: self.split_page,
            aspect_ratio: self.aspect_ratio,
            padding: self.padding,
            row_tolerance_px: self.layout.y_tolerance_px,
        }
    }

    /// Width PDF pages are rendered at before detection
    #[must_use]
    pub fn render_width(&self) -> u32 {
        (self.resolution as f32 * RENDER_SCALE).round() as u32
    }
}
