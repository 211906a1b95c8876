//! # docfield-detect
//!
//! Form-field detection on rendered page images.
//!
//! A [`Detector`] trims the white margins of a page image, optionally splits
//! tall pages in two, letterboxes each tile to the model resolution, runs an
//! [`InferenceModel`] and maps the raw boxes back to the unit square of the
//! page. Overlapping boxes are removed with class-agnostic non-maximum
//! suppression plus a containment check, and the survivors come back in
//! reading order.
//!
//! Two output layouts are understood (see [`ModelFamily`]):
//!
//! - **Queries**: `dets` `[1, N, 4]` normalized `cx, cy, w, h` and `labels`
//!   `[1, N, C]` logits, scored with a temperature-scaled sigmoid
//! - **Corners**: one `[1, N, 6]` tensor of `x1, y1, x2, y2, score, class`
//!
//! ## Example
//!
//! ```no_run
//! use docfield_detect::{DetectParams, Detector, FieldDetector, OnnxModel};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let model = OnnxModel::load(Path::new("models/fields.onnx"))?;
//! let detector = Detector::new(model);
//!
//! let image = image::open("page.png")?.to_rgb8();
//! for field in detector.detect(&image, &DetectParams::default())? {
//!     println!("{} at ({:.3}, {:.3}) conf {:.2}", field.kind, field.x, field.y, field.confidence);
//! }
//! # Ok(())
//! # }
//! ```

pub mod detector;
pub mod error;
pub mod field;
pub mod model;
pub mod nms;
pub mod params;
pub mod postprocess;
pub mod preprocess;

pub use detector::{Detector, FieldDetector, NullDetector};
pub use error::{DetectError, Result};
pub use field::{DetectedField, FieldKind};
pub use model::{InferenceModel, OnnxModel, DEFAULT_RESOLUTION};
pub use nms::{boost_confidence, non_max_suppression, BOOST_BONUS, BOOST_IOU_THRESHOLD};
pub use params::{DetectParams, CONTAINMENT_THRESHOLD, ROW_TOLERANCE_PX};
pub use postprocess::{ModelFamily, PixelDetection, RawOutput};
pub use preprocess::{Crop, Normalization, Transform, TRIM_THRESHOLD};
