//! # docfield
//!
//! Finds fillable form fields (text boxes, checkboxes, dates, signatures,
//! numbers) on PDF pages and scanned page images.
//!
//! Each page is rendered, run through a detection model, and cross-checked
//! with the page's own geometry: printed underscore runs and free-standing
//! rulings raise the confidence of detections on top of them. The surviving
//! fields are placed in a reading-order chain with the page text, and text
//! fields are retyped from the label right before them ("Date:" gives a date
//! field, "Sign here" a signature).
//!
//! ## Quick Start
//!
//! ```no_run
//! use docfield::{EngineConfig, FieldEngine, RunOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig {
//!     model_path: Some("models/fields.onnx".into()),
//!     ..EngineConfig::default()
//! };
//! let engine = FieldEngine::new(config)?;
//!
//! let bytes = std::fs::read("form.pdf")?;
//! let fields = engine.detect_with(&bytes, &RunOptions::default(), |page| {
//!     println!("page {}: {} fields", page.page, page.fields.len());
//! })?;
//! println!("{}", serde_json::to_string_pretty(&fields)?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod fusion;
pub mod output;
pub mod pipeline;

pub use config::{EngineConfig, LayoutConfig, PagePolicy, PDF_CONFIDENCE_FACTOR, RENDER_SCALE};
pub use error::{FieldError, Result};
pub use fusion::{fuse, Chain, ChainSettings, NodeElem, PageLayout, PageNode};
pub use output::{FieldArea, OutputField};
pub use pipeline::{is_pdf, FieldEngine, PageFields, RunOptions};

pub use docfield_detect::{DetectedField, FieldDetector, FieldKind};
