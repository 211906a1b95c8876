//! Inference backends
//!
//! [`InferenceModel`] is the seam between tensor preparation and the runtime.
//! [`OnnxModel`] is the production implementation; tests plug in synthetic
//! models that never touch ONNX Runtime.

use crate::error::{DetectError, Result};
use crate::postprocess::{ModelFamily, RawOutput};
use ndarray::Array4;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::Session;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// Default square input resolution of the field detection models
pub const DEFAULT_RESOLUTION: u32 = 704;

const QUERY_BOXES_OUTPUT: &str = "dets";
const QUERY_LOGITS_OUTPUT: &str = "labels";

/// A detection model: takes a `[1, 3, R, R]` tensor, returns raw outputs
pub trait InferenceModel: Send + Sync {
    fn family(&self) -> ModelFamily;

    /// Square input size `R`
    fn resolution(&self) -> u32;

    fn infer(&self, input: Array4<f32>) -> Result<RawOutput>;
}

/// ONNX Runtime session wrapper
pub struct OnnxModel {
    session: Mutex<Session>,
    input_name: String,
    family: ModelFamily,
    resolution: u32,
}

impl std::fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxModel")
            .field("input_name", &self.input_name)
            .field("family", &self.family)
            .field("resolution", &self.resolution)
            .finish_non_exhaustive()
    }
}

impl OnnxModel {
    /// Load a model with the default resolution
    pub fn load(model_path: &Path) -> Result<Self> {
        Self::load_with_resolution(model_path, DEFAULT_RESOLUTION)
    }

    /// Load a model, introspecting its input name and output layout.
    ///
    /// The session uses the CPU execution provider with one intra-op thread
    /// per available core.
    pub fn load_with_resolution(model_path: &Path, resolution: u32) -> Result<Self> {
        let load_error = |reason: String| DetectError::ModelLoad {
            path: model_path.display().to_string(),
            reason,
        };

        if !model_path.exists() {
            return Err(load_error("file not found".to_string()));
        }

        let num_threads = std::thread::available_parallelism().map_or(1, usize::from);
        let session = Session::builder()
            .map_err(|e| load_error(e.to_string()))?
            .with_intra_threads(num_threads)
            .map_err(|e| load_error(e.to_string()))?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .map_err(|e| load_error(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| load_error(e.to_string()))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| load_error("model declares no inputs".to_string()))?;

        let output_names: Vec<&str> = session.outputs.iter().map(|o| o.name.as_str()).collect();
        let family = if output_names.contains(&QUERY_BOXES_OUTPUT) && output_names.contains(&QUERY_LOGITS_OUTPUT) {
            ModelFamily::Queries
        } else {
            ModelFamily::Corners
        };

        info!(
            path = %model_path.display(),
            ?family,
            input = %input_name,
            threads = num_threads,
            "Loaded field detection model"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            family,
            resolution,
        })
    }
}

impl InferenceModel for OnnxModel {
    fn family(&self) -> ModelFamily {
        self.family
    }

    fn resolution(&self) -> u32 {
        self.resolution
    }

    fn infer(&self, input: Array4<f32>) -> Result<RawOutput> {
        let shape = input.shape().to_vec();
        let data = input.into_raw_vec_and_offset().0;

        let input_value = ort::value::Value::from_array((shape.as_slice(), data))
            .map_err(|e| DetectError::Preprocessing(e.to_string()))?;

        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .map_err(|e| DetectError::Inference(e.to_string()))?;

        match self.family {
            ModelFamily::Queries => {
                // dets: [1, N, 4] cx/cy/w/h, labels: [1, N, C] logits
                let (boxes_shape, boxes_data) = outputs[QUERY_BOXES_OUTPUT]
                    .try_extract_tensor::<f32>()
                    .map_err(|e| DetectError::Inference(e.to_string()))?;
                let (logits_shape, logits_data) = outputs[QUERY_LOGITS_OUTPUT]
                    .try_extract_tensor::<f32>()
                    .map_err(|e| DetectError::Inference(e.to_string()))?;

                if boxes_shape.len() != 3 || boxes_shape[2] != 4 || logits_shape.len() != 3 {
                    return Err(DetectError::Inference(format!(
                        "unexpected output shapes: dets {boxes_shape:?}, labels {logits_shape:?}"
                    )));
                }

                let num_queries = (boxes_shape[1] as usize).min(logits_shape[1] as usize);
                let num_classes = logits_shape[2] as usize;
                debug!(num_queries, num_classes, "Decoding query outputs");

                let boxes = boxes_data
                    .chunks_exact(4)
                    .take(num_queries)
                    .map(|b| [b[0], b[1], b[2], b[3]])
                    .collect();
                let logits = logits_data
                    .chunks_exact(num_classes.max(1))
                    .take(num_queries)
                    .map(<[f32]>::to_vec)
                    .collect();

                Ok(RawOutput::Queries { boxes, logits })
            }
            ModelFamily::Corners => {
                let (shape, data) = outputs[0]
                    .try_extract_tensor::<f32>()
                    .map_err(|e| DetectError::Inference(e.to_string()))?;

                if shape.last().copied() != Some(6) {
                    return Err(DetectError::Inference(format!(
                        "expected [1, N, 6] detections, got {shape:?}"
                    )));
                }

                let rows = data
                    .chunks_exact(6)
                    .map(|r| [r[0], r[1], r[2], r[3], r[4], r[5]])
                    .collect::<Vec<_>>();
                debug!(rows = rows.len(), "Decoding corner outputs");

                Ok(RawOutput::Corners(rows))
            }
        }
    }
}
