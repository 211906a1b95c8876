//! Per-document field detection
//!
//! [`FieldEngine`] opens a PDF or image, runs detection on each selected
//! page, cross-checks detections against printed underlines and rulings,
//! places them in the page's reading-order chain and emits
//! [`OutputField`]s.

use crate::config::{EngineConfig, PDF_CONFIDENCE_FACTOR};
use crate::error::{FieldError, Result};
use crate::fusion::{fuse, ruling_candidates, underline_candidates, ChainSettings, PageLayout, RulingSettings};
use crate::output::OutputField;
use docfield_detect::{boost_confidence, Detector, FieldDetector, NullDetector, OnnxModel};
use docfield_pdfium::{
    sort_reading_order, Binding, Document, Page, PdfError, PdfiumBinding, RasterBinding, RenderRequest, Source,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-call options
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Only process this page
    pub page: Option<usize>,
    pub password: Option<String>,
    /// Copied into every emitted area
    pub attachment_id: Option<String>,
}

/// Fields found on one page, as reported to a streaming callback
#[derive(Debug, Clone, Serialize)]
pub struct PageFields {
    pub attachment_id: Option<String>,
    pub page: usize,
    pub fields: Vec<OutputField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Pdf,
    Image,
}

/// Whether `bytes` look like a PDF file
#[must_use]
pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF")
}

/// Field detection engine.
///
/// Cheap to share between threads: the binding and detector are shared
/// trait objects and documents are opened per call.
pub struct FieldEngine {
    config: EngineConfig,
    pdf_binding: Option<Arc<dyn Binding>>,
    detector: Arc<dyn FieldDetector>,
}

impl std::fmt::Debug for FieldEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldEngine")
            .field("config", &self.config)
            .field("custom_pdf_binding", &self.pdf_binding.is_some())
            .finish_non_exhaustive()
    }
}

impl FieldEngine {
    /// Build an engine from configuration.
    ///
    /// Loads the ONNX model named by `model_path`; without one, detection
    /// finds nothing and only the layout is computed.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let detector: Arc<dyn FieldDetector> = match &config.model_path {
            Some(path) => Arc::new(Detector::new(OnnxModel::load_with_resolution(path, config.resolution)?)),
            None => {
                warn!("No detection model configured, fields will only come from a custom detector");
                Arc::new(NullDetector)
            }
        };
        Self::with_detector(config, detector)
    }

    /// Build an engine around an existing detector
    pub fn with_detector(config: EngineConfig, detector: Arc<dyn FieldDetector>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            pdf_binding: None,
            detector,
        })
    }

    /// Use `binding` for PDF input instead of the process-wide PDFium binding
    #[must_use]
    pub fn with_pdf_binding(mut self, binding: Arc<dyn Binding>) -> Self {
        self.pdf_binding = Some(binding);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Detect fields in a PDF or image
    pub fn detect(&self, bytes: &[u8], options: &RunOptions) -> Result<Vec<OutputField>> {
        self.detect_with(bytes, options, |_| {})
    }

    /// Detect fields, calling `on_page` once per processed page as soon as
    /// its fields are ready. Returns every field in page order.
    pub fn detect_with<F>(&self, bytes: &[u8], options: &RunOptions, mut on_page: F) -> Result<Vec<OutputField>>
    where
        F: FnMut(&PageFields),
    {
        let attachment_id = options.attachment_id.as_deref();
        let mut all = Vec::new();

        self.run(bytes, options, |page, layout| {
            let fields: Vec<OutputField> = layout
                .fields
                .iter()
                .map(|field| OutputField::from_detection(field, page, attachment_id))
                .collect();

            let event = PageFields {
                attachment_id: options.attachment_id.clone(),
                page,
                fields,
            };
            on_page(&event);
            all.extend(event.fields);
        })?;

        Ok(all)
    }

    /// Reading-order text of each processed page, fields shown as `[[kind]]`
    pub fn layout(&self, bytes: &[u8], options: &RunOptions) -> Result<Vec<(usize, String)>> {
        let mut pages = Vec::new();
        self.run(bytes, options, |page, layout| pages.push((page, layout.text())))?;
        Ok(pages)
    }

    fn run<F>(&self, bytes: &[u8], options: &RunOptions, mut on_layout: F) -> Result<()>
    where
        F: FnMut(usize, PageLayout),
    {
        let kind = if is_pdf(bytes) { InputKind::Pdf } else { InputKind::Image };
        let document = self.open(kind, bytes, options.password.as_deref())?;
        let page_count = document.page_count()?;
        let pages = self.select_pages(page_count, bytes.len(), options.page)?;

        info!(?kind, page_count, processing = pages.len(), "Detecting fields");

        for index in pages {
            let result = document.page(index).map_err(FieldError::from).and_then(|page| {
                let layout = self.process_page(kind, &page, options.attachment_id.as_deref());
                page.close();
                layout
            });

            match result {
                Ok(layout) => {
                    debug!(page = index, fields = layout.fields.len(), "Page done");
                    on_layout(index, layout);
                }
                Err(err) if err.is_fatal_for_document() => return Err(err),
                Err(err) => warn!(page = index, error = %err, "Skipping page"),
            }
        }

        document.close();
        Ok(())
    }

    fn open(&self, kind: InputKind, bytes: &[u8], password: Option<&str>) -> Result<Document> {
        let source = Source::Bytes(bytes.to_vec());
        match kind {
            InputKind::Pdf => match &self.pdf_binding {
                Some(binding) => Ok(Document::open_with(binding.as_ref(), source, password)?),
                None => {
                    let binding = PdfiumBinding::init(self.config.pdfium_library_path.as_deref())?;
                    Ok(Document::open_with(&binding, source, password)?)
                }
            },
            InputKind::Image => Document::open_with(&RasterBinding, source, None).map_err(|err| match err {
                PdfError::Format { reason } => FieldError::Format(reason),
                other => other.into(),
            }),
        }
    }

    fn select_pages(&self, page_count: usize, size: usize, requested: Option<usize>) -> Result<Vec<usize>> {
        if let Some(index) = requested {
            if index >= page_count {
                return Err(PdfError::OutOfRange {
                    index,
                    count: page_count,
                }
                .into());
            }
            return Ok(vec![index]);
        }

        let policy = &self.config.page_policy;
        let mut limit = page_count;
        if let Some(max_pages) = policy.max_pages {
            limit = limit.min(max_pages);
        }
        if policy.single_page_above_bytes.is_some_and(|threshold| size > threshold) {
            debug!(size, "Large document, processing the first page only");
            limit = limit.min(1);
        }
        Ok((0..limit).collect())
    }

    fn process_page(&self, kind: InputKind, page: &Page<'_>, attachment_id: Option<&str>) -> Result<PageLayout> {
        let config = &self.config;
        let layout = &config.layout;

        let (request, confidence) = match kind {
            InputKind::Pdf => (
                RenderRequest::width(config.render_width()),
                config.confidence * PDF_CONFIDENCE_FACTOR,
            ),
            InputKind::Image => (RenderRequest::natural(), config.confidence),
        };

        let bitmap = page.render_to_bitmap(request)?;
        let image = bitmap.to_rgb_image()?;
        let mut fields = self.detector.detect(&image, &config.detect_params(confidence))?;

        let text_nodes = page.text_nodes()?;
        if kind == InputKind::Pdf {
            let line_nodes = page.line_nodes()?;
            let underlines = underline_candidates(&text_nodes, layout.underscore_gap);
            let rulings = ruling_candidates(
                &line_nodes,
                &text_nodes,
                RulingSettings {
                    width_ratio: layout.line_width_ratio,
                    thickness: layout.line_thickness_pt / page.height()?,
                },
            );
            debug!(
                page = page.index(),
                detections = fields.len(),
                underlines = underlines.len(),
                rulings = rulings.len(),
                "Boosting detections"
            );

            boost_confidence(&mut fields, &underlines, layout.boost_iou_threshold, layout.boost_bonus);
            boost_confidence(&mut fields, &rulings, layout.boost_iou_threshold, layout.boost_bonus);
            fields.retain(|field| field.confidence >= config.confidence);
        }

        let settings = ChainSettings {
            y_tolerance: layout.y_tolerance_px / image.height().max(1) as f32,
            tab_gap: layout.tab_gap,
        };
        // custom detectors may hand back fields in any order
        sort_reading_order(&mut fields, settings.y_tolerance);
        Ok(fuse(
            &text_nodes,
            fields,
            page.index(),
            attachment_id,
            settings,
            config.regexp_type,
        ))
    }
}
