//! Subcommands and the engine options they share

pub mod detect;
pub mod layout;

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use docfield::{EngineConfig, FieldEngine};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Starting point before `--config` and individual flags are applied
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Preset {
    #[default]
    Default,
    Fast,
    Accurate,
}

/// Engine options common to every subcommand
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// ONNX field detection model
    #[arg(long, value_name = "PATH")]
    model: Option<PathBuf>,

    /// PDFium shared library (searched next to the binary and on the system path if omitted)
    #[arg(long, value_name = "PATH")]
    pdfium_lib: Option<PathBuf>,

    /// JSON configuration file; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Preset used when no configuration file is given
    #[arg(long, value_enum, default_value_t = Preset::Default)]
    preset: Preset,

    /// Minimum confidence for a field to be reported
    #[arg(long)]
    confidence: Option<f32>,

    /// IoU above which overlapping detections are suppressed
    #[arg(long)]
    nms: Option<f32>,

    /// Softmax temperature applied to class logits
    #[arg(long)]
    temperature: Option<f32>,

    /// Split tall pages in two halves before detection
    #[arg(long)]
    split_page: bool,

    /// Stretch pages to the model input instead of letterboxing
    #[arg(long)]
    stretch: bool,

    /// Padding (pixels) kept around the trimmed page content
    #[arg(long)]
    padding: Option<u32>,

    /// Keep detected kinds instead of retyping text fields from their labels
    #[arg(long)]
    no_retype: bool,

    /// Only process this page (zero based)
    #[arg(long)]
    page: Option<usize>,

    /// Password for encrypted PDFs
    #[arg(long)]
    password: Option<String>,
}

impl EngineArgs {
    fn config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_json_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => match self.preset {
                Preset::Default => EngineConfig::default(),
                Preset::Fast => EngineConfig::fast(),
                Preset::Accurate => EngineConfig::accurate(),
            },
        };

        if let Some(model) = &self.model {
            config.model_path = Some(model.clone());
        }
        if let Some(lib) = &self.pdfium_lib {
            config.pdfium_library_path = Some(lib.clone());
        }
        if let Some(confidence) = self.confidence {
            config.confidence = confidence;
        }
        if let Some(nms) = self.nms {
            config.nms_iou_threshold = nms;
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(padding) = self.padding {
            config.padding = Some(padding);
        }
        config.split_page |= self.split_page;
        config.aspect_ratio &= !self.stretch;
        config.regexp_type &= !self.no_retype;

        config.validate().context("Invalid engine configuration")?;
        Ok(config)
    }

    /// Build the engine these options describe
    pub fn engine(&self) -> Result<FieldEngine> {
        let config = self.config()?;
        debug!(?config, "Engine configuration");
        FieldEngine::new(config).context("Failed to create field engine")
    }

    pub fn run_options(&self, input: &Path) -> docfield::RunOptions {
        docfield::RunOptions {
            page: self.page,
            password: self.password.clone(),
            attachment_id: Some(attachment_id(input)),
        }
    }
}

/// Attachment id reported for an input file: its file name
pub fn attachment_id(input: &Path) -> String {
    input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}

pub fn read_input(input: &Path) -> Result<Vec<u8>> {
    std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))
}
