//! `docfield layout` - page text with detected fields in reading order

use super::{read_input, EngineArgs};
use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct LayoutCommand {
    /// PDF or image file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    #[command(flatten)]
    engine: EngineArgs,
}

impl LayoutCommand {
    pub fn execute(self) -> Result<()> {
        let engine = self.engine.engine()?;
        let bytes = read_input(&self.input)?;
        let options = self.engine.run_options(&self.input);

        let pages = engine
            .layout(&bytes, &options)
            .with_context(|| format!("Failed to lay out {}", self.input.display()))?;

        for (page, text) in pages {
            println!("--- page {page} ---");
            println!("{text}");
        }
        Ok(())
    }
}
