//! docfield - form-field detection from the command line
//!
//! Runs field detection over PDFs and page images and prints the fields as
//! JSON, or prints the reading-order layout text of each page.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod commands;

use commands::detect::DetectCommand;
use commands::layout::LayoutCommand;

#[derive(Parser)]
#[command(
    name = "docfield",
    version,
    about = "Detect fillable form fields in PDFs and scanned pages",
    after_help = "EXAMPLES:\n  \
                  # Detect fields and print them as JSON\n  \
                  docfield detect --model fields.onnx form.pdf\n\n  \
                  # One JSON line per page as soon as it is ready\n  \
                  docfield detect --model fields.onnx --stream a.pdf b.pdf scan.png\n\n  \
                  # Show where fields land in the page text\n  \
                  docfield layout --model fields.onnx form.pdf"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect form fields and print them as JSON
    Detect(DetectCommand),

    /// Print each page's text with fields shown in place
    Layout(LayoutCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    // RUST_LOG wins over -v when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    // stdout carries the JSON, logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Detect(cmd) => cmd.execute(),
        Commands::Layout(cmd) => cmd.execute(),
    }
}
