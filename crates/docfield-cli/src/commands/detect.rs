//! `docfield detect` - fields as JSON, whole documents or streamed per page

use super::{read_input, EngineArgs};
use anyhow::{bail, Context as _, Result};
use clap::Args;
use docfield::{FieldEngine, OutputField, PageFields};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

#[derive(Args)]
pub struct DetectCommand {
    /// PDF or image files
    #[arg(value_name = "FILES", required = true)]
    inputs: Vec<PathBuf>,

    #[command(flatten)]
    engine: EngineArgs,

    /// Print one JSON line per page as soon as it is done, then `{"completed":true}`
    #[arg(long)]
    stream: bool,

    /// Files processed in parallel (defaults to the number of cores)
    #[arg(long)]
    jobs: Option<usize>,
}

/// Fields of one input file, as printed without `--stream`
#[derive(Serialize)]
struct DocumentFields<'a> {
    input: &'a Path,
    fields: Vec<OutputField>,
}

#[derive(Serialize)]
struct Completed {
    completed: bool,
}

impl DetectCommand {
    pub fn execute(self) -> Result<()> {
        let engine = self.engine.engine()?;

        let mut pool = ThreadPoolBuilder::new();
        if let Some(jobs) = self.jobs {
            pool = pool.num_threads(jobs);
        }
        let pool = pool.build().context("Failed to build worker pool")?;

        let start = Instant::now();
        let results: Vec<Result<Vec<OutputField>>> = pool.install(|| {
            self.inputs
                .par_iter()
                .map(|input| self.detect_file(&engine, input))
                .collect()
        });

        let mut documents = Vec::with_capacity(results.len());
        let mut failed = 0;
        for (input, result) in self.inputs.iter().zip(results) {
            match result {
                Ok(fields) => documents.push(DocumentFields { input, fields }),
                Err(err) => {
                    error!("{}: {err:#}", input.display());
                    failed += 1;
                }
            }
        }

        if self.stream {
            print_line(&Completed { completed: true })?;
        } else {
            let json = serde_json::to_string_pretty(&documents).context("Failed to serialize fields")?;
            println!("{json}");
        }

        let total: usize = documents.iter().map(|doc| doc.fields.len()).sum();
        info!(
            files = self.inputs.len(),
            fields = total,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Detection finished"
        );

        if failed > 0 {
            bail!("{failed} of {} inputs failed", self.inputs.len());
        }
        Ok(())
    }

    fn detect_file(&self, engine: &FieldEngine, input: &Path) -> Result<Vec<OutputField>> {
        let bytes = read_input(input)?;
        let options = self.engine.run_options(input);

        // a page line that cannot be written is reported once the document finishes
        let mut write_error = None;
        let fields = engine
            .detect_with(&bytes, &options, |page: &PageFields| {
                if self.stream && write_error.is_none() {
                    write_error = print_line(page).err();
                }
            })
            .with_context(|| format!("Failed to detect fields in {}", input.display()))?;

        match write_error {
            Some(err) => Err(err),
            None => Ok(fields),
        }
    }
}

/// Write `value` as a single JSON line; lines from parallel workers never interleave
fn print_line<T: Serialize>(value: &T) -> Result<()> {
    let line = serde_json::to_string(value).context("Failed to serialize page event")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}").context("Failed to write to stdout")?;
    stdout.flush().context("Failed to flush stdout")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        detect: DetectCommand,
    }

    #[test]
    fn test_parse_detect_arguments() {
        let cli = TestCli::parse_from(["docfield", "--stream", "--jobs", "2", "--page", "1", "a.pdf", "b.png"]);
        assert!(cli.detect.stream);
        assert_eq!(cli.detect.jobs, Some(2));
        assert_eq!(cli.detect.inputs, vec![PathBuf::from("a.pdf"), PathBuf::from("b.png")]);
        assert_eq!(cli.detect.engine.run_options(Path::new("a.pdf")).page, Some(1));
    }

    #[test]
    fn test_inputs_required() {
        assert!(TestCli::try_parse_from(["docfield"]).is_err());
    }

    #[test]
    fn test_completed_marker() {
        let json = serde_json::to_string(&Completed { completed: true }).unwrap();
        assert_eq!(json, r#"{"completed":true}"#);
    }
}
