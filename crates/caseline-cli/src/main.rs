use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;

use caseline_core::llm::OpenAiBackend;
use caseline_core::narrative::NARRATIVE_FAILED_SENTINEL;
use caseline_core::pipeline::{PipelineError, ProcessedOutput, RawDocument, process_project};
use caseline_core::timeline::{decode_outline, format_timeline};
use caseline_pdf::LopdfBackend;

/// Caseline - turn a case outline and supporting PDFs into a timeline and narrative
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process an outline and supporting PDFs from the local filesystem
    Process {
        /// Path to the outline text file (one event per line)
        #[arg(long)]
        outline: PathBuf,

        /// Supporting PDF file (repeatable)
        #[arg(long = "pdf")]
        pdfs: Vec<PathBuf>,

        /// Directory to write timeline.md and narrative.md into
        /// (prints to stdout when omitted)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Model identifier
        #[arg(long)]
        model: Option<String>,

        /// API key (falls back to OPENAI_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Completion endpoint base URL
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Process {
            outline,
            pdfs,
            output_dir,
            model,
            api_key,
            base_url,
        } => run_process(outline, pdfs, output_dir, model, api_key, base_url).await,
    }
}

async fn run_process(
    outline: PathBuf,
    pdfs: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    model: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
) -> anyhow::Result<()> {
    let config = caseline_core::load_config();
    let mut llm_cfg = config.llm_config();
    if let Some(model) = model {
        llm_cfg.model = model;
    }

    let key = api_key.or_else(|| config.api_key());
    let mut backend = OpenAiBackend::new(key);
    let base_url = base_url.or_else(|| config.llm.as_ref().and_then(|l| l.base_url.clone()));
    if let Some(url) = base_url {
        backend = backend.with_base_url(url);
    }

    let outline_bytes = std::fs::read(&outline)
        .with_context(|| format!("failed to read outline {}", outline.display()))?;

    let mut documents = Vec::new();
    for path in &pdfs {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read PDF {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        documents.push(RawDocument { filename, data });
    }

    eprintln!(
        "{} {} supporting document(s)",
        "Processing".green().bold(),
        documents.len()
    );

    let result =
        process_project(&backend, &LopdfBackend::new(), &llm_cfg, &outline_bytes, &documents).await;
    let output = resolve_output(result, &outline_bytes)?;

    for filename in &output.document_failures {
        eprintln!("{} summarization failed for {}", "warning:".yellow().bold(), filename);
    }

    match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            std::fs::write(dir.join("timeline.md"), &output.timeline)?;
            std::fs::write(dir.join("narrative.md"), &output.narrative)?;
            eprintln!(
                "{} timeline.md and narrative.md written to {}",
                "Done.".green().bold(),
                dir.display()
            );
        }
        None => {
            println!("{}", output.timeline);
            println!("{}", output.narrative);
        }
    }

    Ok(())
}

/// A failed final narrative call still yields the run's timeline plus the
/// placeholder narrative instead of aborting, matching the web handler.
/// Only a structurally invalid outline is fatal.
fn resolve_output(
    result: Result<ProcessedOutput, PipelineError>,
    outline_bytes: &[u8],
) -> anyhow::Result<ProcessedOutput> {
    match result {
        Ok(output) => Ok(output),
        Err(PipelineError::Outline(e)) => Err(e.into()),
        Err(PipelineError::Narrative(e)) => {
            eprintln!(
                "{} narrative generation failed: {e}",
                "warning:".yellow().bold()
            );
            let timeline = decode_outline(outline_bytes).map(format_timeline)?;
            Ok(ProcessedOutput {
                timeline,
                narrative: NARRATIVE_FAILED_SENTINEL.to_string(),
                document_failures: Vec::new(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caseline_core::llm::LlmError;

    #[test]
    fn narrative_failure_degrades_to_placeholder_output() {
        let err = PipelineError::Narrative(LlmError::Api {
            status: 500,
            message: "outage".into(),
        });
        let output = resolve_output(Err(err), b"Filed complaint\nServed defendant").unwrap();

        assert_eq!(output.narrative, NARRATIVE_FAILED_SENTINEL);
        assert!(output.timeline.contains("- Filed complaint"));
        assert!(output.timeline.contains("- Served defendant"));
        assert!(output.document_failures.is_empty());
    }

    #[test]
    fn invalid_outline_is_fatal() {
        let err = PipelineError::Narrative(LlmError::Api {
            status: 500,
            message: "outage".into(),
        });
        assert!(resolve_output(Err(err), &[0xff, 0xfe]).is_err());
    }

    #[test]
    fn successful_run_passes_through() {
        let output = ProcessedOutput {
            timeline: "# Timeline of Events\n\n- x\n".to_string(),
            narrative: "## Background\n...".to_string(),
            document_failures: Vec::new(),
        };
        let resolved = resolve_output(Ok(output), b"x").unwrap();
        assert_eq!(resolved.narrative, "## Background\n...");
    }
}
