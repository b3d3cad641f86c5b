//! One end-to-end processing run for a project: outline bytes and raw PDF
//! bytes in, timeline and narrative out.

use thiserror::Error;

use crate::config_file::LlmConfig;
use crate::llm::{CompletionBackend, LlmError};
use crate::narrative::generate_narrative;
use crate::timeline::{OutlineError, decode_outline, format_timeline};
use crate::{DocumentText, PdfTextBackend};

/// A raw uploaded supporting document.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub filename: String,
    pub data: Vec<u8>,
}

/// The two derived artifacts of a processing run, always regenerated
/// together from scratch.
#[derive(Debug)]
pub struct ProcessedOutput {
    pub timeline: String,
    pub narrative: String,
    /// Filenames whose summarization failed; the narrative was generated
    /// with a degraded placeholder for these.
    pub document_failures: Vec<String>,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Outline(#[from] OutlineError),
    /// The final narrative call failed. Callers map this to the
    /// user-visible placeholder; it is never raised past the handler.
    #[error(transparent)]
    Narrative(#[from] LlmError),
}

/// Extract text from PDF bytes, flattening a whole-document parse failure
/// to an empty string.
///
/// Best-effort by policy: a corrupt or unreadable PDF degrades to `""` and
/// is logged, so one bad attachment never fails a processing run. Per-page
/// failures are already handled inside the backend.
pub fn extract_text_best_effort(backend: &dyn PdfTextBackend, data: &[u8]) -> String {
    match backend.extract_text(data) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "PDF could not be read, treating as empty");
            String::new()
        }
    }
}

/// Run the full pipeline: decode and format the outline, extract each
/// supporting document's text, then generate the narrative.
///
/// Work is sequential: one extraction pass, then one summarization call
/// per readable document, then one final narrative call.
pub async fn process_project(
    llm: &dyn CompletionBackend,
    pdf: &dyn PdfTextBackend,
    cfg: &LlmConfig,
    outline: &[u8],
    documents: &[RawDocument],
) -> Result<ProcessedOutput, PipelineError> {
    let outline_text = decode_outline(outline)?;
    let timeline = format_timeline(outline_text);

    let texts: Vec<DocumentText> = documents
        .iter()
        .map(|doc| DocumentText {
            filename: doc.filename.clone(),
            text: extract_text_best_effort(pdf, &doc.data),
        })
        .collect();

    let run = generate_narrative(llm, cfg, &timeline, &texts).await?;

    Ok(ProcessedOutput {
        timeline,
        narrative: run.narrative,
        document_failures: run.failures,
    })
}
