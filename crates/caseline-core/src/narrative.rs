//! Narrative generation: summarize each supporting document, combine with
//! the timeline, and issue the final synthesis call.

use crate::DocumentText;
use crate::config_file::LlmConfig;
use crate::llm::{CompletionBackend, CompletionRequest, LlmError};
use crate::summarize::{SummaryOutcome, summarize_document};

/// User-visible placeholder callers substitute when the final narrative
/// call fails. Kept here so web and CLI agree on the wording.
pub const NARRATIVE_FAILED_SENTINEL: &str = "Error generating narrative";

/// One document's contribution to the combined prompt.
#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub filename: String,
    pub text: String,
}

/// Result of one narrative generation run.
#[derive(Debug)]
pub struct NarrativeRun {
    pub narrative: String,
    /// Per-document summaries in input order, empty documents excluded.
    pub summaries: Vec<DocumentSummary>,
    /// Filenames whose summarization call failed; their slot in the
    /// combined prompt carries the error sentinel instead of a summary.
    pub failures: Vec<String>,
}

/// Build the combined document handed to the final narrative call: the
/// timeline, then a labeled 1-indexed list of per-document summaries.
pub fn build_combined_content(timeline: &str, summaries: &[DocumentSummary]) -> String {
    let mut combined = format!("Timeline:\n{timeline}\n\nSupporting Documents:\n");
    for (i, summary) in summaries.iter().enumerate() {
        combined.push_str(&format!("\nDocument {}:\n{}\n", i + 1, summary.text));
    }
    combined
}

fn narrative_prompt(combined: &str) -> String {
    format!(
        "Generate a coherent legal brief narrative based on the following \
         timeline and supporting documents. Format the output in markdown:\n\
         - Use '##' for main sections (Background, Analysis, Conclusion)\n\
         - Use '###' for subsections\n\
         - Use bullet points for key events\n\
         - Use bold text for dates and important terms\n\
         - Use italics for case citations or party names\n\
         - Use blockquotes for direct quotes from documents\n\n\
         Content to process:\n{combined}\n\n\
         Write a clear and professional narrative that incorporates all \
         relevant information chronologically."
    )
}

/// Generate a narrative from a timeline and extracted document texts.
///
/// Documents whose text is empty or whitespace-only are skipped outright:
/// no summary entry and no placeholder, so unreadable attachments add no
/// noise to the prompt. A failed summarization degrades to a sentinel
/// entry and is recorded in [`NarrativeRun::failures`]; it never aborts
/// the run. Only a failure of the final synthesis call is returned as an
/// error, for the caller to convert to [`NARRATIVE_FAILED_SENTINEL`].
///
/// When no document yields readable text the run proceeds with an empty
/// summaries section rather than rejecting.
pub async fn generate_narrative(
    backend: &dyn CompletionBackend,
    cfg: &LlmConfig,
    timeline: &str,
    documents: &[DocumentText],
) -> Result<NarrativeRun, LlmError> {
    let mut summaries = Vec::new();
    let mut failures = Vec::new();

    for doc in documents {
        if doc.text.trim().is_empty() {
            tracing::debug!(filename = %doc.filename, "skipping document with no extracted text");
            continue;
        }

        let outcome = summarize_document(backend, cfg, &doc.text).await;
        if matches!(outcome, SummaryOutcome::Failed(_)) {
            failures.push(doc.filename.clone());
        }
        summaries.push(DocumentSummary {
            filename: doc.filename.clone(),
            text: outcome.display_text().to_string(),
        });
    }

    let combined = build_combined_content(timeline, &summaries);
    let request = CompletionRequest {
        model: cfg.model.clone(),
        prompt: narrative_prompt(&combined),
        max_tokens: cfg.narrative_max_tokens,
    };

    let narrative = backend.complete(request).await.map_err(|e| {
        tracing::error!(backend = backend.name(), error = %e, "narrative call failed");
        e
    })?;

    Ok(NarrativeRun {
        narrative,
        summaries,
        failures,
    })
}
