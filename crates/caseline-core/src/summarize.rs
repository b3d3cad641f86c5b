//! Per-document summarization.

use crate::config_file::LlmConfig;
use crate::llm::{CompletionBackend, CompletionRequest, LlmError};

/// User-visible text for a document that yielded no extractable text.
pub const UNREADABLE_SENTINEL: &str = "No readable text content found in document.";

/// User-visible text substituted when a document's summarization call fails.
pub const SUMMARY_FAILED_SENTINEL: &str = "Error in summarization";

/// Outcome of summarizing one document.
///
/// A remote failure is carried as data rather than swallowed into a
/// sentinel string at the call site, so the orchestration layer decides
/// whether to degrade or abort.
#[derive(Debug)]
pub enum SummaryOutcome {
    Summarized(String),
    /// Input was empty or whitespace-only; no remote call was made.
    Unreadable,
    Failed(LlmError),
}

impl SummaryOutcome {
    /// Text to place in the combined narrative prompt for this document.
    pub fn display_text(&self) -> &str {
        match self {
            SummaryOutcome::Summarized(text) => text,
            SummaryOutcome::Unreadable => UNREADABLE_SENTINEL,
            SummaryOutcome::Failed(_) => SUMMARY_FAILED_SENTINEL,
        }
    }
}

fn summary_prompt(text: &str) -> String {
    format!(
        "Summarize the following text, extracting key events and dates. \
         Format the output in markdown:\n\
         - Use '##' for main sections\n\
         - Use bullet points for events\n\
         - Use bold text for dates\n\
         - Use italics for important names or terms\n\n\
         Text to summarize:\n{text}"
    )
}

/// Summarize one document's extracted text.
///
/// Empty or whitespace-only input short-circuits to
/// [`SummaryOutcome::Unreadable`] without issuing a remote call, so an
/// unreadable attachment never costs an API round-trip.
pub async fn summarize_document(
    backend: &dyn CompletionBackend,
    cfg: &LlmConfig,
    text: &str,
) -> SummaryOutcome {
    if text.trim().is_empty() {
        return SummaryOutcome::Unreadable;
    }

    let request = CompletionRequest {
        model: cfg.model.clone(),
        prompt: summary_prompt(text),
        max_tokens: cfg.summary_max_tokens,
    };

    match backend.complete(request).await {
        Ok(summary) => SummaryOutcome::Summarized(summary),
        Err(e) => {
            tracing::warn!(backend = backend.name(), error = %e, "summarization call failed");
            SummaryOutcome::Failed(e)
        }
    }
}
