use thiserror::Error;

pub mod config_file;
pub mod llm;
pub mod narrative;
pub mod pipeline;
pub mod summarize;
pub mod timeline;

// Re-export for convenience
pub use config_file::{ConfigFile, LlmConfig, load_config};
pub use llm::{CompletionBackend, CompletionRequest, LlmError};
pub use narrative::{DocumentSummary, NarrativeRun, generate_narrative};
pub use pipeline::{ProcessedOutput, extract_text_best_effort, process_project};
pub use summarize::{SummaryOutcome, summarize_document};
pub use timeline::{decode_outline, format_timeline};

/// Extracted text of one supporting document, paired with the filename it
/// came from so degraded documents can be reported by name.
#[derive(Debug, Clone)]
pub struct DocumentText {
    pub filename: String,
    pub text: String,
}

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
}

/// Trait for PDF text extraction backends.
///
/// Implementors provide the low-level text extraction step; the processing
/// pipeline (outline formatting, summarization, narrative generation) lives
/// in this crate and treats the backend as opaque.
pub trait PdfTextBackend: Send + Sync {
    /// Extract the full text content of a PDF from its raw bytes.
    ///
    /// Per-page failures should be skipped by the implementation; a returned
    /// error means the document as a whole could not be read.
    fn extract_text(&self, data: &[u8]) -> Result<String, PdfError>;
}
