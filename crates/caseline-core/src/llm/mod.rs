//! LLM completion boundary: a backend trait, the OpenAI-compatible HTTP
//! implementation, and a scripted mock for tests.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

pub mod mock;
pub mod openai;

pub use mock::{MockCompletion, MockResponse};
pub use openai::OpenAiBackend;

/// A single completion request: one prompt, one capped response.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
}

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
    #[error("malformed API response: {0}")]
    MalformedResponse(String),
    #[error("no API key configured")]
    MissingApiKey,
}

/// Trait for completion backends.
///
/// The request/response shape is deliberately minimal: a prompt in, free
/// text out. Callers must treat the output as opaque markdown-flavored
/// prose with no machine-parseable structure.
pub trait CompletionBackend: Send + Sync {
    fn name(&self) -> &str;

    fn complete<'a>(
        &'a self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>>;
}
