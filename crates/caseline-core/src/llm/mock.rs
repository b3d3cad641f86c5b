//! Mock completion backend for testing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{CompletionBackend, CompletionRequest, LlmError};

/// A configurable mock response for [`MockCompletion`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Simulate a successful completion.
    Text(String),
    /// Simulate an API-level failure (HTTP 500).
    Error(String),
}

/// A hand-rolled mock implementing [`CompletionBackend`] for tests.
///
/// Supports a fixed response (used for every call) or a sequence of
/// responses (one per call, repeating the last when exhausted), plus call
/// counting via [`call_count()`](MockCompletion::call_count) and capture of
/// the prompts it was asked to complete.
pub struct MockCompletion {
    /// If non-empty, each call pops the next response.
    responses: Mutex<Vec<MockResponse>>,
    /// Fallback when the sequence is exhausted (or single-response mode).
    fallback: MockResponse,
    call_count: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockCompletion {
    /// Create a mock that always returns `response`.
    pub fn new(response: MockResponse) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fallback: response,
            call_count: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that returns responses in order, repeating the last one.
    pub fn with_sequence(mut responses: Vec<MockResponse>) -> Self {
        assert!(
            !responses.is_empty(),
            "sequence must have at least one response"
        );
        let fallback = responses.last().cloned().unwrap();
        // Reverse so we can pop() from the back cheaply.
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            fallback,
            call_count: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Number of remote calls issued so far.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl CompletionBackend for MockCompletion {
    fn name(&self) -> &str {
        "mock"
    }

    fn complete<'a>(
        &'a self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        Box::pin(async move {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(request.prompt);

            let next = {
                let mut responses = self.responses.lock().unwrap();
                responses.pop().unwrap_or_else(|| self.fallback.clone())
            };

            match next {
                MockResponse::Text(text) => Ok(text),
                MockResponse::Error(message) => Err(LlmError::Api {
                    status: 500,
                    message,
                }),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> CompletionRequest {
        CompletionRequest {
            model: "test-model".to_string(),
            prompt: prompt.to_string(),
            max_tokens: 64,
        }
    }

    #[tokio::test]
    async fn fixed_response_and_counting() {
        let mock = MockCompletion::new(MockResponse::Text("ok".into()));
        assert_eq!(mock.call_count(), 0);
        assert_eq!(mock.complete(request("a")).await.unwrap(), "ok");
        assert_eq!(mock.complete(request("b")).await.unwrap(), "ok");
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.prompts(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn sequence_repeats_last() {
        let mock = MockCompletion::with_sequence(vec![
            MockResponse::Text("first".into()),
            MockResponse::Error("boom".into()),
        ]);
        assert_eq!(mock.complete(request("x")).await.unwrap(), "first");
        assert!(mock.complete(request("x")).await.is_err());
        assert!(mock.complete(request("x")).await.is_err());
    }
}
