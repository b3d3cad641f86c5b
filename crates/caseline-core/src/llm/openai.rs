use std::future::Future;
use std::pin::Pin;

use super::{CompletionBackend, CompletionRequest, LlmError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Completion backend speaking the OpenAI chat-completions protocol.
///
/// Works against any endpoint exposing `POST {base_url}/chat/completions`
/// with the standard request/response shape.
pub struct OpenAiBackend {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the backend at a non-default endpoint (proxies, local models).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

impl CompletionBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    fn complete<'a>(
        &'a self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        Box::pin(async move {
            let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

            let url = format!("{}/chat/completions", self.base_url);
            let body = serde_json::json!({
                "model": request.model,
                "messages": [{"role": "user", "content": request.prompt}],
                "max_tokens": request.max_tokens,
            });

            let resp = self
                .client
                .post(&url)
                .bearer_auth(api_key)
                .json(&body)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let data: serde_json::Value = resp.json().await?;
            let content = data["choices"][0]["message"]["content"]
                .as_str()
                .ok_or_else(|| {
                    LlmError::MalformedResponse(
                        "missing choices[0].message.content".to_string(),
                    )
                })?;

            Ok(content.to_string())
        })
    }
}
