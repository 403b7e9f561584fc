//! OpenAI-compatible chat completions client

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};
use url::Url;

use super::streaming::sse_chunks;
use super::types::{CompletionRequest, CompletionResponse};
use super::{ChunkStream, CompletionProvider, chat_completions_url};
use crate::config::LlmConfig;
use crate::error::{Result, ScoutError};

/// Client for `/chat/completions` on any OpenAI-compatible API
///
/// No request timeout is set: long generations and streams run to
/// completion.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let endpoint = chat_completions_url(&config.api_url)?;
        let client = Client::builder()
            .build()
            .map_err(|e| ScoutError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }

    async fn send(&self, request: &CompletionRequest) -> Result<reqwest::Response> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            stream = request.stream,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ScoutError::Provider(format!("Failed to connect to provider: {e}"))
                } else {
                    ScoutError::Provider(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = status.as_u16(), "Chat completion request rejected");
            return Err(ScoutError::Provider(format!("API returned {status}: {body}")));
        }

        Ok(response)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let response = self.send(request).await?;

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::Provider(format!("Failed to parse response: {e}")))?;

        completion
            .into_text()
            .ok_or_else(|| ScoutError::Provider("Empty response from API".to_string()))
    }

    async fn complete_streaming(&self, request: &CompletionRequest) -> Result<ChunkStream> {
        let response = self.send(request).await?;
        Ok(sse_chunks(response.bytes_stream()))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
