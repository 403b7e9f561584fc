//! Perplexity search provider
//!
//! Calls the Perplexity chat completions API with a fixed research prompt
//! and formats the answer and its sources as markdown.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::chat::ChatMessage;
use crate::config::SearchConfig;
use crate::error::{Result, ScoutError};
use crate::llm::chat_completions_url;

use super::prompts::{SEARCH_SYSTEM_PROMPT, search_user_prompt};
use super::{SearchAugmenter, SearchResult};

/// Heading that prefixes every successful search answer
const RESULTS_HEADING: &str = "# Perplexity Sonar Pro Search Results";

/// Maximum characters of an error body quoted back in the result
const ERROR_SNIPPET_CHARS: usize = 500;

/// Search augmenter backed by the Perplexity API
#[derive(Debug)]
pub struct PerplexitySearch {
    client: Client,
    config: SearchConfig,
    endpoint: Url,
    api_key: Option<String>,
}

/// Perplexity chat completion request
#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    presence_penalty: f32,
}

/// Perplexity chat completion response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    sources: Option<Vec<SearchSource>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// A source entry attached to a search answer
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchSource {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Error)]
enum SearchFailure {
    #[error("Perplexity API error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Transport(String),
}

impl PerplexitySearch {
    /// Create a new search client
    ///
    /// A missing `api_key` is not an error here: searches will return the
    /// "not configured" error string instead.
    pub fn new(config: &SearchConfig, api_key: Option<String>) -> Result<Self> {
        let endpoint = chat_completions_url(&config.api_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScoutError::Config(format!("Failed to create HTTP client: {e}")))?;

        if api_key.is_none() {
            warn!(
                "{} not set; web search requests will return an error message",
                config.api_key_env
            );
        }

        info!(
            "PerplexitySearch initialized with model: {}, endpoint: {}",
            config.model, endpoint
        );

        Ok(Self {
            client,
            config: config.clone(),
            endpoint,
            api_key,
        })
    }

    async fn call_api(&self, api_key: &str, query: &str) -> std::result::Result<String, SearchFailure> {
        let request = SearchRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage::system(SEARCH_SYSTEM_PROMPT),
                ChatMessage::user(search_user_prompt(query)),
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            presence_penalty: self.config.presence_penalty,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchFailure::Transport(format!(
                        "request timed out after {}s: {e}",
                        self.config.timeout_secs
                    ))
                } else {
                    SearchFailure::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SearchFailure::Status {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchFailure::Transport(format!("failed to parse response: {e}")))?;

        let answer = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| SearchFailure::Transport("response contained no answer".to_string()))?;

        Ok(format_search_answer(&answer, parsed.sources.as_deref()))
    }
}

#[async_trait]
impl SearchAugmenter for PerplexitySearch {
    async fn augment(&self, query: &str) -> SearchResult {
        let Some(api_key) = self.api_key.as_deref() else {
            return format!(
                "Error: Perplexity API key not configured. Set {} in the environment.",
                self.config.api_key_env
            );
        };

        info!("Querying Perplexity API for: {query}");

        match self.call_api(api_key, query).await {
            Ok(result) => {
                debug!("Perplexity search completed ({} chars)", result.len());
                result
            }
            Err(e @ SearchFailure::Status { .. }) => {
                warn!("{e}");
                format!("Error: {e}")
            }
            Err(SearchFailure::Transport(message)) => {
                warn!("Perplexity search error: {message}");
                format!("Error performing search: {message}")
            }
        }
    }

    fn name(&self) -> &'static str {
        "perplexity"
    }
}

/// Format a search answer with its heading and optional numbered source list
///
/// Sources without a title are labelled "Source"; sources without a URL
/// link to `#`.
pub fn format_search_answer(answer: &str, sources: Option<&[SearchSource]>) -> String {
    let mut formatted = format!("{RESULTS_HEADING}\n\n{answer}");

    if let Some(sources) = sources {
        formatted.push_str("\n\n## Sources\n");
        for (i, source) in sources.iter().enumerate() {
            formatted.push_str(&format!(
                "{}. [{}]({})\n",
                i + 1,
                source.title.as_deref().unwrap_or("Source"),
                source.url.as_deref().unwrap_or("#")
            ));
        }
    }

    formatted
}

fn snippet(body: &str) -> String {
    if body.chars().count() <= ERROR_SNIPPET_CHARS {
        return body.to_string();
    }
    let truncated: String = body.chars().take(ERROR_SNIPPET_CHARS).collect();
    format!("{truncated}...")
}
