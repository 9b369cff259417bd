//! Completion API access: the summarization client and its HTTP backend.
//!
//! [`SummarizationClient`] turns "summarize this chunk" and "label this
//! text" into [`CompletionRequest`]s. Sending them is delegated to a
//! [`CompletionBackend`] so the reducer can be driven by an in-memory fake
//! in tests. [`OpenAiCompletions`] is the production backend: one
//! `POST /completions` per request, no retry, errors mapped onto
//! [`SummaryError`].

use crate::error::SummaryError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Prompt suffix appended to every chunk during reduction.
pub const SUMMARY_PROMPT: &str = "\n\nIn summary:";

/// Prompt suffix for the one-word label request.
pub const LABEL_PROMPT: &str = "\n\nTo summarise in one word:";

const LABEL_MAX_TOKENS: usize = 3;
const LABEL_TEMPERATURE: f32 = 0.75;

/// Sampling knobs that are fixed per call site rather than per call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingOptions {
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl SamplingOptions {
    /// Used for chunk summaries.
    pub const fn summary() -> Self {
        Self {
            top_p: 1.0,
            frequency_penalty: 0.8,
            presence_penalty: 0.5,
        }
    }

    /// Used for the one-word label: heavy penalties push the model off
    /// repeating words from the input.
    pub const fn label() -> Self {
        Self {
            top_p: 1.0,
            frequency_penalty: 0.95,
            presence_penalty: 1.98,
        }
    }
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self::summary()
    }
}

/// Body of a completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Engine identifier (sent as `model`).
    #[serde(rename = "model")]
    pub engine: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    text: String,
}

/// Sends a completion request and returns the first completion's text.
pub trait CompletionBackend {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, SummaryError>> + Send;
}

/// Builds completion requests for summaries and labels.
#[derive(Debug, Clone)]
pub struct SummarizationClient<B> {
    backend: B,
    summary_sampling: SamplingOptions,
    label_sampling: SamplingOptions,
}

impl<B: CompletionBackend> SummarizationClient<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            summary_sampling: SamplingOptions::summary(),
            label_sampling: SamplingOptions::label(),
        }
    }

    pub fn with_summary_sampling(mut self, sampling: SamplingOptions) -> Self {
        self.summary_sampling = sampling;
        self
    }

    pub fn with_label_sampling(mut self, sampling: SamplingOptions) -> Self {
        self.label_sampling = sampling;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Summarize `input` in at most `max_tokens` tokens.
    pub async fn summarize(
        &self,
        input: &str,
        engine: &str,
        prompt_suffix: &str,
        max_tokens: usize,
        temperature: f32,
    ) -> Result<String, SummaryError> {
        let request = build_request(
            input,
            engine,
            prompt_suffix,
            max_tokens,
            temperature,
            self.summary_sampling,
        );
        debug!(
            "Summarizing {} bytes with {} (max_tokens = {})",
            input.len(),
            engine,
            max_tokens
        );
        self.backend.complete(&request).await
    }

    /// Ask for a one-word label describing `input`.
    pub async fn one_word_label(&self, input: &str, engine: &str) -> Result<String, SummaryError> {
        let request = build_request(
            input,
            engine,
            LABEL_PROMPT,
            LABEL_MAX_TOKENS,
            LABEL_TEMPERATURE,
            self.label_sampling,
        );
        let label = self.backend.complete(&request).await?;
        Ok(label.trim().to_string())
    }
}

fn build_request(
    input: &str,
    engine: &str,
    prompt_suffix: &str,
    max_tokens: usize,
    temperature: f32,
    sampling: SamplingOptions,
) -> CompletionRequest {
    CompletionRequest {
        engine: engine.to_string(),
        prompt: format!("{input}{prompt_suffix}"),
        temperature,
        max_tokens,
        top_p: sampling.top_p,
        frequency_penalty: sampling.frequency_penalty,
        presence_penalty: sampling.presence_penalty,
    }
}

// ── HTTP backend ─────────────────────────────────────────────────────────

/// Connection settings for [`OpenAiCompletions`].
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    /// API root, without the trailing `/completions`.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/completions", self.base_url.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// OpenAI-compatible `/completions` backend.
#[derive(Debug, Clone)]
pub struct OpenAiCompletions {
    client: reqwest::Client,
    config: ClientConfig,
}

impl OpenAiCompletions {
    pub fn new(config: ClientConfig) -> Result<Self, SummaryError> {
        if config.api_key.trim().is_empty() {
            return Err(SummaryError::AuthError {
                detail: "no API key configured".to_string(),
            });
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SummaryError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }
}

impl CompletionBackend for OpenAiCompletions {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, SummaryError> {
        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SummaryError::ApiTimeout {
                        secs: self.config.timeout_secs,
                    }
                } else {
                    SummaryError::LlmApiError {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            warn!("Completion API returned HTTP {}", status);
            return Err(status_error(status, body, retry_after_secs));
        }

        let parsed = response
            .json::<CompletionResponse>()
            .await
            .map_err(|e| SummaryError::LlmApiError {
                message: format!("Failed to parse completion response: {e}"),
            })?;

        first_choice(parsed, &request.engine)
    }
}

fn status_error(status: StatusCode, body: String, retry_after_secs: Option<u64>) -> SummaryError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SummaryError::AuthError { detail: body },
        StatusCode::TOO_MANY_REQUESTS => SummaryError::RateLimitExceeded { retry_after_secs },
        _ => SummaryError::LlmApiError {
            message: format!("HTTP {status}: {body}"),
        },
    }
}

fn first_choice(response: CompletionResponse, engine: &str) -> Result<String, SummaryError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.text)
        .ok_or_else(|| SummaryError::EmptyCompletion {
            engine: engine.to_string(),
        })
}
