// SPDX-License-Identifier: Apache-2.0

//! Chat completions client.
//!
//! [`CompletionClient`] sends a [`CompletionPlan`] through a
//! [`CompletionBackend`] and retries when the connection drops. The
//! production backend is [`OpenAiBackend`].

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::types::{ChatCompletionRequest, ChatCompletionResponse, Usage};
use crate::config::AiConfig;
use crate::error::AutodescError;
use crate::pipeline::CompletionPlan;
use crate::retry::{is_transient_anyhow, retry_backoff};

/// Sends one chat completion request.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Sends `request` once, without retrying.
    async fn send(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse>;
}

/// OpenAI-compatible chat completions endpoint.
#[derive(Debug)]
pub struct OpenAiBackend {
    /// HTTP client with configured timeout.
    http: Client,
    /// Chat completions URL.
    api_url: String,
    /// Bearer token.
    api_key: SecretString,
}

impl OpenAiBackend {
    /// Creates a backend for `config.api_url` with `config.timeout_seconds`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: SecretString, config: &AiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn send(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        let response = self
            .http
            .post(&self.api_url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(request)
            .send()
            .await
            .map_err(AutodescError::from)
            .with_context(|| format!("Failed to send request to {} API", self.name()))?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 401 {
                return Err(AutodescError::Completion {
                    message: format!(
                        "Invalid {} API key. Check your OPENAI_API_KEY environment variable.",
                        self.name()
                    ),
                    status: Some(401),
                }
                .into());
            }
            let error_body = response.text().await.unwrap_or_default();
            return Err(AutodescError::Completion {
                message: format!("HTTP {}: {}", status.as_u16(), error_body.trim()),
                status: Some(status.as_u16()),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(AutodescError::from)
            .with_context(|| format!("Failed to read {} API response", self.name()))?;

        let completion: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| AutodescError::InvalidCompletionResponse {
                message: format!("{e}"),
            })?;

        Ok(completion)
    }
}

/// A generated description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    /// Generated text, untrimmed.
    pub text: String,
    /// Model that produced it.
    pub model: String,
    /// Why generation stopped, if reported.
    pub finish_reason: Option<String>,
    /// Token usage, if reported.
    pub usage: Option<Usage>,
}

/// Completion client retrying dropped connections.
#[derive(Debug)]
pub struct CompletionClient<B> {
    backend: B,
    backoff: ExponentialBuilder,
}

impl CompletionClient<OpenAiBackend> {
    /// Client for the configured OpenAI-compatible endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(api_key: SecretString, config: &AiConfig) -> Result<Self> {
        Ok(Self::new(
            OpenAiBackend::new(api_key, config)?,
            retry_backoff(config.max_attempts),
        ))
    }
}

impl<B: CompletionBackend> CompletionClient<B> {
    /// Client over an arbitrary backend.
    #[must_use]
    pub fn new(backend: B, backoff: ExponentialBuilder) -> Self {
        Self { backend, backoff }
    }

    /// Requests a completion for `plan`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for a reason other than a
    /// dropped connection, attempts run out, or the response carries no text.
    #[instrument(skip_all, fields(backend = self.backend.name(), model = %plan.model))]
    pub async fn complete(&self, plan: &CompletionPlan) -> Result<Completion> {
        let request = ChatCompletionRequest::from(plan);

        let response = (|| async { self.backend.send(&request).await })
            .retry(self.backoff)
            .when(is_transient_anyhow)
            .notify(|err, dur| warn!(error = %err, delay = ?dur, "Connection dropped, retrying"))
            .await?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            AutodescError::InvalidCompletionResponse {
                message: "no choices in response".to_string(),
            }
        })?;

        let text = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AutodescError::InvalidCompletionResponse {
                message: "empty message content".to_string(),
            })?;

        if choice.finish_reason.as_deref() == Some("length") {
            warn!(
                response_tokens = plan.response_tokens,
                "Completion hit the response token limit"
            );
        }
        debug!(
            response_length = text.len(),
            usage = ?response.usage,
            "Received completion"
        );

        Ok(Completion {
            text,
            model: plan.model.clone(),
            finish_reason: choice.finish_reason,
            usage: response.usage,
        })
    }
}
