// SPDX-License-Identifier: Apache-2.0

//! Chat completions request/response types.

use serde::{Deserialize, Serialize};

use crate::pipeline::CompletionPlan;
use crate::prompt::Message;

/// Request body for the chat completions API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier (e.g., "gpt-3.5-turbo").
    pub model: String,
    /// List of messages in the conversation.
    pub messages: Vec<Message>,
    /// Maximum tokens in response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Temperature for response randomness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl From<&CompletionPlan> for ChatCompletionRequest {
    fn from(plan: &CompletionPlan) -> Self {
        Self {
            model: plan.model.clone(),
            messages: plan.conversation.messages().to_vec(),
            max_tokens: Some(plan.response_tokens),
            temperature: Some(plan.temperature),
        }
    }
}

/// Response from the chat completions API.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    /// List of choices (usually just one).
    pub choices: Vec<Choice>,
    /// Token usage reported by the API.
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// A single choice in the chat completion response.
#[derive(Debug, Deserialize)]
pub struct Choice {
    /// The generated message.
    pub message: ResponseMessage,
    /// Why generation stopped (e.g. "stop", "length").
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Message returned by the model.
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    /// Role of the author, normally "assistant".
    pub role: String,
    /// Generated text; may be null for refusals or tool calls.
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage of a completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens in the completion.
    pub completion_tokens: u32,
    /// Sum of both.
    pub total_tokens: u32,
}
