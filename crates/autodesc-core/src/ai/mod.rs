// SPDX-License-Identifier: Apache-2.0

//! AI integration module.
//!
//! Sends the planned conversation to a chat completions API and tidies the
//! generated description.

pub mod client;
pub mod types;

pub use client::{Completion, CompletionBackend, CompletionClient, OpenAiBackend};
pub use types::{ChatCompletionRequest, ChatCompletionResponse, Usage};

/// Environment variable for the completion API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Removes a leading `prefix` from a generated description and capitalizes
/// what remains.
///
/// Surrounding whitespace is trimmed first. Text not starting with `prefix`
/// is returned trimmed but otherwise untouched.
#[must_use]
pub fn strip_redundant_prefix(text: &str, prefix: &str) -> String {
    let text = text.trim();
    if prefix.is_empty() {
        return text.to_string();
    }
    match text.strip_prefix(prefix) {
        Some(rest) => capitalize_first(rest.trim_start()),
        None => text.to_string(),
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
