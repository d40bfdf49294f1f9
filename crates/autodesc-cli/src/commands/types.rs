// SPDX-License-Identifier: Apache-2.0

//! Result types returned by command handlers.
//!
//! These types allow command handlers to return data instead of printing
//! directly, improving testability and separation of concerns.

use autodesc_core::DescribeOutcome;
use serde::Serialize;

/// Result from the describe command.
#[derive(Debug, Clone, Serialize)]
pub struct DescribeResult {
    /// Repository in owner/repo format.
    pub repo: String,
    /// Pull request number.
    pub number: u64,
    /// What happened.
    #[serde(flatten)]
    pub outcome: DescribeOutcome,
    /// Whether the description was already shown during confirmation.
    #[serde(skip)]
    pub previewed: bool,
}

/// Result from the models command.
#[derive(Debug, Clone, Serialize)]
pub struct ModelsResult {
    /// Models ordered by context window, then identifier.
    pub models: Vec<ModelEntry>,
    /// Tokens always reserved for the response.
    pub max_response_tokens: u32,
}

/// One catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct ModelEntry {
    /// Model identifier.
    pub id: String,
    /// Context window in tokens.
    pub context_window: u32,
    /// Largest prompt the model accepts once the response is reserved.
    pub max_prompt_tokens: Option<u32>,
}
