// SPDX-License-Identifier: Apache-2.0

//! Cheapest-fit model selection.
//!
//! Among the models whose context window can hold the prompt plus the
//! response reservation, the one with the smallest window wins. Ties on the
//! window size go to the lexically smallest model identifier so the choice
//! never depends on map order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::tokens::{TokenEstimator, Tokenizer};
use crate::error::AutodescError;
use crate::prompt::Conversation;

/// Model identifier to context window size (tokens).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ModelCatalog(BTreeMap<String, u32>);

impl ModelCatalog {
    /// Builds a catalog, rejecting empty identifiers and zero-sized windows.
    pub fn new(models: BTreeMap<String, u32>) -> Result<Self, AutodescError> {
        if let Some((model, _)) = models.iter().find(|(m, w)| m.trim().is_empty() || **w == 0) {
            return Err(AutodescError::Config {
                message: format!(
                    "invalid model catalog entry '{model}': identifier must be non-empty and context window positive"
                ),
            });
        }
        Ok(Self(models))
    }

    /// Parses a JSON object such as `{"gpt-4": 8192}`.
    pub fn from_json(json: &str) -> Result<Self, AutodescError> {
        let models: BTreeMap<String, u32> =
            serde_json::from_str(json).map_err(|e| AutodescError::Config {
                message: format!("invalid model catalog JSON: {e}"),
            })?;
        Self::new(models)
    }

    /// Context window of `model`, if listed.
    #[must_use]
    pub fn context_window(&self, model: &str) -> Option<u32> {
        self.0.get(model).copied()
    }

    /// Models in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(m, w)| (m.as_str(), *w))
    }

    /// Number of models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the catalog lists no models.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Picks the smallest-window model that holds `prompt_tokens` plus
    /// `max_response_tokens`.
    #[must_use]
    pub fn select(&self, prompt_tokens: u32, max_response_tokens: u32) -> Option<Selection> {
        self.iter()
            .filter_map(|(model, context_window)| {
                let max_prompt_tokens = context_window.checked_sub(max_response_tokens)?;
                if prompt_tokens > max_prompt_tokens {
                    return None;
                }
                debug!(
                    model,
                    context_window, prompt_tokens, max_response_tokens, "Model can hold prompt"
                );
                Some(Selection {
                    model: model.to_string(),
                    context_window,
                    prompt_tokens,
                })
            })
            .min_by(|a, b| {
                a.context_window
                    .cmp(&b.context_window)
                    .then_with(|| a.model.cmp(&b.model))
            })
    }
}

/// The model chosen for a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Model identifier.
    pub model: String,
    /// Context window of the model.
    pub context_window: u32,
    /// Estimated prompt size.
    pub prompt_tokens: u32,
}

/// Estimates `conversation` once and selects a model for it.
///
/// The tokenizer is the same for every catalog entry, so the estimate is not
/// recomputed per model.
#[must_use]
pub fn select_model<T: Tokenizer>(
    catalog: &ModelCatalog,
    estimator: &TokenEstimator<T>,
    conversation: &Conversation,
    max_response_tokens: u32,
) -> Option<Selection> {
    let prompt_tokens = estimator.estimate(conversation);
    catalog.select(prompt_tokens, max_response_tokens)
}
