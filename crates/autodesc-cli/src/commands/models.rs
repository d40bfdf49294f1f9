// SPDX-License-Identifier: Apache-2.0

//! Models command handler for listing the configured model catalog.

use anyhow::{Context, Result};
use autodesc_core::{AppConfig, ModelCatalog};

use super::types::{ModelEntry, ModelsResult};
use crate::cli::ModelsArgs;

/// Lists the catalog in the order the selector prefers models.
pub fn run(args: &ModelsArgs, config: &AppConfig) -> Result<ModelsResult> {
    let catalog = match &args.models {
        Some(json) => ModelCatalog::from_json(json).context("Invalid --models value")?,
        None => config.ai.catalog()?,
    };
    let reservation = config.ai.max_response_tokens;

    let mut models: Vec<ModelEntry> = catalog
        .iter()
        .map(|(id, context_window)| ModelEntry {
            id: id.to_string(),
            context_window,
            max_prompt_tokens: context_window.checked_sub(reservation),
        })
        .collect();
    models.sort_by(|a, b| {
        a.context_window
            .cmp(&b.context_window)
            .then_with(|| a.id.cmp(&b.id))
    });

    Ok(ModelsResult {
        models,
        max_response_tokens: reservation,
    })
}
