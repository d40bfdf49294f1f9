// SPDX-License-Identifier: Apache-2.0

//! Describe command handler.

use anyhow::{Context, Result};
use autodesc_core::{
    AppConfig, DescribeOutcome, DescribeRequest, ModelCatalog, describe_pull_request,
    parse_owner_repo,
};
use console::style;
use dialoguer::Confirm;
use tracing::{debug, warn};

use super::maybe_spinner;
use super::types::DescribeResult;
use crate::cli::{DescribeArgs, OutputContext};
use crate::provider::CliTokenProvider;

/// Applies `describe` flags on top of the loaded configuration.
pub fn apply_overrides(config: &mut AppConfig, args: &DescribeArgs) -> Result<()> {
    if let Some(url) = &args.github_api_url {
        config.github.api_url.clone_from(url);
        debug!("Overriding GitHub API URL to: {url}");
    }
    if let Some(users) = &args.allowed_users {
        config.github.allowed_users = non_empty_items(users);
    }
    if let Some(types) = &args.file_types {
        config.prompt.file_types = non_empty_items(types);
    }
    if let Some(json) = &args.models {
        let catalog = ModelCatalog::from_json(json).context("Invalid --models value")?;
        config.ai.models = catalog
            .iter()
            .map(|(id, window)| (id.to_string(), window))
            .collect();
    }
    if let Some(tokens) = args.max_response_tokens {
        config.ai.max_response_tokens = tokens;
    }
    if let Some(temperature) = args.temperature {
        config.ai.temperature = temperature;
    }
    Ok(())
}

fn non_empty_items(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Runs the pipeline for one pull request.
///
/// At a terminal the generated description is shown and publishing waits
/// for confirmation unless `--yes` is given or `ui.confirm_before_publish`
/// is off. Without a terminal there is nobody to ask, so it is published.
pub async fn run(
    args: DescribeArgs,
    ctx: &OutputContext,
    config: &AppConfig,
) -> Result<DescribeResult> {
    let (owner, repo) = parse_owner_repo(&args.repo)?;
    let provider = CliTokenProvider::new(args.github_token, args.openai_api_key);
    let request = DescribeRequest::builder()
        .owner(owner)
        .repo(repo)
        .number(args.pr)
        .dry_run(args.dry_run)
        .build();

    let ask = !args.yes && config.ui.confirm_before_publish && ctx.is_interactive();
    let mut previewed = false;

    let spinner = maybe_spinner(ctx, "Generating description...");
    let outcome = describe_pull_request(&provider, config, &request, |description| {
        if let Some(s) = &spinner {
            s.finish_and_clear();
        }
        if !ask {
            return true;
        }
        previewed = true;
        println!();
        println!("{}", style("Generated description:").bold());
        println!();
        println!("{description}");
        println!();
        Confirm::new()
            .with_prompt("Replace the pull request description with this text?")
            .default(false)
            .interact()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to get user confirmation");
                false
            })
    })
    .await
    .with_context(|| format!("Failed to describe {}#{}", args.repo, args.pr))?;
    if let Some(s) = spinner {
        s.finish_and_clear();
    }

    if let DescribeOutcome::Generated(generated) = &outcome
        && !generated.published
    {
        debug!("Description generated but not published");
    }

    Ok(DescribeResult {
        repo: args.repo,
        number: args.pr,
        outcome,
        previewed,
    })
}
