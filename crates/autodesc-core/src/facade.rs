// SPDX-License-Identifier: Apache-2.0

//! Platform-agnostic facade for describing a pull request end to end.
//!
//! Callers provide credentials through [`TokenProvider`] and a loaded
//! [`AppConfig`]; the facade fetches the pull request, plans the completion,
//! generates the description and publishes it once the caller approves.

use serde::Serialize;
use tracing::{info, instrument};

use crate::ai::{CompletionClient, OPENAI_API_KEY_ENV, Usage, strip_redundant_prefix};
use crate::auth::TokenProvider;
use crate::config::AppConfig;
use crate::error::AutodescError;
use crate::github::pulls::{ChangeSet, fetch_change_set, publish_description};
use crate::github::{GITHUB_TOKEN_ENV, create_client};
use crate::pipeline::{CompletionPlan, Pipeline, PlanOutcome, SkipReason};

/// Pull request to describe.
#[derive(Debug, Clone, bon::Builder)]
pub struct DescribeRequest {
    /// Repository owner.
    #[builder(into)]
    pub owner: String,
    /// Repository name.
    #[builder(into)]
    pub repo: String,
    /// Pull request number.
    pub number: u64,
    /// Stop once the completion is planned.
    #[builder(default)]
    pub dry_run: bool,
}

/// A generated description and whether it was written back.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDescription {
    /// Model that wrote it.
    pub model: String,
    /// Estimated prompt size.
    pub prompt_tokens: u32,
    /// Tokens granted to the response.
    pub response_tokens: u32,
    /// Usage reported by the completion API.
    pub usage: Option<Usage>,
    /// The description, without the redundant leading phrase.
    pub description: String,
    /// Whether the pull request body was updated.
    pub published: bool,
}

/// What happened to the pull request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DescribeOutcome {
    /// Intentionally left alone.
    Skipped {
        /// Why.
        #[serde(flatten)]
        reason: SkipReason,
    },
    /// No changed file carried a patch of a selected type.
    NoFilesMatched,
    /// Dry run: the completion that would be requested.
    Planned(CompletionPlan),
    /// A description was generated.
    Generated(GeneratedDescription),
}

/// Fetches the pull request and plans its completion.
///
/// # Errors
///
/// Returns an error if the GitHub token is missing, the pull request cannot
/// be fetched, or the configuration is invalid.
#[instrument(skip(provider, config), fields(owner = %request.owner, repo = %request.repo, number = request.number))]
pub async fn plan_pull_request(
    provider: &dyn TokenProvider,
    config: &AppConfig,
    request: &DescribeRequest,
) -> crate::Result<(ChangeSet, PlanOutcome)> {
    let token = provider
        .github_token()
        .ok_or_else(|| AutodescError::MissingCredential {
            name: "GitHub token".to_string(),
            env: GITHUB_TOKEN_ENV.to_string(),
        })?;
    let client = create_client(&token, &config.github).map_err(github_error)?;

    let change_set = fetch_change_set(
        &client,
        &config.github,
        &request.owner,
        &request.repo,
        request.number,
    )
    .await
    .map_err(github_error)?;

    let pipeline = Pipeline::from_config(config)?;
    let outcome = pipeline.plan(&change_set)?;
    Ok((change_set, outcome))
}

/// Describes a pull request end to end.
///
/// `approve` sees the generated description and decides whether it is
/// published. Dry runs stop before the completion API is called.
///
/// # Errors
///
/// Returns an error if credentials are missing, a GitHub or completion call
/// fails, or no model can hold the prompt.
#[instrument(skip(provider, config, approve), fields(owner = %request.owner, repo = %request.repo, number = request.number))]
pub async fn describe_pull_request<F>(
    provider: &dyn TokenProvider,
    config: &AppConfig,
    request: &DescribeRequest,
    approve: F,
) -> crate::Result<DescribeOutcome>
where
    F: FnOnce(&str) -> bool,
{
    let (_, outcome) = plan_pull_request(provider, config, request).await?;

    let plan = match outcome {
        PlanOutcome::Skipped { reason } => return Ok(DescribeOutcome::Skipped { reason }),
        PlanOutcome::NoFilesMatched => return Ok(DescribeOutcome::NoFilesMatched),
        PlanOutcome::NoModelFits {
            prompt_tokens,
            max_response_tokens,
        } => {
            return Err(AutodescError::NoModelFits {
                prompt_tokens,
                max_response_tokens,
            });
        }
        PlanOutcome::Ready(plan) => plan,
    };

    if request.dry_run {
        return Ok(DescribeOutcome::Planned(plan));
    }

    let api_key = provider
        .openai_key()
        .ok_or_else(|| AutodescError::MissingCredential {
            name: "completion API key".to_string(),
            env: OPENAI_API_KEY_ENV.to_string(),
        })?;
    let client = CompletionClient::from_config(api_key, &config.ai).map_err(completion_error)?;
    let completion = client.complete(&plan).await.map_err(completion_error)?;

    let description = strip_redundant_prefix(&completion.text, &config.prompt.redundant_prefix);

    let published = if approve(&description) {
        let github = provider
            .github_token()
            .ok_or_else(|| AutodescError::MissingCredential {
                name: "GitHub token".to_string(),
                env: GITHUB_TOKEN_ENV.to_string(),
            })?;
        let client = create_client(&github, &config.github).map_err(github_error)?;
        publish_description(
            &client,
            &request.owner,
            &request.repo,
            request.number,
            &description,
        )
        .await
        .map_err(github_error)?;
        info!("Pull request description updated");
        true
    } else {
        info!("Description not published");
        false
    };

    Ok(DescribeOutcome::Generated(GeneratedDescription {
        model: completion.model,
        prompt_tokens: plan.prompt_tokens,
        response_tokens: plan.response_tokens,
        usage: completion.usage,
        description,
        published,
    }))
}

fn github_error(e: anyhow::Error) -> AutodescError {
    AutodescError::GitHub {
        message: format!("{e:#}"),
    }
}

fn completion_error(e: anyhow::Error) -> AutodescError {
    match e.downcast::<AutodescError>() {
        Ok(err) => err,
        Err(e) => AutodescError::Completion {
            message: format!("{e:#}"),
            status: None,
        },
    }
}
