// SPDX-License-Identifier: Apache-2.0

//! GitHub integration module.
//!
//! Provides the API client and the pull request calls the pipeline needs.

use std::time::Duration;

use anyhow::{Context, Result};
use octocrab::Octocrab;
use octocrab::service::middleware::retry::RetryConfig;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use crate::config::GitHubConfig;

pub mod pulls;

/// Environment variable for the GitHub token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Parses an owner/repo string to extract owner and repo.
///
/// Validates format: exactly one `/`, non-empty parts.
///
/// # Errors
///
/// Returns an error if the format is invalid.
pub fn parse_owner_repo(s: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        anyhow::bail!(
            "Invalid owner/repo format.\n\
             Expected: owner/repo\n\
             Got: {s}"
        );
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}

/// Creates an authenticated Octocrab client for the configured API server.
///
/// Every request is bounded by `config.timeout_seconds` and sent once;
/// failed GitHub calls are never retried.
///
/// # Errors
///
/// Returns an error if the base URL is invalid or the client cannot be built.
#[instrument(skip(token, config), fields(api_url = %config.api_url))]
pub fn create_client(token: &SecretString, config: &GitHubConfig) -> Result<Octocrab> {
    let timeout = Some(Duration::from_secs(config.timeout_seconds));

    let client = Octocrab::builder()
        .add_retry_config(RetryConfig::None)
        .base_uri(config.api_url.as_str())
        .with_context(|| format!("Invalid GitHub API URL: {}", config.api_url))?
        .personal_token(token.expose_secret().to_string())
        .set_connect_timeout(timeout)
        .set_read_timeout(timeout)
        .set_write_timeout(timeout)
        .build()
        .context("Failed to build GitHub client")?;

    debug!("Created authenticated GitHub client");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner_repo() {
        let (owner, repo) = parse_owner_repo("octocat/hello-world").unwrap();
        assert_eq!(owner, "octocat");
        assert_eq!(repo, "hello-world");
    }

    #[test]
    fn test_parse_owner_repo_invalid() {
        assert!(parse_owner_repo("octocat").is_err());
        assert!(parse_owner_repo("octocat/").is_err());
        assert!(parse_owner_repo("/hello-world").is_err());
        assert!(parse_owner_repo("a/b/c").is_err());
    }

    #[tokio::test]
    async fn test_create_client_for_enterprise_server() {
        let config = GitHubConfig {
            api_url: "https://github.example.com/api/v3".to_string(),
            ..GitHubConfig::default()
        };
        let token = SecretString::from("ghp_test");
        assert!(create_client(&token, &config).is_ok());
    }

    #[tokio::test]
    async fn test_create_client_rejects_bad_url() {
        let config = GitHubConfig {
            api_url: "not a url".to_string(),
            ..GitHubConfig::default()
        };
        let token = SecretString::from("ghp_test");
        assert!(create_client(&token, &config).is_err());
    }
}
