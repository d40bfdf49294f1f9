// SPDX-License-Identifier: Apache-2.0

//! CLI-specific `TokenProvider` implementation.
//!
//! Credentials come from `--github-token`/`--openai-api-key`, which clap
//! falls back to `GITHUB_TOKEN`/`OPENAI_API_KEY` for.

use autodesc_core::auth::TokenProvider;
use secrecy::SecretString;
use tracing::debug;

/// CLI implementation of `TokenProvider`.
pub struct CliTokenProvider {
    github_token: Option<SecretString>,
    openai_key: Option<SecretString>,
}

impl CliTokenProvider {
    /// Wraps the raw flag values, treating empty strings as absent.
    pub fn new(github_token: Option<String>, openai_key: Option<String>) -> Self {
        Self {
            github_token: non_empty(github_token),
            openai_key: non_empty(openai_key),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<SecretString> {
    value.filter(|v| !v.trim().is_empty()).map(SecretString::from)
}

impl TokenProvider for CliTokenProvider {
    fn github_token(&self) -> Option<SecretString> {
        if self.github_token.is_none() {
            debug!("No GitHub token provided");
        }
        self.github_token.clone()
    }

    fn openai_key(&self) -> Option<SecretString> {
        if self.openai_key.is_none() {
            debug!("No completion API key provided");
        }
        self.openai_key.clone()
    }
}
