// SPDX-License-Identifier: Apache-2.0

//! Token provider abstraction for credential resolution.
//!
//! Callers implement [`TokenProvider`] to hand the GitHub token and the
//! completion API key to the facade from whatever source they use (flags,
//! environment, a CI secret store).

use secrecy::SecretString;

/// Provides GitHub and completion API credentials for API calls.
///
/// Implementations return `None` if a credential is not available.
pub trait TokenProvider: Send + Sync {
    /// Retrieves the GitHub API token.
    fn github_token(&self) -> Option<SecretString>;

    /// Retrieves the completion API key.
    fn openai_key(&self) -> Option<SecretString>;
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    struct MockTokenProvider {
        github_token: Option<SecretString>,
        openai_key: Option<SecretString>,
    }

    impl TokenProvider for MockTokenProvider {
        fn github_token(&self) -> Option<SecretString> {
            self.github_token.clone()
        }

        fn openai_key(&self) -> Option<SecretString> {
            self.openai_key.clone()
        }
    }

    #[test]
    fn test_provider_is_object_safe() {
        let provider: Box<dyn TokenProvider> = Box::new(MockTokenProvider {
            github_token: Some(SecretString::from("ghp_test")),
            openai_key: None,
        });

        assert_eq!(
            provider.github_token().unwrap().expose_secret(),
            "ghp_test"
        );
        assert!(provider.openai_key().is_none());
    }
}
