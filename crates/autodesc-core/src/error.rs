// SPDX-License-Identifier: Apache-2.0

//! Error types for autodesc.
//!
//! Uses `thiserror` for deriving `std::error::Error` implementations.
//! Application code should use `anyhow::Result` for top-level error handling.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while describing a pull request.
#[derive(Error, Debug)]
pub enum AutodescError {
    /// GitHub API error from octocrab, or a non-2xx response.
    #[error("GitHub API error: {message}")]
    GitHub {
        /// Error message.
        message: String,
    },

    /// Completion API returned a non-success response.
    #[error("Completion API error: {message}")]
    Completion {
        /// Error message or response body.
        message: String,
        /// HTTP status code, when one was received.
        status: Option<u16>,
    },

    /// No model in the catalog can hold the prompt plus the response reservation.
    #[error(
        "No model available for this prompt ({prompt_tokens} prompt tokens, {max_response_tokens} reserved for the response)"
    )]
    NoModelFits {
        /// Estimated prompt size in tokens.
        prompt_tokens: u32,
        /// Tokens reserved for the response.
        max_response_tokens: u32,
    },

    /// The selected model has no room left once prompt and response are reserved.
    #[error(
        "Model {model} does not have enough tokens to generate a response ({prompt_tokens} + {response_tokens} > {context_window})"
    )]
    BudgetExhausted {
        /// Model identifier.
        model: String,
        /// Model context window in tokens.
        context_window: u32,
        /// Estimated prompt size in tokens.
        prompt_tokens: u32,
        /// Tokens reserved for the response.
        response_tokens: u32,
    },

    /// A required credential was not provided.
    #[error("Missing {name}. Set the {env} environment variable or pass it as a flag.")]
    MissingCredential {
        /// What is missing (e.g. "GitHub token").
        name: String,
        /// Environment variable it is read from.
        env: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },

    /// A prompt fragment file could not be read.
    #[error("Failed to read prompt fragment '{name}' from {}", path.display())]
    Fragment {
        /// Fragment name (e.g. `user`, `title`).
        name: String,
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The tokenizer could not be initialized.
    #[error("Tokenizer error: {message}")]
    Tokenizer {
        /// Error message.
        message: String,
    },

    /// Completion API answered with a body we could not use.
    #[error("Invalid completion response: {message}")]
    InvalidCompletionResponse {
        /// What was wrong with the response.
        message: String,
    },

    /// Network/HTTP error from reqwest.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl From<octocrab::Error> for AutodescError {
    fn from(err: octocrab::Error) -> Self {
        AutodescError::GitHub {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for AutodescError {
    fn from(err: config::ConfigError) -> Self {
        AutodescError::Config {
            message: err.to_string(),
        }
    }
}
