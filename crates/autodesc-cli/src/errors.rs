// SPDX-License-Identifier: Apache-2.0

//! CLI-specific error formatting with user-friendly hints.
//!
//! Downcasts `anyhow::Error` to `AutodescError` and appends a hint per
//! error kind. Structured error data stays in the library; presentation
//! lives here.

use std::fmt::Write;

use anyhow::Error;
use autodesc_core::error::AutodescError;
use autodesc_core::is_transient_anyhow;

/// Formats an error for CLI display with helpful hints.
///
/// If no `AutodescError` is found in the chain, returns the error chain as is.
pub fn format_error(error: &Error) -> String {
    let Some(autodesc_err) = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<AutodescError>())
    else {
        if is_transient_anyhow(error) {
            return format!(
                "{error:#}\n\nTip: The connection was dropped repeatedly. Try again in a moment."
            );
        }
        return format!("{error:#}");
    };

    match autodesc_err {
        AutodescError::Completion { message, status } => {
            let mut msg = format!("Completion API error: {message}");
            if let Some(code) = status
                && !message.contains(&code.to_string())
            {
                let _ = write!(msg, " (HTTP {code})");
            }
            msg.push_str("\n\nTip: Check your OPENAI_API_KEY environment variable and the [ai] api_url setting.");
            msg
        }
        AutodescError::NoModelFits { .. } | AutodescError::BudgetExhausted { .. } => {
            format!(
                "{autodesc_err}\n\nTip: Narrow the diff with --file-types, lower --max-response-tokens, or add a model with a larger context window via --models."
            )
        }
        AutodescError::MissingCredential { .. } => autodesc_err.to_string(),
        AutodescError::Config { .. } => {
            format!(
                "{autodesc_err}\n\nTip: Check your config file at {}",
                autodesc_core::config::config_file_path().display()
            )
        }
        AutodescError::Fragment { .. } => {
            format!(
                "{autodesc_err}\n\nTip: Check the [prompt] fragment_dir setting; missing files fall back to the built-in prompts."
            )
        }
        AutodescError::Tokenizer { .. } => autodesc_err.to_string(),
        AutodescError::InvalidCompletionResponse { .. } => {
            format!(
                "{autodesc_err}\n\nTip: This may be a temporary issue with the completion API. Try again in a moment."
            )
        }
        AutodescError::Network(_) => {
            format!("{autodesc_err}\n\nTip: Check your internet connection and try again.")
        }
        AutodescError::GitHub { .. } => {
            format!(
                "{autodesc_err}\n\nTip: Check that GITHUB_TOKEN can read and write pull requests in this repository."
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_no_model_fits() {
        let err = anyhow::Error::new(AutodescError::NoModelFits {
            prompt_tokens: 40_000,
            max_response_tokens: 500,
        });
        let formatted = format_error(&err);

        assert!(formatted.contains("40000 prompt tokens"));
        assert!(formatted.contains("--file-types"));
    }

    #[test]
    fn test_format_completion_error_adds_status_once() {
        let err = anyhow::Error::new(AutodescError::Completion {
            message: "quota exceeded".to_string(),
            status: Some(429),
        });
        let formatted = format_error(&err);
        assert!(formatted.contains("quota exceeded (HTTP 429)"));

        let err = anyhow::Error::new(AutodescError::Completion {
            message: "HTTP 500: boom".to_string(),
            status: Some(500),
        });
        let formatted = format_error(&err);
        assert!(!formatted.contains("(HTTP 500)"));
        assert!(formatted.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_format_config_error_points_to_file() {
        let err = anyhow::Error::new(AutodescError::Config {
            message: "bad value".to_string(),
        });
        assert!(format_error(&err).contains("config.toml"));
    }

    #[test]
    fn test_format_finds_error_behind_context() {
        let err = anyhow::Error::new(AutodescError::GitHub {
            message: "Not Found".to_string(),
        })
        .context("Failed to describe pull request");
        assert!(format_error(&err).contains("GITHUB_TOKEN"));
    }

    #[test]
    fn test_format_other_error() {
        let err = anyhow::anyhow!("Invalid owner/repo format");
        assert_eq!(format_error(&err), "Invalid owner/repo format");
    }
}
