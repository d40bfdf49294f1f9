// SPDX-License-Identifier: Apache-2.0

//! Command-line interface definition for autodesc.
//!
//! Uses clap's derive API for declarative CLI parsing.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for CLI results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with colors (default)
    #[default]
    Text,
    /// JSON output for programmatic consumption
    Json,
    /// YAML output for programmatic consumption
    Yaml,
}

/// Global output configuration passed to commands.
#[derive(Clone)]
pub struct OutputContext {
    /// Output format (text, json, yaml)
    pub format: OutputFormat,
    /// Suppress non-essential output (spinners, progress)
    pub quiet: bool,
    /// Enable verbose output
    pub verbose: bool,
    /// Whether stdout is a terminal (TTY)
    pub is_tty: bool,
}

impl OutputContext {
    /// Creates an `OutputContext` from CLI arguments.
    pub fn from_cli(format: OutputFormat, quiet: bool, verbose: bool) -> Self {
        Self {
            format,
            quiet,
            verbose,
            is_tty: std::io::stdout().is_terminal(),
        }
    }

    /// Returns true if interactive elements (spinners, colors, prompts) should be shown.
    pub fn is_interactive(&self) -> bool {
        self.is_tty && !self.quiet && matches!(self.format, OutputFormat::Text)
    }
}

/// Autodesc - AI-written pull request descriptions.
///
/// Fetches a pull request's diffs, builds a prompt that fits the smallest
/// suitable model, and writes the generated description back to GitHub.
#[derive(Parser)]
#[command(name = "autodesc")]
#[command(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Output format (text, json, yaml)
    #[arg(long, short = 'o', global = true, default_value = "text", value_enum)]
    pub output: OutputFormat,

    /// Suppress non-essential output (spinners, progress)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a description for a pull request
    Describe(DescribeArgs),

    /// List the configured models and their context windows
    Models(ModelsArgs),
}

/// Arguments of `autodesc describe`.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Repository in owner/repo format
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repo: String,

    /// Pull request number
    #[arg(long)]
    pub pr: u64,

    /// GitHub REST API base URL (for GitHub Enterprise servers)
    #[arg(long, value_name = "URL")]
    pub github_api_url: Option<String>,

    /// GitHub token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Completion API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Comma-separated GitHub logins allowed to get a description (default: everyone)
    #[arg(long, value_delimiter = ',', value_name = "LOGINS")]
    pub allowed_users: Option<Vec<String>>,

    /// Comma-separated filename suffixes to include, e.g. .rs,.toml (default: every file)
    #[arg(long, value_delimiter = ',', value_name = "SUFFIXES")]
    pub file_types: Option<Vec<String>>,

    /// Model catalog as a JSON object of model to context window, e.g. '{"gpt-4": 8192}'
    #[arg(long, value_name = "JSON")]
    pub models: Option<String>,

    /// Tokens always reserved for the response
    #[arg(long, value_name = "N")]
    pub max_response_tokens: Option<u32>,

    /// Sampling temperature
    #[arg(long, value_name = "F")]
    pub temperature: Option<f32>,

    /// Plan the completion and print it without calling the completion API
    #[arg(long)]
    pub dry_run: bool,

    /// Publish without asking for confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Arguments of `autodesc models`.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Model catalog as a JSON object, replacing the configured one
    #[arg(long, value_name = "JSON")]
    pub models: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_describe_parses_lists() {
        let cli = Cli::try_parse_from([
            "autodesc",
            "describe",
            "--repo",
            "octocat/hello",
            "--pr",
            "7",
            "--file-types",
            ".rs,.toml",
            "--allowed-users",
            "octocat,hubot",
            "--dry-run",
        ])
        .unwrap();

        let Commands::Describe(args) = cli.command else {
            panic!("expected describe");
        };
        assert_eq!(args.repo, "octocat/hello");
        assert_eq!(args.pr, 7);
        assert_eq!(
            args.file_types,
            Some(vec![".rs".to_string(), ".toml".to_string()])
        );
        assert_eq!(
            args.allowed_users,
            Some(vec!["octocat".to_string(), "hubot".to_string()])
        );
        assert!(args.dry_run);
    }

    #[test]
    fn test_global_output_after_subcommand() {
        let cli = Cli::try_parse_from(["autodesc", "models", "--output", "json"]).unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
    }
}
