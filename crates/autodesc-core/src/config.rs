// SPDX-License-Identifier: Apache-2.0

//! Configuration management for autodesc.
//!
//! Provides layered configuration from files and environment variables.
//! Uses XDG-compliant paths with environment variable support.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables (prefix: `AUTODESC_`)
//! 2. Config file: `~/.config/autodesc/config.toml` (or an explicit path)
//! 3. Built-in defaults
//!
//! # Examples
//!
//! ```bash
//! # Reserve more tokens for the response
//! AUTODESC_AI__MAX_RESPONSE_TOKENS=800 autodesc describe --repo owner/repo --pr 42
//!
//! # Only describe Rust and TOML changes
//! AUTODESC_PROMPT__FILE_TYPES=.rs,.toml autodesc describe --repo owner/repo --pr 42
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::budget::{DEFAULT_HEADROOM_FACTOR, ModelCatalog, ResponseBudget};
use crate::error::AutodescError;
use crate::prompt::FragmentLibrary;

/// Default system instruction of the conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant who writes pull request descriptions";

/// Leading phrase stripped from generated descriptions.
pub const DEFAULT_REDUNDANT_PREFIX: &str = "This pull request ";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// GitHub API settings.
    pub github: GitHubConfig,
    /// Completion API and token budget settings.
    pub ai: AiConfig,
    /// Prompt construction settings.
    pub prompt: PromptConfig,
    /// UI preferences.
    pub ui: UiConfig,
}

/// GitHub API settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// REST API base URL (GitHub Enterprise servers use their own).
    pub api_url: String,
    /// API request timeout in seconds.
    pub timeout_seconds: u64,
    /// Changed files requested per page.
    pub per_page: u8,
    /// Maximum number of changed-file pages to fetch.
    pub max_pages: u32,
    /// Authors allowed to get a generated description (empty: everyone).
    pub allowed_users: Vec<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            timeout_seconds: 30,
            per_page: 30,
            max_pages: 30,
            allowed_users: Vec::new(),
        }
    }
}

/// Completion API and token budget settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Chat completions endpoint.
    pub api_url: String,
    /// Candidate models and their context windows.
    pub models: BTreeMap<String, u32>,
    /// Tokens always reserved for the response.
    pub max_response_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Share of leftover headroom granted to the response (0.0-1.0).
    pub headroom_factor: f64,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Attempts per completion call when the connection drops.
    pub max_attempts: usize,
    /// System instruction of the conversation.
    pub system_prompt: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            models: BTreeMap::from([
                ("gpt-3.5-turbo".to_string(), 4096),
                ("gpt-3.5-turbo-16k".to_string(), 16384),
                ("gpt-4".to_string(), 8192),
                ("gpt-4-32k".to_string(), 32768),
            ]),
            max_response_tokens: 500,
            temperature: 0.2,
            headroom_factor: DEFAULT_HEADROOM_FACTOR,
            timeout_seconds: 30,
            max_attempts: 5,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl AiConfig {
    /// Validated model catalog.
    pub fn catalog(&self) -> Result<ModelCatalog, AutodescError> {
        ModelCatalog::new(self.models.clone())
    }

    /// Validated response budget.
    pub fn response_budget(&self) -> Result<ResponseBudget, AutodescError> {
        ResponseBudget::new(self.max_response_tokens, self.headroom_factor)
    }
}

/// Prompt construction settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Filename suffixes to include (empty: every file).
    pub file_types: Vec<String>,
    /// Directory with `prompt/*.md` and `response/response.md` overriding the built-ins.
    pub fragment_dir: Option<PathBuf>,
    /// Title used in the example prompt.
    pub sample_title: String,
    /// Replaces the assembled example prompt entirely.
    pub sample_prompt: Option<String>,
    /// Replaces the assembled example response entirely.
    pub sample_response: Option<String>,
    /// Leading phrase stripped from generated descriptions.
    pub redundant_prefix: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            file_types: Vec::new(),
            fragment_dir: None,
            sample_title: "Make the request timeout unit explicit".to_string(),
            sample_prompt: None,
            sample_response: None,
            redundant_prefix: DEFAULT_REDUNDANT_PREFIX.to_string(),
        }
    }
}

impl PromptConfig {
    /// Fragment library honoring `fragment_dir`.
    #[must_use]
    pub fn fragments(&self) -> FragmentLibrary {
        match &self.fragment_dir {
            Some(dir) => FragmentLibrary::from_dir(dir),
            None => FragmentLibrary::builtin(),
        }
    }
}

/// UI preferences.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Ask before overwriting the pull request body.
    pub confirm_before_publish: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            confirm_before_publish: true,
        }
    }
}

/// Returns the autodesc configuration directory.
///
/// Respects the `XDG_CONFIG_HOME` environment variable if set,
/// otherwise defaults to `~/.config/autodesc`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return PathBuf::from(xdg_config).join("autodesc");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("autodesc")
}

/// Returns the path to the default configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load application configuration from the default location.
///
/// # Errors
///
/// Returns `AutodescError::Config` if the config file exists but is invalid.
pub fn load_config() -> Result<AppConfig, AutodescError> {
    load_config_from(None)
}

/// Load application configuration.
///
/// Reads `path` when given (it must exist), otherwise the optional default
/// config file, then applies environment variables. Environment variables
/// use the prefix `AUTODESC_` and double underscore for nested keys (e.g.
/// `AUTODESC_AI__TEMPERATURE`); list values are comma separated.
///
/// # Errors
///
/// Returns `AutodescError::Config` if a file is missing or invalid.
pub fn load_config_from(path: Option<&Path>) -> Result<AppConfig, AutodescError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::from(config_file_path()).required(false),
    };

    let config = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix("AUTODESC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("prompt.file_types")
                .with_list_parse_key("github.allowed_users"),
        )
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    Ok(app_config)
}
