// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # Autodesc Core
//!
//! Core library for autodesc - AI-written pull request descriptions that fit
//! the model's token budget.
//!
//! This crate provides reusable components for:
//! - Prompt assembly from markdown fragments
//! - Token estimation, model selection and response budgeting
//! - GitHub API integration (pull request files, description updates)
//! - Chat completion requests with retry on dropped connections
//! - Configuration management
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use autodesc_core::{ChangeSet, ChangedFile, Pipeline, PlanOutcome, load_config};
//! use anyhow::Result;
//!
//! # fn example() -> Result<()> {
//! let config = load_config()?;
//! let pipeline = Pipeline::from_config(&config)?;
//!
//! let change_set = ChangeSet::builder()
//!     .title("Add retry to the uploader")
//!     .files(vec![ChangedFile::new("src/upload.rs", Some("+retry();"))])
//!     .build();
//!
//! if let PlanOutcome::Ready(plan) = pipeline.plan(&change_set)? {
//!     println!("{} with {} response tokens", plan.model, plan.response_tokens);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ai`] - Chat completions client
//! - [`budget`] - Token estimation, model selection, response budget
//! - [`config`] - Configuration loading and paths
//! - [`error`] - Error types
//! - [`github`] - GitHub API (pull requests)
//! - [`markdown`] - Fenced code block extraction
//! - [`pipeline`] - Planning state machine
//! - [`prompt`] - Prompt fragments and assembly

// ============================================================================
// Authentication
// ============================================================================

pub use auth::TokenProvider;

// ============================================================================
// Error Handling
// ============================================================================

pub use error::AutodescError;

/// Convenience Result type for autodesc operations.
///
/// This is equivalent to `std::result::Result<T, AutodescError>`.
pub type Result<T> = std::result::Result<T, AutodescError>;

// ============================================================================
// Configuration
// ============================================================================

pub use config::{
    AiConfig, AppConfig, GitHubConfig, PromptConfig, UiConfig, config_dir, config_file_path,
    load_config, load_config_from,
};

// ============================================================================
// Prompt Assembly
// ============================================================================

pub use prompt::{Conversation, Fragment, FragmentLibrary, Message, PromptTemplate, Role};

// ============================================================================
// Token Budget
// ============================================================================

pub use budget::{
    Cl100kTokenizer, ModelCatalog, ResponseBudget, Selection, TokenEstimator, Tokenizer,
};

// ============================================================================
// Pipeline
// ============================================================================

pub use pipeline::{
    CompletionPlan, Pipeline, PipelineState, PlanOutcome, PromptSettings, SkipReason,
    file_type_matches,
};

// ============================================================================
// GitHub Integration
// ============================================================================

pub use github::parse_owner_repo;
pub use github::pulls::{ChangeSet, ChangedFile};

// ============================================================================
// AI Integration
// ============================================================================

pub use ai::{Completion, CompletionBackend, CompletionClient, strip_redundant_prefix};

// ============================================================================
// Retry Logic
// ============================================================================

pub use retry::{is_transient_anyhow, is_transient_network_error, retry_backoff};

// ============================================================================
// Platform-Agnostic Facade
// ============================================================================

pub use facade::{
    DescribeOutcome, DescribeRequest, GeneratedDescription, describe_pull_request,
    plan_pull_request,
};

// ============================================================================
// Modules
// ============================================================================

pub mod ai;
pub mod auth;
pub mod budget;
pub mod config;
pub mod error;
pub mod facade;
pub mod github;
pub mod markdown;
pub mod pipeline;
pub mod prompt;
pub mod retry;
