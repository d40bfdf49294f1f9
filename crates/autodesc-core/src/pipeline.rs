// SPDX-License-Identifier: Apache-2.0

//! Planning a description request.
//!
//! A [`Pipeline`] turns a fetched [`ChangeSet`] into a [`PlanOutcome`]:
//!
//! ```text
//! CollectContext -> BuildPrompt -> NoFilesMatched            (skip)
//!                               -> EstimateAndSelect -> NoModelFits    (failure)
//!                                                    -> ExpandBudget -> ReadyForCompletion
//! ```
//!
//! Planning is pure: it performs no network I/O and never mutates its input.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::budget::{
    Cl100kTokenizer, ModelCatalog, ResponseBudget, TokenEstimator, Tokenizer,
};
use crate::config::AppConfig;
use crate::error::AutodescError;
use crate::github::pulls::ChangeSet;
use crate::prompt::{Conversation, FragmentLibrary, combine, combine_with_title};

/// Whether `filename` ends with one of `suffixes`.
///
/// An empty list matches every file, and so does an empty suffix.
#[must_use]
pub fn file_type_matches(filename: &str, suffixes: &[String]) -> bool {
    suffixes.is_empty() || suffixes.iter().any(|s| filename.ends_with(s.as_str()))
}

/// Stages of planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Checking whether the pull request should be described at all.
    CollectContext,
    /// Assembling the completion prompt from fragments and patches.
    BuildPrompt,
    /// No changed file carried a patch of a selected type.
    NoFilesMatched,
    /// Estimating the conversation and picking a model.
    EstimateAndSelect,
    /// No model can hold the conversation.
    NoModelFits,
    /// Growing the response allowance.
    ExpandBudget,
    /// A completion request can be sent.
    ReadyForCompletion,
}

impl PipelineState {
    /// Whether planning stops in this state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::NoFilesMatched | Self::NoModelFits | Self::ReadyForCompletion
        )
    }
}

/// Why a pull request was left alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The pull request already has a description.
    ExistingDescription,
    /// An allow-list is configured and the author is not on it.
    AuthorNotAllowed {
        /// Login of the author, when known.
        author: Option<String>,
    },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExistingDescription => write!(f, "pull request already has a description"),
            Self::AuthorNotAllowed { author: Some(a) } => {
                write!(f, "pull request author {a} is not allowed to trigger this action")
            }
            Self::AuthorNotAllowed { author: None } => {
                write!(f, "pull request author is unknown and an allow-list is configured")
            }
        }
    }
}

/// Everything needed to request a completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionPlan {
    /// System, example prompt, example response, real prompt.
    pub conversation: Conversation,
    /// Selected model.
    pub model: String,
    /// Estimated size of the conversation.
    pub prompt_tokens: u32,
    /// Context window of the selected model.
    pub context_window: u32,
    /// Tokens granted to the response.
    pub response_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl CompletionPlan {
    /// The real completion prompt.
    #[must_use]
    pub fn prompt(&self) -> &str {
        self.conversation.prompt().unwrap_or_default()
    }
}

/// Result of planning.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlanOutcome {
    /// The pull request is intentionally left alone.
    Skipped {
        /// Why.
        #[serde(flatten)]
        reason: SkipReason,
    },
    /// No changed file carried a patch of a selected type.
    NoFilesMatched,
    /// No model can hold the conversation plus the response reservation.
    NoModelFits {
        /// Estimated size of the conversation.
        prompt_tokens: u32,
        /// Tokens reserved for the response.
        max_response_tokens: u32,
    },
    /// A completion request can be sent.
    Ready(CompletionPlan),
}

impl PlanOutcome {
    /// Stage planning stopped in.
    #[must_use]
    pub fn state(&self) -> PipelineState {
        match self {
            Self::Skipped { .. } => PipelineState::CollectContext,
            Self::NoFilesMatched => PipelineState::NoFilesMatched,
            Self::NoModelFits { .. } => PipelineState::NoModelFits,
            Self::Ready(_) => PipelineState::ReadyForCompletion,
        }
    }

    /// `0` for success or an intentional skip, `1` for failure.
    #[must_use]
    pub fn status_code(&self) -> i32 {
        match self {
            Self::NoModelFits { .. } => 1,
            Self::Skipped { .. } | Self::NoFilesMatched | Self::Ready(_) => 0,
        }
    }

    /// Status code paired with the assembled prompt (empty unless ready).
    #[must_use]
    pub fn status_and_prompt(&self) -> (i32, &str) {
        match self {
            Self::Ready(plan) => (0, plan.prompt()),
            other => (other.status_code(), ""),
        }
    }
}

/// Prompt text and filtering settings.
#[derive(Debug, Clone)]
pub struct PromptSettings {
    /// System instruction.
    pub system_prompt: String,
    /// Fragments the prompts are built from.
    pub fragments: FragmentLibrary,
    /// Title rendered into the example prompt.
    pub sample_title: String,
    /// Replaces the assembled example prompt.
    pub sample_prompt: Option<String>,
    /// Replaces the assembled example response.
    pub sample_response: Option<String>,
    /// Filename suffixes to include (empty: every file).
    pub file_types: Vec<String>,
    /// Authors allowed to get a description (empty: everyone).
    pub allowed_users: Vec<String>,
}

impl PromptSettings {
    /// Settings taken from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            system_prompt: config.ai.system_prompt.clone(),
            fragments: config.prompt.fragments(),
            sample_title: config.prompt.sample_title.clone(),
            sample_prompt: config.prompt.sample_prompt.clone(),
            sample_response: config.prompt.sample_response.clone(),
            file_types: config.prompt.file_types.clone(),
            allowed_users: config.github.allowed_users.clone(),
        }
    }

    /// The example user prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if a fragment file cannot be read.
    pub fn sample_prompt(&self) -> Result<String, AutodescError> {
        match &self.sample_prompt {
            Some(text) => Ok(text.clone()),
            None => combine_with_title(&self.fragments.sample_prompt(), &self.sample_title),
        }
    }

    /// The example assistant response.
    ///
    /// # Errors
    ///
    /// Returns an error if a fragment file cannot be read.
    pub fn sample_response(&self) -> Result<String, AutodescError> {
        match &self.sample_response {
            Some(text) => Ok(text.clone()),
            None => combine(&self.fragments.sample_response()),
        }
    }
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Plans completion requests for pull requests.
#[derive(Debug, bon::Builder)]
pub struct Pipeline<T: Tokenizer> {
    #[builder(default)]
    settings: PromptSettings,
    catalog: ModelCatalog,
    #[builder(default)]
    budget: ResponseBudget,
    #[builder(default = 0.2)]
    temperature: f32,
    estimator: TokenEstimator<T>,
}

impl Pipeline<Cl100kTokenizer> {
    /// Pipeline over the loaded configuration using `cl100k_base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model catalog or response budget is invalid,
    /// or the tokenizer cannot be loaded.
    pub fn from_config(config: &AppConfig) -> Result<Self, AutodescError> {
        Ok(Self {
            settings: PromptSettings::from_config(config),
            catalog: config.ai.catalog()?,
            budget: config.ai.response_budget()?,
            temperature: config.ai.temperature,
            estimator: TokenEstimator::cl100k()?,
        })
    }
}

impl<T: Tokenizer> Pipeline<T> {
    /// Prompt settings in use.
    #[must_use]
    pub fn settings(&self) -> &PromptSettings {
        &self.settings
    }

    /// Model catalog in use.
    #[must_use]
    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Why `change_set` should be left alone, if it should.
    #[must_use]
    pub fn skip_reason(&self, change_set: &ChangeSet) -> Option<SkipReason> {
        if change_set.has_description() {
            return Some(SkipReason::ExistingDescription);
        }
        let allowed = &self.settings.allowed_users;
        if !allowed.is_empty()
            && !change_set
                .author
                .as_ref()
                .is_some_and(|author| allowed.contains(author))
        {
            return Some(SkipReason::AuthorNotAllowed {
                author: change_set.author.clone(),
            });
        }
        None
    }

    /// Assembles the real completion prompt.
    ///
    /// Returns `None` when no changed file has a patch of a selected type.
    ///
    /// # Errors
    ///
    /// Returns an error if a fragment file cannot be read.
    pub fn build_completion_prompt(
        &self,
        change_set: &ChangeSet,
    ) -> Result<Option<String>, AutodescError> {
        let mut prompt = combine_with_title(
            &self.settings.fragments.completion_prompt(),
            &change_set.title,
        )?;

        let mut matched = 0_usize;
        for file in &change_set.files {
            // Binary or oversized changes come without a patch.
            let Some(patch) = &file.patch else {
                debug!(file = %file.filename, "Skipping file without patch");
                continue;
            };
            if !file_type_matches(&file.filename, &self.settings.file_types) {
                debug!(file = %file.filename, "Skipping file of unselected type");
                continue;
            }
            matched += 1;
            prompt.push_str(&format!("Changes in file {}: \n{patch}\n", file.filename));
        }

        if matched == 0 {
            return Ok(None);
        }
        debug!(matched, total = change_set.files.len(), "Completion prompt assembled");
        Ok(Some(prompt))
    }

    /// Runs planning for `change_set`.
    ///
    /// # Errors
    ///
    /// Returns an error if a fragment file cannot be read. Running out of
    /// models is reported as [`PlanOutcome::NoModelFits`], not as an error.
    #[instrument(skip_all, fields(files = change_set.files.len()))]
    pub fn plan(&self, change_set: &ChangeSet) -> Result<PlanOutcome, AutodescError> {
        debug!(state = ?PipelineState::CollectContext);
        if let Some(reason) = self.skip_reason(change_set) {
            info!(%reason, "Skipping pull request");
            return Ok(PlanOutcome::Skipped { reason });
        }

        debug!(state = ?PipelineState::BuildPrompt);
        let Some(prompt) = self.build_completion_prompt(change_set)? else {
            info!("No file type matched");
            return Ok(PlanOutcome::NoFilesMatched);
        };

        let conversation = Conversation::few_shot(
            self.settings.system_prompt.as_str(),
            self.settings.sample_prompt()?,
            self.settings.sample_response()?,
            prompt,
        );

        debug!(state = ?PipelineState::EstimateAndSelect);
        let reservation = self.budget.base_tokens;
        let prompt_tokens = self.estimator.estimate(&conversation);
        let Some(selection) = self.catalog.select(prompt_tokens, reservation) else {
            info!(prompt_tokens, reservation, "No model can hold the prompt");
            return Ok(PlanOutcome::NoModelFits {
                prompt_tokens,
                max_response_tokens: reservation,
            });
        };

        debug!(state = ?PipelineState::ExpandBudget);
        let response_tokens = match self.budget.expand_for(&selection) {
            Ok(tokens) => tokens,
            Err(AutodescError::BudgetExhausted { prompt_tokens, .. }) => {
                return Ok(PlanOutcome::NoModelFits {
                    prompt_tokens,
                    max_response_tokens: reservation,
                });
            }
            Err(e) => return Err(e),
        };

        info!(
            model = %selection.model,
            context_window = selection.context_window,
            prompt_tokens = selection.prompt_tokens,
            response_tokens,
            "Model selected"
        );

        Ok(PlanOutcome::Ready(CompletionPlan {
            conversation,
            model: selection.model,
            prompt_tokens: selection.prompt_tokens,
            context_window: selection.context_window,
            response_tokens,
            temperature: self.temperature,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::tokens::tests::WordTokenizer;
    use crate::github::pulls::ChangedFile;
    use crate::prompt::Fragment;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn settings() -> PromptSettings {
        let fragments = FragmentLibrary {
            user: Fragment::builtin("user", "You write for reviewers."),
            command: Fragment::builtin("command", "Describe the change."),
            format: Fragment::builtin("format", "Use prose."),
            title: Fragment::builtin("title", "The title is \"{{title}}\"."),
            unified_change: Fragment::builtin("unified_change", "+added line"),
            response: Fragment::builtin("response", "Adds a line."),
        };
        PromptSettings {
            system_prompt: "system".to_string(),
            fragments,
            sample_title: "Sample".to_string(),
            sample_prompt: None,
            sample_response: None,
            file_types: vec![".rs".to_string()],
            allowed_users: Vec::new(),
        }
    }

    fn pipeline(settings: PromptSettings, models: &[(&str, u32)]) -> Pipeline<WordTokenizer> {
        let catalog = ModelCatalog::new(
            models
                .iter()
                .map(|(m, w)| ((*m).to_string(), *w))
                .collect::<BTreeMap<_, _>>(),
        )
        .unwrap();
        Pipeline::builder()
            .settings(settings)
            .catalog(catalog)
            .budget(ResponseBudget::new(10, 0.8).unwrap())
            .estimator(TokenEstimator::new(WordTokenizer))
            .build()
    }

    fn change_set(files: Vec<ChangedFile>) -> ChangeSet {
        ChangeSet::builder()
            .title("Add parser")
            .author("octocat")
            .files(files)
            .build()
    }

    #[test]
    fn test_file_type_matches() {
        let suffixes = vec![".rs".to_string(), ".toml".to_string()];
        assert!(file_type_matches("src/lib.rs", &suffixes));
        assert!(file_type_matches("Cargo.toml", &suffixes));
        assert!(!file_type_matches("README.md", &suffixes));
        assert!(!file_type_matches("src/rs", &suffixes));
    }

    #[test]
    fn test_file_type_matches_everything_when_unfiltered() {
        assert!(file_type_matches("README.md", &[]));
        assert!(file_type_matches("README.md", &[String::new()]));
    }

    #[test]
    fn test_prompt_has_one_block_per_matching_file() {
        let pipeline = pipeline(settings(), &[("big", 10_000)]);
        let prompt = pipeline
            .build_completion_prompt(&change_set(vec![
                ChangedFile::new("src/lib.rs", Some("+fn a() {}")),
                ChangedFile::new("README.md", Some("+docs")),
            ]))
            .unwrap()
            .unwrap();

        assert_eq!(prompt.matches("Changes in file").count(), 1);
        assert!(prompt.ends_with("Changes in file src/lib.rs: \n+fn a() {}\n"));
        assert!(prompt.contains("The title is \"Add parser\"."));
    }

    #[test]
    fn test_prompt_layout() {
        let pipeline = pipeline(settings(), &[("big", 10_000)]);
        let prompt = pipeline
            .build_completion_prompt(&change_set(vec![ChangedFile::new(
                "a.rs",
                Some("+x"),
            )]))
            .unwrap()
            .unwrap();

        assert_eq!(
            prompt,
            "You write for reviewers.\n\nDescribe the change.\n\nUse prose.\n\n\
             The title is \"Add parser\".\n\nChanges in file a.rs: \n+x\n"
        );
    }

    #[test]
    fn test_files_without_patch_are_skipped() {
        let pipeline = pipeline(settings(), &[("big", 10_000)]);
        let result = pipeline
            .build_completion_prompt(&change_set(vec![ChangedFile::new(
                "logo.rs",
                None::<String>,
            )]))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_sample_prompt_uses_sample_title() {
        let sample = settings().sample_prompt().unwrap();
        assert_eq!(
            sample,
            "You write for reviewers.\n\nDescribe the change.\n\nUse prose.\n\n\
             The title is \"Sample\".\n\n+added line\n\n"
        );
        assert_eq!(settings().sample_response().unwrap(), "Adds a line.\n\n");
    }

    #[test]
    fn test_sample_overrides() {
        let mut settings = settings();
        settings.sample_prompt = Some("custom prompt".to_string());
        settings.sample_response = Some("custom response".to_string());
        assert_eq!(settings.sample_prompt().unwrap(), "custom prompt");
        assert_eq!(settings.sample_response().unwrap(), "custom response");
    }

    #[test]
    fn test_plan_ready() {
        let pipeline = pipeline(settings(), &[("small", 20), ("big", 10_000), ("huge", 50_000)]);
        let outcome = pipeline
            .plan(&change_set(vec![ChangedFile::new("a.rs", Some("+x"))]))
            .unwrap();

        assert_eq!(outcome.state(), PipelineState::ReadyForCompletion);
        assert_eq!(outcome.status_code(), 0);
        let PlanOutcome::Ready(plan) = outcome else {
            panic!("expected a plan");
        };
        assert_eq!(plan.model, "big");
        assert_eq!(plan.conversation.len(), 4);
        assert!(plan.prompt().starts_with("You write for reviewers."));
        assert!(plan.response_tokens >= 10);
        assert!(plan.prompt_tokens + plan.response_tokens <= plan.context_window);
    }

    #[test]
    fn test_plan_no_files_matched() {
        let pipeline = pipeline(settings(), &[("big", 10_000)]);
        let outcome = pipeline
            .plan(&change_set(vec![ChangedFile::new("README.md", Some("+docs"))]))
            .unwrap();
        assert_eq!(outcome, PlanOutcome::NoFilesMatched);
        assert_eq!(outcome.status_and_prompt(), (0, ""));
        assert!(outcome.state().is_terminal());
    }

    #[test]
    fn test_plan_no_model_fits() {
        let pipeline = pipeline(settings(), &[("tiny", 20)]);
        let outcome = pipeline
            .plan(&change_set(vec![ChangedFile::new("a.rs", Some("+x"))]))
            .unwrap();
        assert!(matches!(
            outcome,
            PlanOutcome::NoModelFits {
                max_response_tokens: 10,
                ..
            }
        ));
        assert_eq!(outcome.status_code(), 1);
        assert_eq!(outcome.status_and_prompt(), (1, ""));
    }

    #[derive(Debug)]
    struct CountingTokenizer(Arc<AtomicUsize>);

    impl Tokenizer for CountingTokenizer {
        fn encoding_name(&self) -> &str {
            "counting"
        }

        fn count(&self, text: &str) -> usize {
            self.0.fetch_add(1, Ordering::SeqCst);
            text.split_whitespace().count()
        }
    }

    fn counting_pipeline(
        models: &[(&str, u32)],
    ) -> (Pipeline<CountingTokenizer>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let catalog = ModelCatalog::new(
            models
                .iter()
                .map(|(m, w)| ((*m).to_string(), *w))
                .collect::<BTreeMap<_, _>>(),
        )
        .unwrap();
        let pipeline = Pipeline::builder()
            .settings(settings())
            .catalog(catalog)
            .budget(ResponseBudget::new(10, 0.8).unwrap())
            .estimator(TokenEstimator::new(CountingTokenizer(Arc::clone(&calls))))
            .build();
        (pipeline, calls)
    }

    #[test]
    fn test_plan_estimates_conversation_once() {
        let files = vec![ChangedFile::new("a.rs", Some("+x"))];

        let (fitting, _) = counting_pipeline(&[("big", 10_000)]);
        let PlanOutcome::Ready(plan) = fitting.plan(&change_set(files.clone())).unwrap() else {
            panic!("expected a plan");
        };
        let single = Arc::new(AtomicUsize::new(0));
        let prompt_tokens = TokenEstimator::new(CountingTokenizer(Arc::clone(&single)))
            .estimate(&plan.conversation);
        let per_estimate = single.load(Ordering::SeqCst);
        assert!(per_estimate > 0);

        let (tiny, calls) = counting_pipeline(&[("tiny", 20)]);
        let outcome = tiny.plan(&change_set(files)).unwrap();
        assert_eq!(
            outcome,
            PlanOutcome::NoModelFits {
                prompt_tokens,
                max_response_tokens: 10,
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), per_estimate);
    }

    #[test]
    fn test_plan_skips_existing_description() {
        let pipeline = pipeline(settings(), &[("big", 10_000)]);
        let mut change_set = change_set(vec![ChangedFile::new("a.rs", Some("+x"))]);
        change_set.body = Some("Already written".to_string());

        let outcome = pipeline.plan(&change_set).unwrap();
        assert_eq!(
            outcome,
            PlanOutcome::Skipped {
                reason: SkipReason::ExistingDescription
            }
        );
        assert_eq!(outcome.status_code(), 0);
    }

    #[test]
    fn test_plan_skips_author_outside_allow_list() {
        let mut settings = settings();
        settings.allowed_users = vec!["hubot".to_string()];
        let pipeline = pipeline(settings, &[("big", 10_000)]);

        let outcome = pipeline
            .plan(&change_set(vec![ChangedFile::new("a.rs", Some("+x"))]))
            .unwrap();
        assert_eq!(
            outcome,
            PlanOutcome::Skipped {
                reason: SkipReason::AuthorNotAllowed {
                    author: Some("octocat".to_string())
                }
            }
        );
    }

    #[test]
    fn test_allowed_author_is_planned() {
        let mut settings = settings();
        settings.allowed_users = vec!["hubot".to_string(), "octocat".to_string()];
        let pipeline = pipeline(settings, &[("big", 10_000)]);

        let outcome = pipeline
            .plan(&change_set(vec![ChangedFile::new("a.rs", Some("+x"))]))
            .unwrap();
        assert!(matches!(outcome, PlanOutcome::Ready(_)));
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::AuthorNotAllowed {
            author: Some("octocat".to_string()),
        };
        assert_eq!(
            reason.to_string(),
            "pull request author octocat is not allowed to trigger this action"
        );
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let json = serde_json::to_value(PlanOutcome::Skipped {
            reason: SkipReason::ExistingDescription,
        })
        .unwrap();
        assert_eq!(json["outcome"], "skipped");
        assert_eq!(json["reason"], "existing_description");
    }
}
