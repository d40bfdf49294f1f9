// SPDX-License-Identifier: Apache-2.0

//! End-to-end planning tests over the public API.

use std::collections::BTreeMap;

use autodesc_core::budget::tokens::{TOKENS_PER_MESSAGE, TOKENS_PER_REPLY};
use autodesc_core::{
    AppConfig, ChangeSet, ChangedFile, ModelCatalog, Pipeline, PipelineState, PlanOutcome,
    PromptSettings, ResponseBudget, SkipReason, TokenEstimator, Tokenizer,
};

/// One token per four bytes, rounded up.
struct QuarterTokenizer;

impl Tokenizer for QuarterTokenizer {
    fn encoding_name(&self) -> &str {
        "quarter"
    }

    fn count(&self, text: &str) -> usize {
        text.len().div_ceil(4)
    }
}

fn pipeline(models: &[(&str, u32)], file_types: &[&str]) -> Pipeline<QuarterTokenizer> {
    let mut config = AppConfig::default();
    config.prompt.file_types = file_types.iter().map(|s| (*s).to_string()).collect();

    let catalog: BTreeMap<String, u32> = models
        .iter()
        .map(|(m, w)| ((*m).to_string(), *w))
        .collect();

    Pipeline::builder()
        .settings(PromptSettings::from_config(&config))
        .catalog(ModelCatalog::new(catalog).unwrap())
        .budget(ResponseBudget::new(500, 0.8).unwrap())
        .temperature(0.2)
        .estimator(TokenEstimator::new(QuarterTokenizer))
        .build()
}

fn default_models() -> Vec<(&'static str, u32)> {
    vec![
        ("gpt-3.5-turbo", 4096),
        ("gpt-3.5-turbo-16k", 16384),
        ("gpt-4", 8192),
        ("gpt-4-32k", 32768),
    ]
}

fn change_set(files: Vec<ChangedFile>) -> ChangeSet {
    ChangeSet::builder()
        .title("Retry uploads on dropped connections")
        .author("octocat")
        .files(files)
        .build()
}

#[test]
fn one_matching_file_yields_one_block() {
    let pipeline = pipeline(&default_models(), &[".rs"]);
    let outcome = pipeline
        .plan(&change_set(vec![
            ChangedFile::new("src/upload.rs", Some("@@ -1 +1,2 @@\n+retry();")),
            ChangedFile::new("docs/upload.md", Some("@@ -1 +1 @@\n+Retries.")),
        ]))
        .unwrap();

    let (status, prompt) = outcome.status_and_prompt();
    assert_eq!(status, 0);
    assert_eq!(prompt.matches("Changes in file").count(), 1);
    assert!(prompt.contains("Changes in file src/upload.rs: \n@@ -1 +1,2 @@\n+retry();\n"));
    assert!(!prompt.contains("docs/upload.md"));
    assert!(prompt.contains("Retry uploads on dropped connections"));
}

#[test]
fn zero_matching_files_is_a_quiet_success() {
    let pipeline = pipeline(&default_models(), &[".rs"]);
    let outcome = pipeline
        .plan(&change_set(vec![
            ChangedFile::new("docs/upload.md", Some("+Retries.")),
            ChangedFile::new("assets/logo.rs", None::<String>),
        ]))
        .unwrap();

    assert_eq!(outcome.state(), PipelineState::NoFilesMatched);
    assert_eq!(outcome.status_and_prompt(), (0, ""));
}

#[test]
fn ready_plan_uses_smallest_fitting_model() {
    let pipeline = pipeline(&default_models(), &[]);
    let outcome = pipeline
        .plan(&change_set(vec![ChangedFile::new(
            "src/upload.rs",
            Some("+retry();"),
        )]))
        .unwrap();

    let PlanOutcome::Ready(plan) = outcome else {
        panic!("expected a plan");
    };
    assert_eq!(plan.model, "gpt-3.5-turbo");
    assert_eq!(plan.context_window, 4096);
    assert_eq!(plan.conversation.len(), 4);
    assert!(plan.prompt_tokens > 4 * TOKENS_PER_MESSAGE + TOKENS_PER_REPLY);

    // base 500 plus 80% of what the window leaves over
    let leftover = 4096 - plan.prompt_tokens - 500;
    assert_eq!(plan.response_tokens, 500 + leftover * 4 / 5);
}

#[test]
fn large_diff_moves_to_a_bigger_model() {
    let big_patch = "+".repeat(4 * 6000);
    let pipeline = pipeline(&default_models(), &[]);
    let outcome = pipeline
        .plan(&change_set(vec![ChangedFile::new(
            "src/generated.rs",
            Some(big_patch),
        )]))
        .unwrap();

    let PlanOutcome::Ready(plan) = outcome else {
        panic!("expected a plan");
    };
    assert_eq!(plan.model, "gpt-4");
}

#[test]
fn oversized_diff_fits_no_model() {
    let huge_patch = "+".repeat(4 * 40_000);
    let pipeline = pipeline(&default_models(), &[]);
    let outcome = pipeline
        .plan(&change_set(vec![ChangedFile::new(
            "src/generated.rs",
            Some(huge_patch),
        )]))
        .unwrap();

    assert_eq!(outcome.state(), PipelineState::NoModelFits);
    assert_eq!(outcome.status_code(), 1);
}

#[test]
fn existing_description_is_left_alone() {
    let pipeline = pipeline(&default_models(), &[]);
    let mut change_set = change_set(vec![ChangedFile::new("src/a.rs", Some("+a"))]);
    change_set.body = Some("Hand-written description".to_string());

    let outcome = pipeline.plan(&change_set).unwrap();
    assert_eq!(
        outcome,
        PlanOutcome::Skipped {
            reason: SkipReason::ExistingDescription
        }
    );
    assert_eq!(outcome.status_and_prompt(), (0, ""));
}

#[test]
fn builtin_fragments_render_the_title() {
    let pipeline = pipeline(&default_models(), &[]);
    let prompt = pipeline
        .build_completion_prompt(&change_set(vec![ChangedFile::new("a.rs", Some("+a"))]))
        .unwrap()
        .unwrap();

    assert!(!prompt.contains("{{"));
    assert!(!prompt.contains("```"));
    assert!(prompt.contains("\"Retry uploads on dropped connections\""));

    let sample = pipeline.settings().sample_prompt().unwrap();
    assert!(!sample.contains("{{"));
    assert!(sample.contains(&AppConfig::default().prompt.sample_title));
}
