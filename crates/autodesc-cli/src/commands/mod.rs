// SPDX-License-Identifier: Apache-2.0

//! Command handlers for the autodesc CLI.

pub mod describe;
pub mod models;
pub mod types;

use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::{Commands, OutputContext};
use crate::output;
use autodesc_core::AppConfig;

/// Creates a styled spinner (only if interactive).
fn maybe_spinner(ctx: &OutputContext, message: &str) -> Option<ProgressBar> {
    if ctx.is_interactive() {
        let s = ProgressBar::new_spinner();
        s.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid spinner template"),
        );
        s.set_message(message.to_string());
        s.enable_steady_tick(Duration::from_millis(100));
        Some(s)
    } else {
        None
    }
}

/// Dispatch to the appropriate command handler.
pub async fn run(command: Commands, ctx: &OutputContext, config: AppConfig) -> Result<()> {
    match command {
        Commands::Describe(args) => {
            let mut config = config;
            describe::apply_overrides(&mut config, &args)?;
            let result = describe::run(args, ctx, &config).await?;
            output::render(&result, ctx)
        }
        Commands::Models(args) => {
            let result = models::run(&args, &config)?;
            output::render(&result, ctx)
        }
    }
}
