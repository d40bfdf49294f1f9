// SPDX-License-Identifier: Apache-2.0

//! Autodesc - AI-written pull request descriptions.
//!
//! Fetches the diffs of a pull request, asks a chat completion model for a
//! summary sized to fit its context window, and writes the summary back as
//! the pull request description.

mod cli;
mod commands;
mod errors;
mod logging;
mod output;
mod provider;

use std::process::ExitCode;

use anyhow::Context;
use autodesc_core::config;
use clap::Parser;
use tracing::debug;

use crate::cli::{Cli, OutputContext};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let output_ctx = OutputContext::from_cli(cli.output, cli.quiet, cli.verbose);

    let result = match config::load_config_from(cli.config.as_deref())
        .context("Failed to load configuration")
    {
        Ok(config) => {
            debug!("Configuration loaded successfully");
            commands::run(cli.command, &output_ctx, config).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", errors::format_error(&e));
            ExitCode::FAILURE
        }
    }
}
