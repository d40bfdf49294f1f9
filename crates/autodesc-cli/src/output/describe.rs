// SPDX-License-Identifier: Apache-2.0

use console::style;
use std::io::{self, Write};

use autodesc_core::DescribeOutcome;

use crate::cli::OutputContext;
use crate::commands::types::DescribeResult;

use super::Renderable;

impl Renderable for DescribeResult {
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        let target = format!("{}#{}", self.repo, self.number);
        match &self.outcome {
            DescribeOutcome::Skipped { reason } => {
                writeln!(
                    w,
                    "{} {target}: {reason}",
                    style("Skipped").yellow().bold()
                )?;
            }
            DescribeOutcome::NoFilesMatched => {
                writeln!(
                    w,
                    "{} {target}: no changed file matched the configured file types",
                    style("Nothing to describe").yellow().bold()
                )?;
            }
            DescribeOutcome::Planned(plan) => {
                writeln!(w, "{} {target}", style("Dry run").cyan().bold())?;
                writeln!(
                    w,
                    "  Model:    {} ({} token window)",
                    style(&plan.model).cyan(),
                    plan.context_window
                )?;
                writeln!(w, "  Prompt:   {} tokens", plan.prompt_tokens)?;
                writeln!(w, "  Response: {} tokens", plan.response_tokens)?;
                if ctx.verbose {
                    writeln!(w)?;
                    writeln!(w, "{}", plan.prompt())?;
                }
            }
            DescribeOutcome::Generated(generated) => {
                if !self.previewed {
                    writeln!(w)?;
                    writeln!(w, "{}", generated.description)?;
                    writeln!(w)?;
                }
                if generated.published {
                    writeln!(
                        w,
                        "{} {target} with {}",
                        style("Updated").green().bold(),
                        generated.model
                    )?;
                } else {
                    writeln!(w, "{} {target}", style("Not published").dim())?;
                }
                if ctx.verbose
                    && let Some(usage) = &generated.usage
                {
                    writeln!(
                        w,
                        "  {}",
                        style(format!(
                            "{} prompt + {} completion = {} tokens",
                            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
                        ))
                        .dim()
                    )?;
                }
            }
        }
        Ok(())
    }
}
