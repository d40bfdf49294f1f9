// SPDX-License-Identifier: Apache-2.0

use console::style;
use std::io::{self, Write};

use crate::cli::OutputContext;
use crate::commands::types::ModelsResult;

use super::Renderable;

impl Renderable for ModelsResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w)?;
        writeln!(w, "{}", style("Models, in selection order:").bold())?;
        writeln!(w)?;

        if self.models.is_empty() {
            writeln!(w, "  {}", style("No models configured").dim())?;
        } else {
            for (i, model) in self.models.iter().enumerate() {
                let num = format!("{:>3}.", i + 1);
                let id = format!("{:<30}", model.id);
                let window = format!("{:>8} tokens", model.context_window);
                let prompt = model.max_prompt_tokens.map_or_else(
                    || style("too small for the response".to_string()).red().to_string(),
                    |p| style(format!("prompt up to {p}")).dim().to_string(),
                );
                writeln!(
                    w,
                    "  {} {} {} {}",
                    style(num).dim(),
                    style(id).cyan(),
                    style(window).yellow(),
                    prompt
                )?;
            }
        }

        writeln!(w)?;
        writeln!(
            w,
            "  {}",
            style(format!(
                "{} tokens reserved for each response",
                self.max_response_tokens
            ))
            .dim()
        )?;
        Ok(())
    }
}
