// SPDX-License-Identifier: Apache-2.0

//! Prompt fragments: named markdown sources resolved to plain text.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AutodescError;
use crate::markdown;

/// Built-in fragments compiled into the binary.
pub mod builtin {
    /// Who the assistant is writing for.
    pub const USER: &str = include_str!("../../prompts/prompt/user.md");
    /// What to write.
    pub const COMMAND: &str = include_str!("../../prompts/prompt/command.md");
    /// Output format rules.
    pub const FORMAT: &str = include_str!("../../prompts/prompt/format.md");
    /// Title sentence with a `{{title}}` slot.
    pub const TITLE: &str = include_str!("../../prompts/prompt/title.md");
    /// Sample unified diff used in the example prompt.
    pub const UNIFIED_CHANGE: &str = include_str!("../../prompts/prompt/unified_change.md");
    /// Sample description answering the example prompt.
    pub const RESPONSE: &str = include_str!("../../prompts/response/response.md");
}

/// Where a fragment's markdown comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentSource {
    /// Markdown embedded in the binary.
    Builtin(&'static str),
    /// Markdown file read at resolve time.
    File(PathBuf),
}

/// A named markdown source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Fragment name (`user`, `command`, ...).
    pub name: String,
    /// Markdown source.
    pub source: FragmentSource,
}

impl Fragment {
    /// Creates a fragment backed by embedded markdown.
    #[must_use]
    pub fn builtin(name: impl Into<String>, markdown: &'static str) -> Self {
        Self {
            name: name.into(),
            source: FragmentSource::Builtin(markdown),
        }
    }

    /// Creates a fragment backed by a markdown file.
    #[must_use]
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: FragmentSource::File(path.into()),
        }
    }

    /// Reads the markdown and converts it to plain text.
    pub fn resolve(&self) -> Result<String, AutodescError> {
        match &self.source {
            FragmentSource::Builtin(markdown) => Ok(markdown::extract(markdown)),
            FragmentSource::File(path) => {
                let raw =
                    std::fs::read_to_string(path).map_err(|source| AutodescError::Fragment {
                        name: self.name.clone(),
                        path: path.clone(),
                        source,
                    })?;
                Ok(markdown::extract(&raw))
            }
        }
    }
}

/// The fixed set of fragments the prompts are built from.
#[derive(Debug, Clone)]
pub struct FragmentLibrary {
    /// Audience and role.
    pub user: Fragment,
    /// Task instruction.
    pub command: Fragment,
    /// Output format rules.
    pub format: Fragment,
    /// Title sentence.
    pub title: Fragment,
    /// Example diff.
    pub unified_change: Fragment,
    /// Example description.
    pub response: Fragment,
}

impl Default for FragmentLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FragmentLibrary {
    /// Library made only of built-in fragments.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            user: Fragment::builtin("user", builtin::USER),
            command: Fragment::builtin("command", builtin::COMMAND),
            format: Fragment::builtin("format", builtin::FORMAT),
            title: Fragment::builtin("title", builtin::TITLE),
            unified_change: Fragment::builtin("unified_change", builtin::UNIFIED_CHANGE),
            response: Fragment::builtin("response", builtin::RESPONSE),
        }
    }

    /// Library reading `prompt/<name>.md` and `response/response.md` under `dir`.
    ///
    /// Files missing from `dir` fall back to the built-in fragment of the same name.
    #[must_use]
    pub fn from_dir(dir: &Path) -> Self {
        let pick = |subdir: &str, name: &str, fallback: &'static str| {
            let path = dir.join(subdir).join(format!("{name}.md"));
            if path.is_file() {
                Fragment::file(name, path)
            } else {
                debug!(fragment = name, path = %path.display(), "Fragment file not found, using built-in");
                Fragment::builtin(name, fallback)
            }
        };

        Self {
            user: pick("prompt", "user", builtin::USER),
            command: pick("prompt", "command", builtin::COMMAND),
            format: pick("prompt", "format", builtin::FORMAT),
            title: pick("prompt", "title", builtin::TITLE),
            unified_change: pick("prompt", "unified_change", builtin::UNIFIED_CHANGE),
            response: pick("response", "response", builtin::RESPONSE),
        }
    }

    /// Fragments of the example prompt, in concatenation order.
    #[must_use]
    pub fn sample_prompt(&self) -> Vec<Fragment> {
        vec![
            self.user.clone(),
            self.command.clone(),
            self.format.clone(),
            self.title.clone(),
            self.unified_change.clone(),
        ]
    }

    /// Fragments of the example response.
    #[must_use]
    pub fn sample_response(&self) -> Vec<Fragment> {
        vec![self.response.clone()]
    }

    /// Fragments of the real completion prompt, preceding the changed files.
    #[must_use]
    pub fn completion_prompt(&self) -> Vec<Fragment> {
        vec![
            self.user.clone(),
            self.command.clone(),
            self.format.clone(),
            self.title.clone(),
        ]
    }
}
