// SPDX-License-Identifier: Apache-2.0

//! Named-slot prompt templates.
//!
//! A slot is written `{{name}}` (surrounding spaces allowed). Rendering
//! replaces slots only, so a value that happens to appear elsewhere in the
//! text is left alone.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static SLOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("slot pattern is a valid regex")
});

/// Text with `{{name}}` slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    /// Wraps template text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Slot names in order of first appearance.
    #[must_use]
    pub fn slots(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for caps in SLOT.captures_iter(&self.text) {
            if let Some(name) = caps.get(1).map(|m| m.as_str())
                && !names.contains(&name)
            {
                names.push(name);
            }
        }
        names
    }

    /// Whether the template declares the named slot.
    #[must_use]
    pub fn has_slot(&self, name: &str) -> bool {
        self.slots().contains(&name)
    }

    /// Fills slots from `values`. Slots without a value are kept verbatim.
    #[must_use]
    pub fn render(&self, values: &BTreeMap<&str, &str>) -> String {
        SLOT.replace_all(&self.text, |caps: &Captures<'_>| {
            let name = caps.get(1).map_or("", |m| m.as_str());
            match values.get(name) {
                Some(value) => (*value).to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
    }

    /// Raw template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}
