// SPDX-License-Identifier: Apache-2.0

//! Prompt assembly from fragments.

use std::collections::BTreeMap;

use super::fragment::Fragment;
use super::template::PromptTemplate;
use crate::error::AutodescError;

/// Slot holding the pull request title.
pub const TITLE_SLOT: &str = "title";

/// Concatenates fragments in order.
///
/// Each fragment is resolved to plain text, trimmed, and followed by a blank
/// line. An empty slice yields an empty string.
pub fn combine(fragments: &[Fragment]) -> Result<String, AutodescError> {
    let mut prompt = String::new();
    for fragment in fragments {
        prompt.push_str(fragment.resolve()?.trim());
        prompt.push_str("\n\n");
    }
    Ok(prompt)
}

/// Concatenates fragments like [`combine`], filling the title fragment with
/// `title` on the way.
pub fn combine_with_title(fragments: &[Fragment], title: &str) -> Result<String, AutodescError> {
    let mut prompt = String::new();
    for fragment in fragments {
        let text = fragment.resolve()?;
        if fragment.name == TITLE_SLOT {
            prompt.push_str(&render_title(text.trim(), title));
        } else {
            prompt.push_str(text.trim());
        }
        prompt.push_str("\n\n");
    }
    Ok(prompt)
}

/// Replaces the first word of the first double-quoted span with `real_title`.
///
/// Every literal occurrence of that word in `template` is replaced, including
/// occurrences outside the quotes. Returns the template unchanged when there
/// is no complete quoted span or the span is blank.
#[must_use]
pub fn substitute_title(template: &str, real_title: &str) -> String {
    match first_quoted_word(template) {
        Some(placeholder) => template.replace(placeholder, real_title),
        None => template.to_string(),
    }
}

fn first_quoted_word(text: &str) -> Option<&str> {
    let (_, after_open) = text.split_once('"')?;
    let (quoted, _) = after_open.split_once('"')?;
    quoted.split_whitespace().next()
}

/// Fills the title sentence with the real title.
///
/// Templates declaring a `{{title}}` slot are rendered by name; anything else
/// goes through [`substitute_title`].
#[must_use]
pub fn render_title(template: &str, real_title: &str) -> String {
    let template = PromptTemplate::new(template);
    if template.has_slot(TITLE_SLOT) {
        template.render(&BTreeMap::from([(TITLE_SLOT, real_title)]))
    } else {
        substitute_title(template.as_str(), real_title)
    }
}
