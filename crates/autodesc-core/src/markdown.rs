// SPDX-License-Identifier: Apache-2.0

//! Markdown to plain text conversion for prompt fragments.
//!
//! Fenced code blocks (```` ``` ```` or `~~~`) lose their delimiters and info
//! string but keep their body; prose around them is kept verbatim. This is a
//! best-effort extractor, not a markdown parser.

use std::sync::LazyLock;

use regex::Regex;

/// A fenced block: three identical fence characters, an optional info string,
/// a line break, then the body up to the first matching close.
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[^\n]*\n(.*?)```|~~~[^\n]*\n(.*?)~~~")
        .expect("fenced block pattern is a valid regex")
});

/// Converts a markdown document into plain text.
///
/// Segments are concatenated in document order. An opening fence without a
/// matching close is left as ordinary text, and fence characters inside a
/// block are not re-parsed (the first close wins).
#[must_use]
pub fn extract(markdown: &str) -> String {
    let mut text = String::with_capacity(markdown.len());
    let mut cursor = 0;

    for caps in FENCED_BLOCK.captures_iter(markdown) {
        let Some(block) = caps.get(0) else {
            continue;
        };
        text.push_str(&markdown[cursor..block.start()]);
        if let Some(body) = caps.get(1).or_else(|| caps.get(2)) {
            text.push_str(body.as_str());
        }
        cursor = block.end();
    }

    text.push_str(&markdown[cursor..]);
    text
}
