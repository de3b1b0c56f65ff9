//! Snippet selection
//!
//! Narrows a full filing document down to the text windows most likely to
//! name a lender. Markup is stripped to visible text, then every
//! case-insensitive occurrence of each registry key phrase contributes one
//! window of up to `window_chars` characters on each side of the match,
//! clamped to the document bounds. Windows may overlap or repeat; nothing
//! is merged. A document with no key-phrase occurrence degenerates to a
//! single snippet holding the entire visible text.

use regex::{Regex, RegexBuilder};
use scraper::Html;
use std::sync::Arc;

use crate::registry::LenderRegistry;

pub struct SnippetSelector {
    phrases: Vec<Regex>,
    window_chars: usize,
}

impl SnippetSelector {
    pub fn new(registry: Arc<LenderRegistry>, window_chars: usize) -> Self {
        let phrases = registry
            .key_phrases()
            .iter()
            .map(|phrase| {
                RegexBuilder::new(&regex::escape(phrase))
                    .case_insensitive(true)
                    .build()
                    .expect("escaped phrase compiles")
            })
            .collect();
        Self {
            phrases,
            window_chars,
        }
    }

    /// Extract key-phrase windows from an HTML document.
    pub fn select(&self, document_html: &str) -> Vec<String> {
        let text = visible_text(document_html);
        let mut snippets = Vec::new();

        for phrase in &self.phrases {
            for found in phrase.find_iter(&text) {
                let start = window_start(&text, found.start(), self.window_chars);
                let end = window_end(&text, found.end(), self.window_chars);
                snippets.push(text[start..end].to_string());
            }
        }

        if snippets.is_empty() {
            snippets.push(text);
        }
        snippets
    }
}

/// Strip markup, joining text nodes with single spaces.
fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let parts: Vec<&str> = document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    parts.join(" ")
}

/// Byte index `chars` characters before `from`, clamped to the start of the
/// text and aligned to a char boundary.
fn window_start(text: &str, from: usize, chars: usize) -> usize {
    if chars == 0 {
        return from;
    }
    text[..from]
        .char_indices()
        .rev()
        .nth(chars - 1)
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

/// Byte index `chars` characters after `from`, clamped to the end of the
/// text and aligned to a char boundary.
fn window_end(text: &str, from: usize, chars: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(chars)
        .map(|(idx, _)| from + idx)
        .unwrap_or(text.len())
}
