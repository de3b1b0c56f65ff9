//! Organization name normalization
//!
//! Reduces free-text lender names to a canonical comparison form:
//! - Lowercases everything
//! - Strips punctuation (anything that is not a word character or whitespace)
//! - Removes legal-entity suffix tokens: Inc, LLC, Ltd, PLC, N.A., Corp, etc.
//! - Collapses whitespace runs to single spaces
//!
//! The result is only used for matching, never for display. Canonical
//! display names come from the registry.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

static LEGAL_SUFFIXES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(inc|llc|ltd|plc|na|sa|corp|corporation|company|associates?)\b")
        .expect("valid regex")
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalize an organization name for comparison.
///
/// Pure and idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    let without_suffixes = LEGAL_SUFFIXES.replace_all(&stripped, "");
    WHITESPACE
        .replace_all(&without_suffixes, " ")
        .trim()
        .to_string()
}
