//! Candidate lender validation
//!
//! Matches a raw extracted organization name against the registry through
//! three ordered stages, first success wins:
//! 1. Alias stage: alias text contained in the normalized candidate
//! 2. Known-list stage: bidirectional substring against normalized
//!    canonical names
//! 3. Fuzzy stage: best similarity ratio against the normalized canonical
//!    list, accepted at or above the configured threshold
//!
//! Names that fail every stage are recorded in the shared unmatched-name
//! set and route the filing to manual review.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::normalizer::normalize;
use crate::registry::LenderRegistry;

/// Shared, batch-scoped set of raw names that failed validation.
///
/// Cloning produces a handle to the same underlying set so concurrent
/// workers can record into it. The set is cleared at each batch boundary
/// and exported sorted and deduplicated.
#[derive(Debug, Clone, Default)]
pub struct UnmatchedNames {
    inner: Arc<Mutex<BTreeSet<String>>>,
}

impl UnmatchedNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raw (unnormalized) name that failed validation.
    pub fn record(&self, raw_name: &str) {
        self.inner
            .lock()
            .expect("unmatched set lock poisoned")
            .insert(raw_name.to_string());
    }

    /// Clear the set at a batch boundary.
    pub fn clear(&self) {
        self.inner
            .lock()
            .expect("unmatched set lock poisoned")
            .clear();
    }

    /// Export the current contents, sorted and deduplicated.
    pub fn export(&self) -> Vec<String> {
        self.inner
            .lock()
            .expect("unmatched set lock poisoned")
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("unmatched set lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Validates raw candidate names against the known-lender registry.
pub struct Validator {
    registry: Arc<LenderRegistry>,
    fuzzy_threshold: f64,
    unmatched: UnmatchedNames,
}

impl Validator {
    pub fn new(registry: Arc<LenderRegistry>, fuzzy_threshold: f64, unmatched: UnmatchedNames) -> Self {
        Self {
            registry,
            fuzzy_threshold,
            unmatched,
        }
    }

    /// Resolve a raw name to a canonical lender, or record it as unmatched.
    ///
    /// Stage order is a strict priority and the first satisfying registry
    /// entry wins within each stage; this keeps output deterministic for a
    /// fixed registry.
    pub fn validate(&self, raw_name: &str) -> Option<String> {
        let normalized = normalize(raw_name);

        // Stage 1: alias containment. Alias keys are matched as written
        // against the normalized candidate.
        for (alias, canonical) in self.registry.aliases() {
            if normalized.contains(alias.as_str()) {
                debug!("'{}' matched alias '{}' -> {}", raw_name, alias, canonical);
                return Some(canonical.clone());
            }
        }

        // Stage 2: bidirectional substring against the normalized known list.
        for (known, normalized_known) in self
            .registry
            .known_lenders()
            .iter()
            .zip(self.registry.normalized_known())
        {
            if normalized.contains(normalized_known.as_str())
                || normalized_known.contains(normalized.as_str())
            {
                debug!("'{}' matched known lender {}", raw_name, known);
                return Some(known.clone());
            }
        }

        // Stage 3: fuzzy best match. Earlier entries win ties.
        let mut best: Option<(usize, f64)> = None;
        for (idx, normalized_known) in self.registry.normalized_known().iter().enumerate() {
            let ratio = strsim::normalized_levenshtein(&normalized, normalized_known);
            if best.map_or(true, |(_, best_ratio)| ratio > best_ratio) {
                best = Some((idx, ratio));
            }
        }
        if let Some((idx, ratio)) = best {
            if ratio >= self.fuzzy_threshold {
                let known = &self.registry.known_lenders()[idx];
                debug!("'{}' fuzzy-matched {} (ratio {:.3})", raw_name, known, ratio);
                return Some(known.clone());
            }
        }

        debug!("'{}' did not match any known lender", raw_name);
        self.unmatched.record(raw_name);
        None
    }

    /// Handle to the shared unmatched-name set.
    pub fn unmatched(&self) -> &UnmatchedNames {
        &self.unmatched
    }
}
