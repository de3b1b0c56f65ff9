//! Per-filing processing
//!
//! Composes fetch -> snippet selection -> entity extraction -> validation
//! for one filing path. Every failure in that chain is caught here: the
//! filing's outcome degenerates to empty results with the error message as
//! its review reason, and the error never reaches the batch orchestrator.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, error};

use crate::extractor::{Candidate, EntityExtractor};
use crate::filing_cache::FilingCache;
use crate::snippet::SnippetSelector;
use crate::validator::Validator;

/// Result of processing one filing.
#[derive(Debug, Clone, Default)]
pub struct FilingOutcome {
    /// Raw candidates in extraction order, duplicates kept
    pub raw: Vec<Candidate>,
    /// Canonical names in extraction order, duplicates kept
    pub validated: Vec<String>,
    /// "name (conf: score)" per failed candidate, or the error message if
    /// processing failed outright
    pub review_reason: String,
}

pub struct RowProcessor {
    cache: Arc<FilingCache>,
    selector: SnippetSelector,
    extractor: EntityExtractor,
    validator: Validator,
}

impl RowProcessor {
    pub fn new(
        cache: Arc<FilingCache>,
        selector: SnippetSelector,
        extractor: EntityExtractor,
        validator: Validator,
    ) -> Self {
        Self {
            cache,
            selector,
            extractor,
            validator,
        }
    }

    /// Process one filing. Infallible by contract: failures are folded into
    /// the outcome.
    pub async fn process(&self, filing_path: &str) -> FilingOutcome {
        match self.try_process(filing_path).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Failed to process {}: {:#}", filing_path, e);
                FilingOutcome {
                    raw: Vec::new(),
                    validated: Vec::new(),
                    review_reason: format!("{:#}", e),
                }
            }
        }
    }

    async fn try_process(&self, filing_path: &str) -> Result<FilingOutcome> {
        let html = self.cache.fetch(filing_path).await?;
        let snippets = self.selector.select(&html);
        debug!("{}: {} snippet(s)", filing_path, snippets.len());

        let raw = self
            .extractor
            .extract(&snippets)
            .with_context(|| format!("entity extraction failed for {}", filing_path))?;

        let mut validated = Vec::new();
        let mut review_reasons = Vec::new();
        for candidate in &raw {
            match self.validator.validate(&candidate.name) {
                Some(canonical) => validated.push(canonical),
                None => review_reasons.push(format!(
                    "{} (conf: {})",
                    candidate.name, candidate.confidence
                )),
            }
        }

        Ok(FilingOutcome {
            raw,
            validated,
            review_reason: review_reasons.join("; "),
        })
    }
}
