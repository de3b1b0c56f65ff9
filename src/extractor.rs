//! Candidate entity extraction
//!
//! Runs the injected NER backend over each snippet and keeps only the
//! entities that plausibly name a lender: organization-labeled spans whose
//! lowercased surface matches at least one registry keyword pattern and is
//! not blacklisted. Confidence scores are rounded to 3 decimals for
//! reporting. Result order follows snippet order, then in-snippet entity
//! order; duplicates across snippets are preserved.

use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

use crate::ner::EntityRecognizer;
use crate::registry::LenderRegistry;

/// A raw candidate lender name with its reported confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub confidence: f32,
}

pub struct EntityExtractor {
    registry: Arc<LenderRegistry>,
    recognizer: Arc<dyn EntityRecognizer>,
}

impl EntityExtractor {
    pub fn new(registry: Arc<LenderRegistry>, recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self {
            registry,
            recognizer,
        }
    }

    /// Extract lender-relevant candidates from a sequence of snippets.
    pub fn extract(&self, snippets: &[String]) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();

        for snippet in snippets {
            for entity in self.recognizer.recognize(snippet)? {
                if !is_organization(&entity.label) {
                    continue;
                }
                let name = entity.text.trim();
                if name.is_empty() {
                    continue;
                }
                let lowered = name.to_lowercase();
                if !self.registry.matches_keyword(&lowered) {
                    debug!("Dropping '{}': no lender keyword", name);
                    continue;
                }
                if self.registry.is_blacklisted(&lowered) {
                    debug!("Dropping '{}': blacklisted", name);
                    continue;
                }
                candidates.push(Candidate {
                    name: name.to_string(),
                    confidence: round3(entity.score),
                });
            }
        }

        Ok(candidates)
    }
}

fn is_organization(label: &str) -> bool {
    label.eq_ignore_ascii_case("organization") || label.eq_ignore_ascii_case("org")
}

fn round3(score: f32) -> f32 {
    (score * 1000.0).round() / 1000.0
}
