//! Shared helpers for integration tests: a mock filing archive and
//! deterministic recognizer stubs.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lenderfinder::extractor::EntityExtractor;
use lenderfinder::filing_cache::FilingCache;
use lenderfinder::ner::{EntityRecognizer, NerEntity};
use lenderfinder::processor::RowProcessor;
use lenderfinder::registry::LenderRegistry;
use lenderfinder::snippet::SnippetSelector;
use lenderfinder::validator::{UnmatchedNames, Validator};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mount a filing document at `/Archives/<filing_path>`.
pub async fn mock_filing(server: &MockServer, filing_path: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/Archives/{}", filing_path)))
        .respond_with(ResponseTemplate::new(200).set_body_string(html.to_string()))
        .mount(server)
        .await;
}

/// Mount a filing path that always fails with the given status.
pub async fn mock_failing_filing(server: &MockServer, filing_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/Archives/{}", filing_path)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Recognizer that reports any of its configured names found verbatim in
/// the text it is handed, and counts how many times it was invoked.
pub struct NameListRecognizer {
    names: Vec<(String, f32)>,
    calls: AtomicUsize,
}

impl NameListRecognizer {
    pub fn new(names: &[(&str, f32)]) -> Arc<Self> {
        Arc::new(Self {
            names: names
                .iter()
                .map(|(name, score)| (name.to_string(), *score))
                .collect(),
            calls: AtomicUsize::new(0),
        })
    }

    /// Number of `recognize` invocations so far (one per snippet).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EntityRecognizer for NameListRecognizer {
    fn recognize(&self, text: &str) -> anyhow::Result<Vec<NerEntity>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .names
            .iter()
            .filter(|(name, _)| text.contains(name.as_str()))
            .map(|(name, score)| NerEntity {
                label: "organization".to_string(),
                text: name.clone(),
                score: *score,
            })
            .collect())
    }
}

/// Build a full processing pipeline against the mock archive.
pub fn build_processor(
    server: &MockServer,
    recognizer: Arc<dyn EntityRecognizer>,
) -> (Arc<RowProcessor>, UnmatchedNames) {
    let registry = Arc::new(LenderRegistry::builtin());
    let cache = Arc::new(
        FilingCache::new(
            &format!("{}/Archives/", server.uri()),
            "lenderfinder-test/1.0",
            Duration::from_secs(5),
        )
        .expect("cache builds"),
    );
    let unmatched = UnmatchedNames::new();
    let processor = Arc::new(RowProcessor::new(
        cache,
        SnippetSelector::new(registry.clone(), 1000),
        EntityExtractor::new(registry.clone(), recognizer),
        Validator::new(registry, 0.90, unmatched.clone()),
    ));
    (processor, unmatched)
}
