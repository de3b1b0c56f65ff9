//! End-to-end extraction pipeline tests against a mock filing archive.

mod common;

use common::{build_processor, mock_failing_filing, mock_filing, NameListRecognizer};
use wiremock::MockServer;

#[tokio::test]
async fn test_credit_agreement_scenario_resolves_wells_fargo() {
    let server = MockServer::start().await;
    mock_filing(
        &server,
        "edgar/data/100/agreement.htm",
        r#"<html><body>
            <h1>EXHIBIT 10.1</h1>
            <p>This Credit Agreement, dated as of March 3, 2006, is entered
            into between Wells Fargo Bank and the Borrower named herein.</p>
        </body></html>"#,
    )
    .await;

    let recognizer = NameListRecognizer::new(&[("Wells Fargo Bank", 0.9983)]);
    let (processor, unmatched) = build_processor(&server, recognizer);

    let outcome = processor.process("edgar/data/100/agreement.htm").await;

    assert!(!outcome.raw.is_empty());
    assert!(outcome.raw.iter().all(|c| c.name == "Wells Fargo Bank"));
    assert_eq!(outcome.raw[0].confidence, 0.998);
    assert!(outcome.validated.iter().all(|v| v == "Wells Fargo"));
    assert!(outcome.review_reason.is_empty());
    assert!(unmatched.is_empty());
}

#[tokio::test]
async fn test_blacklisted_entity_never_reaches_validation() {
    let server = MockServer::start().await;
    mock_filing(
        &server,
        "edgar/data/101/notes.htm",
        "<p>Per the Credit Agreement, FASB and the U.S. Financial Accounting \
         Standards Board issued guidance to Comerica Bank.</p>",
    )
    .await;

    let recognizer = NameListRecognizer::new(&[
        ("FASB", 0.91),
        ("U.S. Financial Accounting Standards Board", 0.88),
        ("Comerica Bank", 0.95),
    ]);
    let (processor, unmatched) = build_processor(&server, recognizer);

    let outcome = processor.process("edgar/data/101/notes.htm").await;

    // Blacklisted surfaces are dropped at the extractor stage, so they are
    // neither raw candidates nor recorded as unmatched
    assert!(outcome.raw.iter().all(|c| c.name == "Comerica Bank"));
    assert!(outcome.validated.iter().all(|v| v == "Comerica"));
    assert!(unmatched.is_empty());
}

#[tokio::test]
async fn test_document_without_key_phrase_still_scanned() {
    let server = MockServer::start().await;
    mock_filing(
        &server,
        "edgar/data/102/plain.htm",
        "<p>Annual report discussing operations with Citizens Bank.</p>",
    )
    .await;

    let recognizer = NameListRecognizer::new(&[("Citizens Bank", 0.93)]);
    let (processor, _) = build_processor(&server, recognizer.clone());

    let outcome = processor.process("edgar/data/102/plain.htm").await;

    // No key phrase: exactly one degenerate snippet holding the whole text
    assert_eq!(recognizer.call_count(), 1);
    assert_eq!(outcome.validated, vec!["Citizens Bank"]);
}

#[tokio::test]
async fn test_unmatched_name_routes_to_manual_review() {
    let server = MockServer::start().await;
    mock_filing(
        &server,
        "edgar/data/103/loan.htm",
        "<p>Term Loan provided by Frontier Valley Bank to the Company.</p>",
    )
    .await;

    let recognizer = NameListRecognizer::new(&[("Frontier Valley Bank", 0.912)]);
    let (processor, unmatched) = build_processor(&server, recognizer);

    let outcome = processor.process("edgar/data/103/loan.htm").await;

    assert!(outcome.validated.is_empty());
    assert_eq!(outcome.review_reason, "Frontier Valley Bank (conf: 0.912)");
    assert_eq!(unmatched.export(), vec!["Frontier Valley Bank".to_string()]);
}

#[tokio::test]
async fn test_fetch_failure_yields_error_outcome_not_panic() {
    let server = MockServer::start().await;
    mock_failing_filing(&server, "edgar/data/104/gone.htm", 403).await;

    let recognizer = NameListRecognizer::new(&[]);
    let (processor, unmatched) = build_processor(&server, recognizer);

    let outcome = processor.process("edgar/data/104/gone.htm").await;

    assert!(outcome.raw.is_empty());
    assert!(outcome.validated.is_empty());
    assert!(outcome.review_reason.contains("403"));
    assert!(unmatched.is_empty());
}

#[tokio::test]
async fn test_multiple_key_phrases_duplicate_candidates() {
    let server = MockServer::start().await;
    // "Credit Agreement" and "between" each contribute a window covering
    // the same sentence, so the candidate appears once per window
    mock_filing(
        &server,
        "edgar/data/105/dup.htm",
        "<p>Credit Agreement between Wells Fargo Bank and the Borrower.</p>",
    )
    .await;

    let recognizer = NameListRecognizer::new(&[("Wells Fargo Bank", 0.99)]);
    let (processor, _) = build_processor(&server, recognizer.clone());

    let outcome = processor.process("edgar/data/105/dup.htm").await;

    assert_eq!(recognizer.call_count(), 2);
    assert_eq!(outcome.raw.len(), 2);
    assert_eq!(outcome.validated, vec!["Wells Fargo", "Wells Fargo"]);
}
