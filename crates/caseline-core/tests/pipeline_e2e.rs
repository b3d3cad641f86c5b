//! End-to-end pipeline tests with a stub PDF backend and a scripted
//! completion mock.

use caseline_core::llm::{MockCompletion, MockResponse};
use caseline_core::pipeline::{RawDocument, process_project};
use caseline_core::{LlmConfig, PdfError, PdfTextBackend};

/// PDF backend that "extracts" the bytes as UTF-8 text, so tests can feed
/// plain strings in place of real PDFs.
struct StubPdf;

impl PdfTextBackend for StubPdf {
    fn extract_text(&self, data: &[u8]) -> Result<String, PdfError> {
        String::from_utf8(data.to_vec()).map_err(|e| PdfError::ExtractionError(e.to_string()))
    }
}

fn raw(name: &str, text: &str) -> RawDocument {
    RawDocument {
        filename: name.to_string(),
        data: text.as_bytes().to_vec(),
    }
}

#[tokio::test]
async fn outline_and_one_readable_pdf_produce_timeline_and_narrative() {
    let mock = MockCompletion::with_sequence(vec![
        MockResponse::Text("## Events\n- **Jan 5**: motion granted".into()),
        MockResponse::Text("## Background\nThe case began...".into()),
    ]);
    let cfg = LlmConfig::default();

    let outline = b"Filed complaint\nServed defendant";
    let docs = vec![raw("motion.pdf", "Motion granted on Jan 5")];

    let output = process_project(&mock, &StubPdf, &cfg, outline, &docs)
        .await
        .unwrap();

    let bullets: Vec<&str> = output
        .timeline
        .lines()
        .filter(|l| l.starts_with("- "))
        .collect();
    assert_eq!(bullets, vec!["- Filed complaint", "- Served defendant"]);

    assert!(!output.narrative.is_empty());
    assert!(output.document_failures.is_empty());

    // One summary call, one narrative call; the narrative prompt carries
    // the timeline and the labeled summary.
    assert_eq!(mock.call_count(), 2);
    let final_prompt = mock.prompts().last().unwrap().clone();
    assert!(final_prompt.contains("# Timeline of Events"));
    assert!(final_prompt.contains("Document 1:"));
}

#[tokio::test]
async fn empty_extraction_documents_are_excluded_from_the_prompt() {
    let mock = MockCompletion::new(MockResponse::Text("text".into()));
    let cfg = LlmConfig::default();

    let docs = vec![
        raw("one.pdf", "readable"),
        raw("two.pdf", ""),
        raw("three.pdf", "also readable"),
    ];

    let output = process_project(&mock, &StubPdf, &cfg, b"event", &docs)
        .await
        .unwrap();
    assert!(output.document_failures.is_empty());

    let final_prompt = mock.prompts().last().unwrap().clone();
    assert!(final_prompt.contains("Document 1:"));
    assert!(final_prompt.contains("Document 2:"));
    assert!(!final_prompt.contains("Document 3:"));
}

#[tokio::test]
async fn summarizer_failure_degrades_instead_of_aborting() {
    let mock = MockCompletion::with_sequence(vec![
        MockResponse::Error("auth failure".into()),
        MockResponse::Text("narrative despite failure".into()),
    ]);
    let cfg = LlmConfig::default();

    let docs = vec![raw("bad.pdf", "text that will fail to summarize")];
    let output = process_project(&mock, &StubPdf, &cfg, b"event", &docs)
        .await
        .unwrap();

    assert_eq!(output.narrative, "narrative despite failure");
    assert_eq!(output.document_failures, vec!["bad.pdf".to_string()]);
}

#[tokio::test]
async fn reprocessing_regenerates_both_artifacts_from_scratch() {
    let cfg = LlmConfig::default();
    let outline = b"Filed complaint";
    let docs = vec![raw("a.pdf", "text")];

    let first = MockCompletion::with_sequence(vec![
        MockResponse::Text("summary v1".into()),
        MockResponse::Text("narrative v1".into()),
    ]);
    let second = MockCompletion::with_sequence(vec![
        MockResponse::Text("summary v2".into()),
        MockResponse::Text("narrative v2".into()),
    ]);

    let run1 = process_project(&first, &StubPdf, &cfg, outline, &docs)
        .await
        .unwrap();
    let run2 = process_project(&second, &StubPdf, &cfg, outline, &docs)
        .await
        .unwrap();

    // The timeline is deterministic; the narrative reflects the new run.
    assert_eq!(run1.timeline, run2.timeline);
    assert_eq!(run2.narrative, "narrative v2");
}
