//! Integration tests for the [`TopicExtractor`] loop.
//!
//! All tests run against the scripted [`MockLlm`], so no HTTP requests are made.

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use topicsift_core::llm::mock::{MockLlm, MockResponse};
use topicsift_core::{
    ErrorKind, ExtractError, ExtractionSettings, Importance, LlmError, PageSource, ProgressEvent,
    SourceError, TextFileSource, TopicExtractor,
};

fn topic(title: &str, contents: &[&str], importance: &str) -> Value {
    json!({
        "id": title.to_lowercase().replace(' ', "_"),
        "topic": title,
        "contents": contents,
        "goal": format!("Understand {title}"),
        "importance": importance,
    })
}

fn answer(topics: Vec<Value>) -> MockResponse {
    MockResponse::Json(json!({ "topics": topics }))
}

fn empty() -> MockResponse {
    MockResponse::Json(json!({ "topics": [] }))
}

fn extractor(mock: &Arc<MockLlm>) -> TopicExtractor {
    TopicExtractor::new(mock.clone(), ExtractionSettings::default())
}

fn chunks(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("chunk {i}")).collect()
}

#[tokio::test]
async fn performs_exactly_one_step_per_chunk() {
    for n in [1, 2, 5, 17] {
        let mock = Arc::new(MockLlm::new(empty()));
        let topics = extractor(&mock).run(None, chunks(n)).await.unwrap();
        assert!(topics.is_empty());
        assert_eq!(mock.call_count(), n);
    }
}

#[tokio::test]
async fn empty_document_makes_no_calls() {
    let mock = Arc::new(MockLlm::new(empty()));
    let topics = extractor(&mock).run(Some("desc"), vec![]).await.unwrap();
    assert!(topics.is_empty());
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn topics_merge_across_chunks_in_discovery_order() {
    let mock = Arc::new(MockLlm::with_sequence(vec![
        answer(vec![topic("Gradient Descent", &["b"], "high")]),
        answer(vec![
            topic("Loss Functions", &["mse"], "medium"),
            topic("Gradient Descent", &["a"], "low"),
        ]),
        empty(),
    ]));
    let topics = extractor(&mock).run(None, chunks(3)).await.unwrap();

    let titles: Vec<&str> = topics.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Gradient Descent", "Loss Functions"]);
    assert_eq!(topics[0].contents, ["b", "a"]);
    assert_eq!(topics[0].importance, Importance::High);
    assert_eq!(topics[0].goal, "Understand Gradient Descent");
}

#[tokio::test]
async fn later_prompts_carry_earlier_titles_and_counts() {
    let mock = Arc::new(MockLlm::with_sequence(vec![
        answer(vec![topic("Intro", &["x", "y"], "high")]),
        answer(vec![topic("Methods", &["z"], "medium")]),
        empty(),
    ]));
    let input = vec!["first".to_string(), "second".to_string(), "third".to_string()];
    extractor(&mock)
        .run(Some("A paper on methods"), input)
        .await
        .unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 3);
    let users: Vec<&str> = requests.iter().map(|r| r.user.as_str()).collect();
    assert_eq!(users, ["first", "second", "third"]);

    assert!(requests[0].system.contains("0 content items"));
    assert!(requests[1].system.contains("Intro"));
    assert!(requests[1].system.contains("2 content items"));
    assert!(requests[2].system.contains("Intro, Methods"));
    assert!(requests[2].system.contains("3 content items"));
    assert!(requests.iter().all(|r| r.system.contains("A paper on methods")));
}

#[tokio::test]
async fn failure_mid_document_returns_no_topics() {
    let mock = Arc::new(MockLlm::with_sequence(vec![
        answer(vec![topic("One", &["a"], "high")]),
        answer(vec![topic("Two", &["b"], "high")]),
        MockResponse::Status(500),
        empty(),
    ]));
    let result = extractor(&mock).run(None, chunks(5)).await;

    match result {
        Err(ExtractError::ModelInvocation {
            chunk_index,
            source: LlmError::Status { status: 500, .. },
        }) => assert_eq!(chunk_index, 2),
        other => panic!("expected model failure on chunk 2, got {other:?}"),
    }
    // No further chunks were attempted.
    assert_eq!(mock.call_count(), 3);
}

#[tokio::test]
async fn schema_violation_is_a_model_failure() {
    let mock = Arc::new(MockLlm::with_sequence(vec![
        answer(vec![topic("One", &["a"], "high")]),
        MockResponse::Json(json!({ "topics": [{ "topic": "No fields" }] })),
    ]));
    let err = extractor(&mock).run(None, chunks(2)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModelInvocationFailure);
    assert!(matches!(
        err,
        ExtractError::ModelInvocation {
            source: LlmError::Schema(_),
            ..
        }
    ));
}

#[tokio::test]
async fn rate_limit_is_not_retried() {
    let mock = Arc::new(MockLlm::new(MockResponse::RateLimited { retry_after: None }));
    let err = extractor(&mock).run(None, chunks(3)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModelInvocationFailure);
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn progress_events_in_order() {
    let mock = Arc::new(MockLlm::with_sequence(vec![
        answer(vec![topic("A", &["1"], "high")]),
        answer(vec![topic("A", &["2"], "high"), topic("B", &["3"], "low")]),
    ]));
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    extractor(&mock)
        .run_with_progress(None, chunks(2), &move |e| sink.lock().unwrap().push(e))
        .await
        .unwrap();

    let events = events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            ProgressEvent::ChunkStarted { index: 0, total: 2 },
            ProgressEvent::ChunkFinished {
                index: 0,
                total: 2,
                inserted: 1,
                merged: 0
            },
            ProgressEvent::ChunkStarted { index: 1, total: 2 },
            ProgressEvent::ChunkFinished {
                index: 1,
                total: 2,
                inserted: 1,
                merged: 1
            },
            ProgressEvent::Finished {
                topics: 2,
                content_items: 3
            },
        ]
    );
}

#[tokio::test]
async fn short_pages_are_merged_before_the_loop() {
    let mock = Arc::new(MockLlm::new(empty()));
    let long = "word ".repeat(300);
    let pages = vec![long.clone(), "page 2".to_string(), "page 3".to_string(), long.clone()];
    extractor(&mock)
        .run_pages(None, pages, &|_| {})
        .await
        .unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].user, format!("{long}\npage 2\npage 3"));
    assert_eq!(requests[1].user, long);
}

#[tokio::test]
async fn extracts_from_text_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}\x0c{}", "alpha ".repeat(250), "beta ".repeat(250)).unwrap();

    let mock = Arc::new(MockLlm::with_sequence(vec![
        answer(vec![topic("Alpha", &["a"], "high")]),
        answer(vec![topic("Beta", &["b"], "low")]),
    ]));
    let topics = extractor(&mock)
        .extract_topics(file.path(), Some("greek letters"), &TextFileSource)
        .await
        .unwrap();
    assert_eq!(topics.len(), 2);
    assert_eq!(mock.call_count(), 2);
}

struct BrokenSource;

impl PageSource for BrokenSource {
    fn page_texts(&self, _path: &Path) -> Result<Vec<String>, SourceError> {
        Err(SourceError::Open("not a PDF".into()))
    }
}

#[tokio::test]
async fn unreadable_source_fails_before_any_call() {
    let mock = Arc::new(MockLlm::new(empty()));
    let err = extractor(&mock)
        .extract_topics(Path::new("broken.pdf"), None, &BrokenSource)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceUnreadable);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn concurrent_requests_do_not_share_topics() {
    let mock = Arc::new(MockLlm::new(answer(vec![topic("Shared Title", &["x"], "medium")])));
    let extractor = extractor(&mock);

    let (a, b) = tokio::join!(
        extractor.run(Some("doc a"), chunks(3)),
        extractor.run(Some("doc b"), chunks(2)),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.len(), 1);
    assert_eq!(a[0].contents.len(), 3);
    assert_eq!(b.len(), 1);
    assert_eq!(b[0].contents.len(), 2);
    assert_eq!(mock.call_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn slow_backend_still_sequential() {
    let mock = Arc::new(
        MockLlm::new(empty()).with_delay(std::time::Duration::from_secs(30)),
    );
    let start = tokio::time::Instant::now();
    extractor(&mock).run(None, chunks(4)).await.unwrap();
    assert!(start.elapsed() >= std::time::Duration::from_secs(120));
}
