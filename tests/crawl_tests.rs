//! End-to-end tests for the crawl engine
//!
//! These tests use wiremock to stand up mock sites and exercise the full
//! engine lifecycle: discovery, domain restriction, fault rollback,
//! checkpoint resumption, and download error reporting.

use driftnet::checkpoint::CheckpointStore;
use driftnet::config::{Config, CrawlerConfig, HttpConfig, OutputConfig};
use driftnet::crawler::{ContentExtractor, Engine, Page, RunOutcome};
use driftnet::task::Task;
use driftnet::CrawlError;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration rooted at a scratch directory
fn test_config(base_url: &str, dir: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            start_url: format!("{}/", base_url),
            allowed_domain: format!("{}/", base_url),
            // No politeness delay in tests
            throttle: false,
            throttle_low_ms: 0,
            throttle_high_ms: 0,
        },
        http: HttpConfig::default(),
        output: OutputConfig {
            directory: dir.display().to_string(),
            file: "output.json".to_string(),
        },
    }
}

fn html_page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, body
    )
}

async fn mount_page(server: &MockServer, route: &str, title: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page(title, body))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Extractor that never yields a record
struct NoneExtractor;

impl ContentExtractor for NoneExtractor {
    fn extract(&self, _page: &Page, _task: &Task) -> anyhow::Result<Option<Value>> {
        Ok(None)
    }
}

/// Extractor that records the URLs it was handed, in order
#[derive(Clone, Default)]
struct VisitRecorder {
    visited: Arc<Mutex<Vec<String>>>,
}

impl ContentExtractor for VisitRecorder {
    fn extract(&self, _page: &Page, task: &Task) -> anyhow::Result<Option<Value>> {
        self.visited.lock().unwrap().push(task.url().to_string());
        Ok(None)
    }
}

/// Extractor that fails on any URL with the given suffix
struct FailOn(&'static str);

impl ContentExtractor for FailOn {
    fn extract(&self, _page: &Page, task: &Task) -> anyhow::Result<Option<Value>> {
        if task.url().ends_with(self.0) {
            anyhow::bail!("extraction blew up on {}", task.url());
        }
        Ok(None)
    }
}

fn read_checkpoint(dir: &Path) -> Value {
    let content = std::fs::read_to_string(dir.join(".crawl").join("task.json"))
        .expect("checkpoint file should exist");
    serde_json::from_str(&content).expect("checkpoint should be valid JSON")
}

#[tokio::test]
async fn test_discovery_admits_in_domain_links_in_order() {
    // Scenario A: the seed page links /a and /b; after one iteration the
    // queue holds them in discovery order and the filter has all three URLs.
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        "Root",
        r#"<a href="/a">A</a><a href="/b">B</a>"#,
    )
    .await;
    mount_page(&server, "/a", "Page A", "").await;
    mount_page(&server, "/b", "Page B", "").await;

    let dir = TempDir::new().unwrap();
    let base = server.uri();

    // Interrupt after the first iteration so the queue is observable. The
    // flag is filled in once the engine exists.
    struct CancelAfterFirst(Arc<Mutex<Option<driftnet::crawler::CancelFlag>>>);
    impl ContentExtractor for CancelAfterFirst {
        fn extract(&self, _page: &Page, _task: &Task) -> anyhow::Result<Option<Value>> {
            if let Some(flag) = self.0.lock().unwrap().as_ref() {
                flag.cancel();
            }
            Ok(None)
        }
    }

    let slot = Arc::new(Mutex::new(None));
    let mut engine = Engine::new(
        test_config(&base, dir.path()),
        Box::new(CancelAfterFirst(slot.clone())),
    )
    .unwrap();
    *slot.lock().unwrap() = Some(engine.cancel_flag());

    let outcome = engine.run().await.unwrap();
    assert_eq!(outcome, RunOutcome::Interrupted);

    let checkpoint = read_checkpoint(dir.path());
    let tasks = checkpoint["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["url"], format!("{}/a", base));
    assert_eq!(tasks[0]["depth"], 1);
    assert_eq!(tasks[0]["anchor_text"], "A");
    assert_eq!(tasks[0]["parent"]["url"], format!("{}/", base));
    assert_eq!(tasks[1]["url"], format!("{}/b", base));
    assert_eq!(tasks[1]["depth"], 1);

    let filter: Vec<&str> = checkpoint["url_filter"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(filter.contains(&format!("{}/", base).as_str()));
    assert!(filter.contains(&format!("{}/a", base).as_str()));
    assert!(filter.contains(&format!("{}/b", base).as_str()));

    // Every queued URL is also in the filter
    for task in tasks {
        assert!(filter.contains(&task["url"].as_str().unwrap()));
    }
}

#[tokio::test]
async fn test_out_of_domain_links_are_not_admitted() {
    // Scenario B: a link to another host is discovered but never admitted.
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        "Root",
        r#"<a href="http://other.invalid/x">Elsewhere</a>"#,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut engine = Engine::new(
        test_config(&server.uri(), dir.path()),
        Box::new(NoneExtractor),
    )
    .unwrap();

    let outcome = engine.run().await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed);

    // Completed run: no checkpoint, no download errors, nothing queued
    assert!(!dir.path().join(".crawl").join("task.json").exists());
    assert!(!dir.path().join(".crawl").join("download_error.txt").exists());
    assert!(!engine.frontier().contains("http://other.invalid/x"));
}

#[tokio::test]
async fn test_processing_fault_rolls_back_and_checkpoints() {
    // Scenario C: extraction fails on /a; the run aborts, /a is released
    // from the filter and requeued at the front, and the checkpoint captures
    // exactly that state.
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(
        &server,
        "/",
        "Root",
        r#"<a href="/a">A</a><a href="/b">B</a>"#,
    )
    .await;
    mount_page(&server, "/a", "Page A", "").await;
    mount_page(&server, "/b", "Page B", "").await;

    let dir = TempDir::new().unwrap();
    let mut engine =
        Engine::new(test_config(&base, dir.path()), Box::new(FailOn("/a"))).unwrap();

    let result = engine.run().await;
    assert!(matches!(result, Err(CrawlError::Process { .. })));

    let checkpoint = read_checkpoint(dir.path());
    let tasks = checkpoint["tasks"].as_array().unwrap();
    assert_eq!(tasks[0]["url"], format!("{}/a", base));
    assert_eq!(tasks[1]["url"], format!("{}/b", base));

    let filter: Vec<&str> = checkpoint["url_filter"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    // /a was released for retry; the others stay seen
    assert!(!filter.contains(&format!("{}/a", base).as_str()));
    assert!(filter.contains(&format!("{}/", base).as_str()));
    assert!(filter.contains(&format!("{}/b", base).as_str()));

    // The faulting URL lands in the processing error report
    let report =
        std::fs::read_to_string(dir.path().join(".crawl").join("process_error.txt")).unwrap();
    assert_eq!(report, format!("{}/a\n", base));
}

#[tokio::test]
async fn test_resume_processes_rolled_back_task_first() {
    // Scenario D: restarting after a fault picks up /a first, with no seed
    // re-injection, and drains the rest of the queue.
    let server = MockServer::start().await;
    let base = server.uri();

    // The seed must be fetched exactly once across both runs.
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page("Root", r#"<a href="/a">A</a><a href="/b">B</a>"#))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/a", "Page A", "").await;
    mount_page(&server, "/b", "Page B", "").await;

    let dir = TempDir::new().unwrap();

    // First run faults on /a
    let mut engine =
        Engine::new(test_config(&base, dir.path()), Box::new(FailOn("/a"))).unwrap();
    assert!(engine.run().await.is_err());

    // Second run resumes from the checkpoint
    let recorder = VisitRecorder::default();
    let visited = recorder.visited.clone();
    let mut engine =
        Engine::new(test_config(&base, dir.path()), Box::new(recorder)).unwrap();
    let outcome = engine.run().await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed);

    let visited = visited.lock().unwrap();
    assert_eq!(
        *visited,
        vec![format!("{}/a", base), format!("{}/b", base)]
    );

    // Consumed checkpoint is gone
    assert!(!dir.path().join(".crawl").join("task.json").exists());
}

#[tokio::test]
async fn test_download_error_is_reported_not_retried() {
    // Scenario E: /b returns 404; it lands in the download error report and
    // is never requeued, and the run still completes.
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/", "Root", r#"<a href="/b">B</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut engine =
        Engine::new(test_config(&base, dir.path()), Box::new(NoneExtractor)).unwrap();

    let outcome = engine.run().await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed);

    assert_eq!(engine.download_errors(), &[format!("{}/b", base)]);
    let report =
        std::fs::read_to_string(dir.path().join(".crawl").join("download_error.txt")).unwrap();
    assert_eq!(report, format!("{}/b\n", base));

    // No checkpoint for a completed run, even one with download errors
    assert!(!dir.path().join(".crawl").join("task.json").exists());
}

#[tokio::test]
async fn test_extracted_records_stream_to_output_file() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(
        &server,
        "/",
        "Root",
        r#"<a href="/a">A</a><a href="/b">B</a>"#,
    )
    .await;
    mount_page(&server, "/a", "Page A", "").await;
    mount_page(&server, "/b", "Page B", "").await;

    struct TitleExtractor;
    impl ContentExtractor for TitleExtractor {
        fn extract(&self, page: &Page, task: &Task) -> anyhow::Result<Option<Value>> {
            Ok(page.title().map(|t| json!({"url": task.url(), "title": t})))
        }
    }

    let dir = TempDir::new().unwrap();
    let mut engine =
        Engine::new(test_config(&base, dir.path()), Box::new(TitleExtractor)).unwrap();
    let outcome = engine.run().await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed);

    let content = std::fs::read_to_string(dir.path().join("output.json")).unwrap();
    let lines: Vec<Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["title"], "Root");
    assert_eq!(lines[1]["title"], "Page A");
    assert_eq!(lines[2]["title"], "Page B");
}

#[tokio::test]
async fn test_pages_without_output_write_no_lines() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Root", "").await;

    let dir = TempDir::new().unwrap();
    let mut engine = Engine::new(
        test_config(&server.uri(), dir.path()),
        Box::new(NoneExtractor),
    )
    .unwrap();
    engine.run().await.unwrap();

    // The sink opens lazily; no record means no file at all
    assert!(!dir.path().join("output.json").exists());
}

#[tokio::test]
async fn test_corrupt_checkpoint_is_fatal_before_any_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("unreachable"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let state_dir = dir.path().join(".crawl");
    std::fs::create_dir_all(&state_dir).unwrap();
    std::fs::write(state_dir.join("task.json"), "garbage {{{").unwrap();

    let mut engine = Engine::new(
        test_config(&server.uri(), dir.path()),
        Box::new(NoneExtractor),
    )
    .unwrap();

    let result = engine.run().await;
    assert!(matches!(result, Err(CrawlError::Checkpoint(_))));

    // The corrupt file is left in place for inspection
    assert!(state_dir.join("task.json").exists());
}

#[tokio::test]
async fn test_duplicate_links_are_admitted_once() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(
        &server,
        "/",
        "Root",
        r#"<a href="/a">A</a><a href="/a">A again</a>"#,
    )
    .await;
    // /a links back to the seed; neither may be fetched twice
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page("Page A", r#"<a href="/">home</a>"#))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let recorder = VisitRecorder::default();
    let visited = recorder.visited.clone();
    let mut engine = Engine::new(test_config(&base, dir.path()), Box::new(recorder)).unwrap();
    engine.run().await.unwrap();

    assert_eq!(
        *visited.lock().unwrap(),
        vec![format!("{}/", base), format!("{}/a", base)]
    );

    // CheckpointStore path helper points where the engine writes
    let store = CheckpointStore::new(dir.path());
    assert!(!store.exists());
}
