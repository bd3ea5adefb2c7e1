use crate::config::ScrapeConfig;
use crate::error::{RenderError, ScrapeError};
use crate::session::ScrapeSession;
use crate::tests::fake::{FakeRenderer, RecordingPacer};
use crate::tests::fixtures::{Card, listing_html, numbered_page};
use std::fs;
use std::path::Path;

fn session(output: &Path, max_pages: u32, retries: u32) -> ScrapeSession {
    let config = ScrapeConfig {
        max_pages,
        max_retries_per_page: retries,
        output_path: output.to_path_buf(),
        ..ScrapeConfig::default()
    };
    ScrapeSession::new(config).with_pacer(Box::new(RecordingPacer::default()))
}

fn data_rows(path: &Path) -> Vec<String> {
    let text = fs::read_to_string(path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("title,location,date,time"));
    lines.map(str::to_string).collect()
}

#[tokio::test]
async fn test_two_pages_with_one_retry() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("events.csv");
    let renderer = FakeRenderer::new()
        .page(
            1,
            listing_html(&[
                Card::full("Jazz Night", "Baxter Theatre", "Friday, March 14, 2025 19:00"),
                Card::full("Trail Run", "Table Mountain", "Saturday, March 15, 2025 6:30 AM"),
            ]),
        )
        .timeouts(2, 1)
        .page(2, listing_html(&[Card::titled("Pop-up Market")]));
    let log = renderer.log();

    let written = session(&output, 2, 1).execute_with(renderer).await.unwrap();

    assert_eq!(written, output);
    assert_eq!(
        data_rows(&output),
        vec![
            "Jazz Night,Baxter Theatre,\"Friday, March 14, 2025\",19:00",
            "Trail Run,Table Mountain,\"Saturday, March 15, 2025\",6:30 AM",
            "Pop-up Market,,,",
        ]
    );
    let log = log.lock().unwrap();
    assert_eq!(log.loads, vec![1, 2, 2]);
    assert!(log.closed);
}

#[tokio::test]
async fn test_failure_writes_partial_output_and_releases_renderer() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("partial.csv");
    let renderer = FakeRenderer::new()
        .page(1, numbered_page("p1", 2))
        .timeouts(2, 1);
    let log = renderer.log();

    let err = session(&output, 10, 1).execute_with(renderer).await.unwrap_err();

    assert!(matches!(err, ScrapeError::RetriesExhausted { page: 2, .. }));
    assert!(!err.is_setup_failure());
    assert_eq!(data_rows(&output).len(), 2);
    assert!(log.lock().unwrap().closed);
}

#[tokio::test]
async fn test_failure_without_records_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("none.csv");
    let renderer = FakeRenderer::new().result(1, Err(RenderError::SessionLost("gone".into())));
    let log = renderer.log();

    let err = session(&output, 3, 2).execute_with(renderer).await.unwrap_err();

    assert!(matches!(err, ScrapeError::Renderer(RenderError::SessionLost(_))));
    assert!(!output.exists());
    assert!(log.lock().unwrap().closed);
}

#[tokio::test]
async fn test_invalid_config_still_releases_renderer() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("never.csv");
    let renderer = FakeRenderer::new().page(1, numbered_page("p1", 1));
    let log = renderer.log();

    let err = session(&output, 0, 1).execute_with(renderer).await.unwrap_err();

    assert!(err.is_setup_failure());
    let log = log.lock().unwrap();
    assert!(log.loads.is_empty());
    assert!(log.closed);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_empty_later_pages_still_write_file() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("nested").join("events.csv");
    let renderer = FakeRenderer::new()
        .page(1, numbered_page("p1", 1))
        .page(2, listing_html(&[]));

    session(&output, 2, 0).execute_with(renderer).await.unwrap();

    assert_eq!(data_rows(&output), vec!["p1 1,Main Hall,\"Saturday, May 3, 2025\",19:00"]);
}
