use std::sync::atomic::Ordering;

use super::test_harness::{StubBackend, setup_view_harness};

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_renders_first_question() {
    let mut harness = setup_view_harness(StubBackend::new(600));
    harness.rebuild();
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("Capital of France?"), "missing prompt in {html}");
    assert!(html.contains("Question 1 of 3"), "missing position in {html}");
    assert!(html.contains("10:00"), "missing countdown in {html}");
    assert!(html.contains("Answered 0 of 3"), "missing progress in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_highlights_low_time() {
    let mut harness = setup_view_harness(StubBackend::new(45));
    harness.rebuild();
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("quiz-timer--low"), "missing low-time class in {html}");
    assert!(html.contains("00:45"), "missing countdown in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_renders_load_error() {
    let backend = StubBackend::new(600);
    backend.fail_status.store(true, Ordering::SeqCst);
    let mut harness = setup_view_harness(backend);
    harness.rebuild();
    harness.drive_async().await;

    let html = harness.render();
    assert!(
        html.contains("load this quiz. Please try again later."),
        "missing error in {html}"
    );
}
