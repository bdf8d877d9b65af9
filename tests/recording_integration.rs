//! Integration tests for the recording system.
//!
//! These tests launch real Chrome instances in headless mode and verify
//! that recording captures user interactions end to end.
//!
//! They are ignored by default because they need a local Chromium
//! install. Run with:
//!     cargo test --test recording_integration -- --ignored --test-threads=1

use std::time::Duration;
use tokio::time::sleep;

use autometa_sidecar::models::{ActionKind, LocatorStrategy};
use autometa_sidecar::recording::SessionRecorder;

/// Get file:// URL for the test page
fn test_page_url() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    format!("file://{}/tests/fixtures/test_page.html", manifest_dir)
}

/// Wait for events to be captured and processed
async fn wait_for_events(ms: u64) {
    sleep(Duration::from_millis(ms)).await;
}

#[tokio::test]
#[ignore = "requires a local Chromium install"]
async fn click_on_id_element_is_captured_with_css_locator() {
    let recorder = SessionRecorder::new();
    let url = test_page_url();

    let _session = recorder.start(&url, true, None).await.unwrap();
    wait_for_events(1500).await; // Page load + script injection

    recorder.browser.click("#btn-simple").await.unwrap();
    wait_for_events(500).await;

    let session = recorder.stop().await.unwrap();

    assert!(
        !session.actions.is_empty(),
        "Should capture at least one action, got {:?}",
        session.actions
    );

    let click = &session.actions[0];
    assert_eq!(click.kind, ActionKind::Click);
    assert_eq!(click.locator.strategy, LocatorStrategy::Css);
    assert_eq!(click.locator.expression, "#btn-simple");
}

#[tokio::test]
#[ignore = "requires a local Chromium install"]
async fn typing_coalesces_into_one_action_with_final_value() {
    let recorder = SessionRecorder::new();
    let url = test_page_url();

    let _session = recorder.start(&url, true, None).await.unwrap();
    wait_for_events(1500).await;

    // type_text focuses (click) then types character by character
    recorder
        .browser
        .type_text("#input-text", "Hello World")
        .await
        .unwrap();
    wait_for_events(1000).await; // Idle window (600ms) + buffer

    let session = recorder.stop().await.unwrap();

    let types: Vec<_> = session
        .actions
        .iter()
        .filter(|a| a.kind == ActionKind::Type)
        .collect();

    assert_eq!(
        types.len(),
        1,
        "Keystrokes must coalesce into one action, got {:?}",
        session.actions
    );
    assert_eq!(types[0].value.as_deref(), Some("Hello World"));
    assert_eq!(types[0].locator.expression, "#input-text");
}

#[tokio::test]
#[ignore = "requires a local Chromium install"]
async fn repeated_clicks_on_same_element_are_deduplicated() {
    let recorder = SessionRecorder::new();
    let url = test_page_url();

    let _session = recorder.start(&url, true, None).await.unwrap();
    wait_for_events(1500).await;

    recorder.browser.click("#btn-submit").await.unwrap();
    wait_for_events(300).await;
    recorder.browser.click("#btn-submit").await.unwrap();
    wait_for_events(500).await;

    let session = recorder.stop().await.unwrap();

    let clicks: Vec<_> = session
        .actions
        .iter()
        .filter(|a| a.kind == ActionKind::Click)
        .collect();

    assert_eq!(
        clicks.len(),
        1,
        "Consecutive clicks on the same element must dedup, got {:?}",
        session.actions
    );
}

#[tokio::test]
#[ignore = "requires a local Chromium install"]
async fn name_attribute_falls_back_to_css_name_locator() {
    let recorder = SessionRecorder::new();
    let url = test_page_url();

    let _session = recorder.start(&url, true, None).await.unwrap();
    wait_for_events(1500).await;

    recorder.browser.click("input[name='q']").await.unwrap();
    wait_for_events(500).await;

    let session = recorder.stop().await.unwrap();

    assert!(
        session
            .actions
            .iter()
            .any(|a| a.locator.expression == "input[name='q']"),
        "Element without id should resolve by name, got {:?}",
        session.actions
    );
}

#[tokio::test]
#[ignore = "requires a local Chromium install"]
async fn unlocatable_elements_are_dropped() {
    let recorder = SessionRecorder::new();
    let url = test_page_url();

    let _session = recorder.start(&url, true, None).await.unwrap();
    wait_for_events(1500).await;

    // Button with no id, no name, no text
    recorder
        .browser
        .click("button[aria-label='ghost']")
        .await
        .unwrap();
    wait_for_events(500).await;

    let session = recorder.stop().await.unwrap();

    assert!(
        session.actions.is_empty(),
        "Unlocatable element must leave no log entry, got {:?}",
        session.actions
    );
}

#[tokio::test]
#[ignore = "requires a local Chromium install"]
async fn session_lifecycle_pause_suppresses_capture() {
    let recorder = SessionRecorder::new();
    let url = test_page_url();

    let session = recorder.start(&url, true, None).await.unwrap();
    assert_eq!(session.status, "recording");
    wait_for_events(1500).await;

    recorder.pause().await.unwrap();
    let paused = recorder.session().await.unwrap();
    assert_eq!(paused.status, "paused");

    // Click while paused (should NOT be captured)
    recorder.browser.click("#btn-simple").await.unwrap();
    wait_for_events(500).await;

    recorder.resume().await.unwrap();
    let resumed = recorder.session().await.unwrap();
    assert_eq!(resumed.status, "recording");

    // Click while recording (SHOULD be captured)
    recorder.browser.click("#btn-submit").await.unwrap();
    wait_for_events(500).await;

    let session = recorder.stop().await.unwrap();

    let clicks: Vec<_> = session
        .actions
        .iter()
        .filter(|a| a.kind == ActionKind::Click)
        .collect();

    assert_eq!(
        clicks.len(),
        1,
        "Only the post-resume click should be captured, got {:?}",
        session.actions
    );
    assert_eq!(clicks[0].locator.expression, "#btn-submit");
}

#[tokio::test]
#[ignore = "requires a local Chromium install"]
async fn cancel_discards_the_session() {
    let recorder = SessionRecorder::new();
    let url = test_page_url();

    let _session = recorder.start(&url, true, None).await.unwrap();
    wait_for_events(1000).await;

    recorder.browser.click("#btn-simple").await.unwrap();
    wait_for_events(400).await;

    recorder.cancel().await.unwrap();

    assert!(
        recorder.session().await.is_none(),
        "Session should be cleared after cancel"
    );
}

#[tokio::test]
#[ignore = "requires a local Chromium install"]
async fn stop_flushes_in_flight_typing() {
    let recorder = SessionRecorder::new();
    let url = test_page_url();

    let _session = recorder.start(&url, true, None).await.unwrap();
    wait_for_events(1500).await;

    recorder.browser.type_text("#input-text", "abc").await.unwrap();
    // Stop immediately, inside the idle window
    wait_for_events(100).await;

    let session = recorder.stop().await.unwrap();

    let types: Vec<_> = session
        .actions
        .iter()
        .filter(|a| a.kind == ActionKind::Type)
        .collect();

    assert_eq!(
        types.len(),
        1,
        "Stop must flush the pending type action, got {:?}",
        session.actions
    );
    assert_eq!(types[0].value.as_deref(), Some("abc"));
}
