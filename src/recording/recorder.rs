use anyhow::{anyhow, Result};
use chromiumoxide::cdp::js_protocol::runtime::EventBindingCalled;
use futures_util::StreamExt;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::time::Instant;

use crate::browser::manager::Viewport;
use crate::browser::BrowserManager;
use crate::models::{ActionRecord, ElementSnapshot, Session};
use crate::recording::debounce::ActionDebouncer;
use crate::recording::locator;

/// Name of the CDP binding the capture script pushes events through.
const CAPTURE_BINDING: &str = "__autometaCaptureEvent";

/// Event captured from browser JavaScript
#[derive(Debug, Clone, Deserialize)]
struct CapturedEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(flatten)]
    snapshot: ElementSnapshot,
    /// Current field content; present on input events only.
    #[serde(default)]
    value: Option<String>,
}

/// JavaScript injected into the recorded page.
///
/// Clicks resolve to the nearest interactive ancestor-or-self; everything
/// else is ignored in-page. Input events are forwarded immediately with
/// the field's full current value - the Rust-side debouncer owns the idle
/// window, so no timer lives in the page. Events are pushed instantly
/// over the CDP binding (no polling).
const CAPTURE_SCRIPT: &str = r#"
(() => {
    if (window.__autometaRecording) return true;
    window.__autometaRecording = true;
    window.__autometaPaused = false;

    function sendEvent(event) {
        if (window.__autometaPaused) return;
        if (typeof __autometaCaptureEvent === 'function') {
            __autometaCaptureEvent(JSON.stringify(event));
        }
    }

    function snapshot(el) {
        return {
            tag: el.tagName.toLowerCase(),
            id: el.id || '',
            name: el.name || '',
            text: (el.innerText || '').slice(0, 120),
            classes: (el.className && typeof el.className === 'string')
                ? el.className.split(' ').filter(c => c)
                : []
        };
    }

    document.addEventListener('click', (e) => {
        if (!e.target || !e.target.closest) return;
        const el = e.target.closest('button, a, input, select, textarea');
        if (!el) return;
        sendEvent({ type: 'click', ...snapshot(el) });
    }, true);

    document.addEventListener('input', (e) => {
        const el = e.target;
        if (el.tagName === 'INPUT' || el.tagName === 'TEXTAREA') {
            sendEvent({ type: 'input', value: el.value, ...snapshot(el) });
        }
    }, true);

    return true;
})()
"#;

/// Records one browser session: owns the session buffer, the debounce
/// pipeline, and the background task consuming the CDP event stream.
pub struct SessionRecorder {
    /// The browser manager - public for integration tests
    pub browser: Arc<BrowserManager>,
    session: Arc<Mutex<Option<Session>>>,
    debouncer: Arc<Mutex<ActionDebouncer>>,
    record_sender: broadcast::Sender<ActionRecord>,
    cancel_sender: broadcast::Sender<()>,
    viewport: Viewport,
}

impl SessionRecorder {
    pub fn new() -> Self {
        let (record_tx, _) = broadcast::channel(256);
        let (cancel_tx, _) = broadcast::channel(1);

        Self {
            browser: Arc::new(BrowserManager::new()),
            session: Arc::new(Mutex::new(None)),
            debouncer: Arc::new(Mutex::new(ActionDebouncer::new())),
            record_sender: record_tx,
            cancel_sender: cancel_tx,
            viewport: Viewport {
                width: 1280,
                height: 720,
            },
        }
    }

    /// Start a new recording session on the given URL.
    pub async fn start(
        &self,
        target_url: &str,
        headless: bool,
        viewport: Option<Viewport>,
    ) -> Result<Session> {
        let viewport = viewport.unwrap_or_else(|| self.viewport.clone());

        // Fresh buffer: a new session replaces any prior log entirely
        let mut session = Session::new(target_url.to_string());
        session.start();
        let session_id = session.id.clone();

        *self.session.lock().await = Some(session.clone());
        *self.debouncer.lock().await = ActionDebouncer::new();

        self.browser
            .launch(target_url, headless, Some(viewport))
            .await?;

        // CDP binding for instant event capture
        let event_stream = self.browser.setup_event_binding(CAPTURE_BINDING).await?;

        // Register on every new document so clicks that navigate keep
        // being recorded, then run immediately on the current page
        self.browser.add_script_on_new_document(CAPTURE_SCRIPT).await?;
        self.browser.evaluate(CAPTURE_SCRIPT).await?;

        tracing::info!("Recording started: {} on {}", session_id, target_url);

        self.spawn_event_listener(event_stream);

        Ok(session)
    }

    /// Spawn the background task that turns captured DOM events into
    /// appended action records: resolve locator, debounce, append.
    fn spawn_event_listener(
        &self,
        mut event_stream: chromiumoxide::listeners::EventStream<EventBindingCalled>,
    ) {
        let session = Arc::clone(&self.session);
        let debouncer = Arc::clone(&self.debouncer);
        let record_sender = self.record_sender.clone();
        let mut cancel_rx = self.cancel_sender.subscribe();

        tokio::spawn(async move {
            loop {
                let idle_deadline = debouncer.lock().await.next_deadline();

                tokio::select! {
                    _ = cancel_rx.recv() => {
                        tracing::info!("Recording event listener cancelled");
                        break;
                    }
                    // Idle window elapsed: the in-flight type action is final
                    _ = idle_wait(idle_deadline) => {
                        let fired = debouncer.lock().await.poll(Instant::now());
                        if let Some(record) = fired {
                            append_record(&session, &record_sender, record).await;
                        }
                    }
                    maybe_event = event_stream.next() => {
                        match maybe_event {
                            Some(binding_event) => {
                                if binding_event.name != CAPTURE_BINDING {
                                    continue;
                                }

                                let is_recording = session
                                    .lock()
                                    .await
                                    .as_ref()
                                    .map(Session::is_recording)
                                    .unwrap_or(false);
                                if !is_recording {
                                    continue;
                                }

                                let event = match serde_json::from_str::<CapturedEvent>(&binding_event.payload) {
                                    Ok(event) => event,
                                    Err(e) => {
                                        tracing::debug!("Unparseable capture payload: {}", e);
                                        continue;
                                    }
                                };

                                let Some(locator) = locator::resolve(&event.snapshot) else {
                                    // Unlocatable element: dropped, no log entry
                                    tracing::debug!(
                                        "Dropping {} on <{}> - no stable locator",
                                        event.event_type,
                                        event.snapshot.tag
                                    );
                                    continue;
                                };

                                match event.event_type.as_str() {
                                    "click" => {
                                        let records = debouncer.lock().await.on_click(locator);
                                        for record in records {
                                            append_record(&session, &record_sender, record).await;
                                        }
                                    }
                                    "input" => {
                                        let value = event.value.unwrap_or_default();
                                        let flushed = debouncer
                                            .lock()
                                            .await
                                            .on_input(locator, value, Instant::now());
                                        if let Some(record) = flushed {
                                            append_record(&session, &record_sender, record).await;
                                        }
                                    }
                                    other => {
                                        tracing::debug!("Ignoring capture event kind '{}'", other);
                                    }
                                }
                            }
                            None => {
                                // Event stream ended (page closed?)
                                tracing::debug!("CDP event stream ended");
                                break;
                            }
                        }
                    }
                }
            }

            tracing::info!("Recording event listener stopped");
        });
    }

    /// Pause recording
    pub async fn pause(&self) -> Result<()> {
        let mut session_guard = self.session.lock().await;
        if let Some(ref mut session) = *session_guard {
            session.pause();
            self.browser
                .evaluate("window.__autometaPaused = true; true")
                .await?;
            tracing::info!("Recording paused");
        }
        Ok(())
    }

    /// Resume recording
    pub async fn resume(&self) -> Result<()> {
        let mut session_guard = self.session.lock().await;
        if let Some(ref mut session) = *session_guard {
            session.resume();
            self.browser
                .evaluate("window.__autometaPaused = false; true")
                .await?;
            tracing::info!("Recording resumed");
        }
        Ok(())
    }

    /// Stop recording and return the finalized, read-only session.
    pub async fn stop(&self) -> Result<Session> {
        // Signal event listener to stop
        let _ = self.cancel_sender.send(());

        // Drain any in-flight type action before sealing the log
        let flushed = self.debouncer.lock().await.flush();
        if let Some(record) = flushed {
            append_record(&self.session, &self.record_sender, record).await;
        }

        let mut session_guard = self.session.lock().await;
        let mut session = session_guard
            .take()
            .ok_or_else(|| anyhow!("No active recording session"))?;
        drop(session_guard); // Release lock early

        session.complete();

        tracing::info!(
            "Recording stopped: {} ({} actions)",
            session.id,
            session.actions.len()
        );

        // Close browser in background to avoid lag on stop
        let browser = Arc::clone(&self.browser);
        tokio::spawn(async move {
            if let Err(e) = browser.close().await {
                tracing::warn!("Background browser close failed: {}", e);
            }
        });

        Ok(session)
    }

    /// Cancel recording without saving
    pub async fn cancel(&self) -> Result<()> {
        let _ = self.cancel_sender.send(());

        let mut session_guard = self.session.lock().await;
        if let Some(ref mut session) = *session_guard {
            session.fail("Recording cancelled by user".to_string());
        }
        *session_guard = None;
        drop(session_guard);

        self.debouncer.lock().await.flush();

        self.browser.close().await?;

        tracing::info!("Recording cancelled");

        Ok(())
    }

    /// Get the current session
    pub async fn session(&self) -> Option<Session> {
        self.session.lock().await.clone()
    }

    /// Number of actions appended so far
    pub async fn action_count(&self) -> usize {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|s| s.actions.len())
            .unwrap_or(0)
    }

    /// Subscribe to appended action records
    pub fn subscribe_records(&self) -> broadcast::Receiver<ActionRecord> {
        self.record_sender.subscribe()
    }
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Sleep until the idle deadline, or forever when no type action is in
/// flight (the select loop is then driven by events alone).
async fn idle_wait(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

/// Append a record to the active session and broadcast it to listeners.
async fn append_record(
    session: &Mutex<Option<Session>>,
    record_sender: &broadcast::Sender<ActionRecord>,
    record: ActionRecord,
) {
    let mut session_guard = session.lock().await;
    let Some(ref mut sess) = *session_guard else {
        return;
    };
    if !sess.is_recording() {
        return;
    }
    sess.append(record.clone());
    drop(session_guard);

    let _ = record_sender.send(record);
}
