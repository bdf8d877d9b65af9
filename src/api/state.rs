use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, Mutex};

use crate::models::{ActionRecord, Session};
use crate::recording::SessionRecorder;

/// WebSocket event types broadcast to clients
#[derive(Debug, Clone)]
pub enum WsEvent {
    ActionRecorded {
        session_id: String,
        record: ActionRecord,
    },
    Error {
        session_id: String,
        error: String,
    },
    Pong,
}

/// Connected WebSocket client info
#[derive(Debug)]
pub struct ConnectedClient {
    pub connected_at: Instant,
}

/// Active recorder with its session
pub struct ActiveRecorder {
    pub recorder: Arc<SessionRecorder>,
    pub session: Session,
    /// Optional client ID that started this recording
    /// Used for cleanup when that client disconnects
    pub client_id: Option<String>,
}

/// Shared application state
pub struct AppState {
    /// Active recording sessions: session_id -> recorder
    pub recordings: DashMap<String, ActiveRecorder>,

    /// Connected WebSocket clients: client_id -> client info
    pub connected_clients: DashMap<String, ConnectedClient>,

    /// Single buffer holding the most recently finalized session, so the
    /// host can request its script after stopping. Replaced on every stop.
    pub last_session: Mutex<Option<Session>>,

    /// Broadcast channel for WebSocket events
    pub ws_broadcast: broadcast::Sender<WsEvent>,

    /// Global lock to prevent multiple concurrent recording starts
    /// This prevents two browser instances being launched in a race
    pub recording_lock: Mutex<()>,
}

impl AppState {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1024);

        Self {
            recordings: DashMap::new(),
            connected_clients: DashMap::new(),
            last_session: Mutex::new(None),
            ws_broadcast: tx,
            recording_lock: Mutex::new(()),
        }
    }

    pub fn broadcast(&self, event: WsEvent) {
        // Ignore send errors (no receivers)
        let _ = self.ws_broadcast.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WsEvent> {
        self.ws_broadcast.subscribe()
    }

    /// Register a WebSocket client connection
    pub fn client_connected(&self, client_id: &str) {
        self.connected_clients.insert(
            client_id.to_string(),
            ConnectedClient {
                connected_at: Instant::now(),
            },
        );
        tracing::debug!(
            "Client {} connected (active: {})",
            client_id,
            self.connected_clients.len()
        );
    }

    /// Unregister a WebSocket client connection and clean up any associated resources
    pub fn client_disconnected(&self, client_id: &str) {
        if let Some((_, client)) = self.connected_clients.remove(client_id) {
            let duration = client.connected_at.elapsed();
            tracing::debug!(
                "Client {} disconnected after {:?} (active: {})",
                client_id,
                duration,
                self.connected_clients.len()
            );
        }

        // Clean up any recordings associated with this client
        // (in case the client disconnected while recording)
        self.recordings.retain(|session_id, active_recorder| {
            let keep = active_recorder.client_id.as_deref() != Some(client_id);
            if !keep {
                tracing::info!("Cleaning up orphaned recording session: {}", session_id);
            }
            keep
        });
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
