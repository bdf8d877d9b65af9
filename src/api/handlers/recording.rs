use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::browser::manager::Viewport;
use crate::error::{AppError, Result};
use crate::models::{
    GenericResponse, Session, SessionStatusResponse, StartRecordingRequest,
    StartRecordingResponse, StopRecordingResponse,
};
use crate::recording::SessionRecorder;

use super::super::state::{ActiveRecorder, AppState, WsEvent};

/// Start a new browser recording session.
///
/// Returns immediately with status "initializing" and launches the
/// browser in a background task. The frontend polls
/// `get_recording_status` until the status becomes "recording" or "error".
pub async fn start_recording(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRecordingRequest>,
) -> Result<Json<StartRecordingResponse>> {
    if request.target_url.is_empty() {
        return Err(AppError::ValidationError("target_url is required".to_string()));
    }

    // Acquire global recording lock to prevent race conditions (double Chrome)
    let _recording_guard = state.recording_lock.lock().await;

    // Sessions never interleave: cancel any existing recording first
    let existing_sessions: Vec<String> = state.recordings.iter().map(|r| r.key().clone()).collect();
    for session_id in existing_sessions {
        if let Some((_, active)) = state.recordings.remove(&session_id) {
            tracing::warn!("Cancelling existing recording session: {}", session_id);
            let _ = active.recorder.cancel().await;
        }
    }

    let session_id = Uuid::new_v4().to_string();
    let target_url = request.target_url.clone();

    // Create initial session with "initializing" status
    let initial_session = Session {
        id: session_id.clone(),
        target_url: target_url.clone(),
        status: "initializing".to_string(),
        actions: vec![],
        error: None,
        started_at: Some(chrono::Utc::now()),
        completed_at: None,
    };

    let recorder = Arc::new(SessionRecorder::new());

    // Store recorder with initializing session BEFORE launching the browser
    state.recordings.insert(
        session_id.clone(),
        ActiveRecorder {
            recorder: Arc::clone(&recorder),
            session: initial_session,
            client_id: request.client_id.clone(),
        },
    );

    tracing::info!(
        "Created recording session {} (initializing) for URL: {}",
        session_id,
        target_url
    );

    // Spawn browser launch in background - this is the slow part
    let state_clone = Arc::clone(&state);
    let sid = session_id.clone();
    let headless = request.headless;
    let viewport = Some(Viewport {
        width: request.viewport_width,
        height: request.viewport_height,
    });

    tokio::spawn(async move {
        match recorder.start(&target_url, headless, viewport).await {
            Ok(session) => {
                if let Some(mut active) = state_clone.recordings.get_mut(&sid) {
                    active.session = session.clone();
                    tracing::info!("Recording session {} is now active", sid);
                }

                // Forward appended records to WebSocket clients
                let mut record_rx = recorder.subscribe_records();
                let ws_broadcast = state_clone.ws_broadcast.clone();
                let sid_inner = sid.clone();

                tokio::spawn(async move {
                    while let Ok(record) = record_rx.recv().await {
                        let _ = ws_broadcast.send(WsEvent::ActionRecorded {
                            session_id: sid_inner.clone(),
                            record,
                        });
                    }
                });
            }
            Err(e) => {
                tracing::error!("Failed to start recording for session {}: {}", sid, e);
                if let Some(mut active) = state_clone.recordings.get_mut(&sid) {
                    active.session.status = "error".to_string();
                    active.session.error = Some(e.to_string());
                }

                let _ = state_clone.ws_broadcast.send(WsEvent::Error {
                    session_id: sid.clone(),
                    error: e.to_string(),
                });
            }
        }
    });

    // Return immediately with "initializing" status
    Ok(Json(StartRecordingResponse {
        session_id,
        status: "initializing".to_string(),
    }))
}

/// Stop a recording session and return the finalized session. The session
/// is retained as the last-session buffer so its script can be requested
/// afterwards.
pub async fn stop_recording(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<StopRecordingResponse>> {
    let (_, active) = state
        .recordings
        .remove(&session_id)
        .ok_or_else(|| AppError::SessionNotFound(session_id.clone()))?;

    let session = active
        .recorder
        .stop()
        .await
        .map_err(|e| AppError::RecordingError(e.to_string()))?;

    tracing::info!(
        "Stopped recording session {} with {} actions",
        session_id,
        session.actions.len()
    );

    *state.last_session.lock().await = Some(session.clone());

    Ok(Json(StopRecordingResponse { session }))
}

/// Cancel a recording session without saving
pub async fn cancel_recording(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<GenericResponse>> {
    let (_, active) = state
        .recordings
        .remove(&session_id)
        .ok_or_else(|| AppError::SessionNotFound(session_id.clone()))?;

    active
        .recorder
        .cancel()
        .await
        .map_err(|e| AppError::RecordingError(e.to_string()))?;

    tracing::info!("Cancelled recording session {}", session_id);

    Ok(Json(GenericResponse {
        status: "cancelled".to_string(),
    }))
}

/// Pause a recording session
pub async fn pause_recording(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<GenericResponse>> {
    let active = state
        .recordings
        .get(&session_id)
        .ok_or_else(|| AppError::SessionNotFound(session_id.clone()))?;

    active
        .recorder
        .pause()
        .await
        .map_err(|e| AppError::RecordingError(e.to_string()))?;

    Ok(Json(GenericResponse {
        status: "paused".to_string(),
    }))
}

/// Resume a paused recording session
pub async fn resume_recording(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<GenericResponse>> {
    let active = state
        .recordings
        .get(&session_id)
        .ok_or_else(|| AppError::SessionNotFound(session_id.clone()))?;

    active
        .recorder
        .resume()
        .await
        .map_err(|e| AppError::RecordingError(e.to_string()))?;

    Ok(Json(GenericResponse {
        status: "recording".to_string(),
    }))
}

/// Get the status of a recording session
///
/// - "initializing": browser is still launching
/// - "recording": browser is ready and capturing
/// - "paused": recording is paused
/// - "error": an error occurred during initialization or recording
pub async fn get_recording_status(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStatusResponse>> {
    let active = state
        .recordings
        .get(&session_id)
        .ok_or_else(|| AppError::SessionNotFound(session_id.clone()))?;

    // Status from the stored session (updated by the background task);
    // live action count from the recorder
    let stored_status = active.session.status.clone();
    let stored_error = active.session.error.clone();
    let action_count = active.recorder.action_count().await;

    Ok(Json(SessionStatusResponse {
        session_id: session_id.clone(),
        status: stored_status,
        action_count: action_count as i32,
        error: stored_error,
    }))
}
