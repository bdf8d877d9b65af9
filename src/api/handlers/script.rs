use axum::{extract::State, Json};
use std::sync::Arc;

use crate::codegen;
use crate::error::{AppError, Result};
use crate::models::{GenerateScriptRequest, ScriptResponse};

use super::super::state::AppState;

/// Generate the replay script for the most recently finalized session.
pub async fn last_session_script(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ScriptResponse>> {
    let session_guard = state.last_session.lock().await;
    let session = session_guard
        .as_ref()
        .ok_or_else(|| AppError::SessionNotFound("no finalized session".to_string()))?;

    let script = codegen::generate(session);

    Ok(Json(ScriptResponse {
        file_name: script.file_name,
        source: script.source,
    }))
}

/// Generate a replay script from a session value supplied by the host.
/// Pure transform: nothing is stored, identical input yields identical
/// output.
pub async fn generate_script(
    Json(request): Json<GenerateScriptRequest>,
) -> Result<Json<ScriptResponse>> {
    if request.session.target_url.is_empty() {
        return Err(AppError::ValidationError(
            "session.target_url is required".to_string(),
        ));
    }

    let script = codegen::generate(&request.session);

    Ok(Json(ScriptResponse {
        file_name: script.file_name,
        source: script.source,
    }))
}
