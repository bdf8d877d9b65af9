use serde::Deserialize;

use super::session::Session;

#[derive(Debug, Deserialize)]
pub struct StartRecordingRequest {
    /// Absolute URL the recorded session starts on. Passed through to the
    /// browser as-is; the core performs no further validation.
    pub target_url: String,
    #[serde(default)]
    pub headless: bool,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: i32,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: i32,
    /// Optional client ID for tracking which client started the recording
    /// Used for cleanup when client disconnects
    pub client_id: Option<String>,
}

fn default_viewport_width() -> i32 {
    1280
}
fn default_viewport_height() -> i32 {
    720
}

/// Request to generate a script from a session the host already holds.
#[derive(Debug, Deserialize)]
pub struct GenerateScriptRequest {
    pub session: Session,
}
