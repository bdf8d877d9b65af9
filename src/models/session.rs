use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::ActionRecord;

/// One recording's full context: target URL plus its ordered action log.
///
/// The log is append-only while the status is "recording" and becomes
/// read-only once the session completes. There is no session history in
/// the core: starting a new recording replaces the buffer entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub target_url: String,
    #[serde(default = "default_status")]
    pub status: String, // "pending", "initializing", "recording", "paused", "completed", "error"
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

fn default_status() -> String {
    "pending".to_string()
}

impl Session {
    pub fn new(target_url: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            target_url,
            status: "pending".to_string(),
            actions: Vec::new(),
            error: None,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn start(&mut self) {
        self.status = "recording".to_string();
        self.started_at = Some(Utc::now());
    }

    pub fn pause(&mut self) {
        self.status = "paused".to_string();
    }

    pub fn resume(&mut self) {
        self.status = "recording".to_string();
    }

    pub fn complete(&mut self) {
        self.status = "completed".to_string();
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: String) {
        self.status = "error".to_string();
        self.error = Some(error);
        self.completed_at = Some(Utc::now());
    }

    pub fn is_recording(&self) -> bool {
        self.status == "recording"
    }

    pub fn append(&mut self, record: ActionRecord) {
        self.actions.push(record);
    }
}
