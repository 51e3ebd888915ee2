use crate::voice::CallTarget;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Start command published to the voice provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartCallCommand {
    pub session_id: String,
    /// Echoed back on every event of this call
    pub call_id: Uuid,
    pub target: CallTarget,
    #[serde(default)]
    pub variable_values: BTreeMap<String, String>,
    pub timestamp: String, // RFC3339 timestamp
}

/// Stop command published to the voice provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopCallCommand {
    pub session_id: String,
    pub timestamp: String,
}

pub fn start_subject(session_id: &str) -> String {
    format!("voice.call.{}.start", session_id)
}

pub fn stop_subject(session_id: &str) -> String {
    format!("voice.call.{}.stop", session_id)
}

pub fn events_subject(session_id: &str) -> String {
    format!("voice.events.{}", session_id)
}
