use super::config::ModeKind;
use super::session::CallStatus;
use crate::navigation::NavigationTarget;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    System,
    Assistant,
}

/// A single finalized utterance
///
/// Serialized as `{role, content}`, the shape the feedback generator expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    #[serde(rename = "role")]
    pub speaker: Speaker,

    #[serde(rename = "content")]
    pub text: String,
}

impl TranscriptEntry {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }
}

/// Point-in-time view of a session, for the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,

    /// Identifies the current call run; changes on every accepted start
    pub run_id: Uuid,

    pub mode: ModeKind,

    pub status: CallStatus,

    /// Whether the assistant is currently speaking
    pub is_speaking: bool,

    /// Text of the most recent transcript entry
    pub last_message: Option<String>,

    pub transcript_len: usize,

    /// Where the user was sent after the call, once decided
    pub navigation: Option<NavigationTarget>,

    pub started_at: Option<DateTime<Utc>>,

    pub finished_at: Option<DateTime<Utc>>,

    /// Call duration so far (or total, once finished)
    pub duration_secs: Option<f64>,
}
