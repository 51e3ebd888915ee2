use crate::session::{Speaker, TranscriptEntry};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event emitted by the voice provider during a call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum VoiceEvent {
    CallStart,
    CallEnd,
    Message(ServiceMessage),
    SpeechStart,
    SpeechEnd,
    Error { message: String },
}

impl VoiceEvent {
    /// Wire name of the event, for logging
    pub fn name(&self) -> &'static str {
        match self {
            VoiceEvent::CallStart => "call-start",
            VoiceEvent::CallEnd => "call-end",
            VoiceEvent::Message(_) => "message",
            VoiceEvent::SpeechStart => "speech-start",
            VoiceEvent::SpeechEnd => "speech-end",
            VoiceEvent::Error { .. } => "error",
        }
    }

    /// Shorthand for a finalized transcript message
    pub fn final_transcript(role: Speaker, text: impl Into<String>) -> Self {
        VoiceEvent::Message(ServiceMessage::transcript(role, text, TRANSCRIPT_FINAL))
    }

    /// Shorthand for an interim transcript message
    pub fn partial_transcript(role: Speaker, text: impl Into<String>) -> Self {
        VoiceEvent::Message(ServiceMessage::transcript(role, text, TRANSCRIPT_PARTIAL))
    }
}

/// A provider event together with the call it belongs to
///
/// The provider echoes the `call_id` sent in the start command, so events
/// from an earlier call on the same session can be told apart from the
/// current one. Events without an id are attributed to the current call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<Uuid>,
    #[serde(flatten)]
    pub event: VoiceEvent,
}

impl CallEvent {
    pub fn for_call(call_id: Uuid, event: VoiceEvent) -> Self {
        Self {
            call_id: Some(call_id),
            event,
        }
    }

    /// True unless the event is tagged with a different call
    pub fn belongs_to(&self, call_id: Uuid) -> bool {
        self.call_id.map_or(true, |id| id == call_id)
    }
}

impl From<VoiceEvent> for CallEvent {
    fn from(event: VoiceEvent) -> Self {
        Self {
            call_id: None,
            event,
        }
    }
}

pub const MESSAGE_TRANSCRIPT: &str = "transcript";
pub const TRANSCRIPT_FINAL: &str = "final";
pub const TRANSCRIPT_PARTIAL: &str = "partial";

/// Payload of a `message` event
///
/// Providers send many message kinds (function calls, status updates, ...);
/// only finalized transcripts are turned into transcript entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceMessage {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(rename = "transcriptType", default, skip_serializing_if = "Option::is_none")]
    pub transcript_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Speaker>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl ServiceMessage {
    pub fn transcript(role: Speaker, text: impl Into<String>, transcript_type: &str) -> Self {
        Self {
            kind: MESSAGE_TRANSCRIPT.to_string(),
            transcript_type: Some(transcript_type.to_string()),
            role: Some(role),
            transcript: Some(text.into()),
        }
    }

    /// Entry for a finalized transcript segment, `None` for anything else
    pub fn final_entry(&self) -> Option<TranscriptEntry> {
        if self.kind != MESSAGE_TRANSCRIPT || self.transcript_type.as_deref() != Some(TRANSCRIPT_FINAL) {
            return None;
        }

        match (self.role, self.transcript.as_ref()) {
            (Some(speaker), Some(text)) => Some(TranscriptEntry {
                speaker,
                text: text.clone(),
            }),
            _ => None,
        }
    }
}
