use super::stats::TranscriptEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle phase of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Idle,
    Connecting,
    Active,
    Finished,
}

impl CallStatus {
    /// A start action is only accepted when no call is in flight
    pub fn can_start(self) -> bool {
        matches!(self, CallStatus::Idle | CallStatus::Finished)
    }

    pub fn in_call(self) -> bool {
        matches!(self, CallStatus::Connecting | CallStatus::Active)
    }
}

/// State of one call run
///
/// A fresh instance is created for every accepted start, so a transcript or
/// termination guard never leaks from one run into the next.
#[derive(Debug)]
pub struct CallSession {
    run_id: Uuid,
    status: CallStatus,
    transcript: Vec<TranscriptEntry>,
    termination_claimed: bool,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl CallSession {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            status: CallStatus::Idle,
            transcript: Vec::new(),
            termination_claimed: false,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn status(&self) -> CallStatus {
        self.status
    }

    /// Entries in arrival order
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn last_entry(&self) -> Option<&TranscriptEntry> {
        self.transcript.last()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn duration_secs(&self) -> Option<f64> {
        let started = self.started_at?;
        let end = self.finished_at.unwrap_or_else(Utc::now);
        Some(end.signed_duration_since(started).num_milliseconds() as f64 / 1000.0)
    }

    pub(crate) fn begin_connecting(&mut self) {
        self.status = CallStatus::Connecting;
        self.started_at = Some(Utc::now());
    }

    /// Connecting -> Active. Returns false if the call was not connecting.
    pub(crate) fn activate(&mut self) -> bool {
        if self.status != CallStatus::Connecting {
            return false;
        }
        self.status = CallStatus::Active;
        true
    }

    pub(crate) fn append(&mut self, entry: TranscriptEntry) {
        self.transcript.push(entry);
    }

    /// Connecting/Active -> Finished. Returns false if no call was in flight.
    pub(crate) fn finish(&mut self) -> bool {
        if !self.status.in_call() {
            return false;
        }
        self.status = CallStatus::Finished;
        self.finished_at = Some(Utc::now());
        true
    }

    /// One-shot guard: true the first time it is called on a finished run
    pub(crate) fn claim_termination(&mut self) -> bool {
        if self.status != CallStatus::Finished || self.termination_claimed {
            return false;
        }
        self.termination_claimed = true;
        true
    }
}

impl Default for CallSession {
    fn default() -> Self {
        Self::new()
    }
}
