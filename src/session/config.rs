use crate::voice::AssistantConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The user placing the call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub user_id: String,
    pub user_name: String,
}

/// Identifiers and questions of a stored interview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewContext {
    pub interview_id: String,

    /// Feedback record left by a previous attempt, if any
    pub feedback_id: Option<String>,

    /// Asked in order
    pub questions: Vec<String>,
}

/// What a call is for
#[derive(Debug, Clone, PartialEq)]
pub enum CallMode {
    /// The assistant collects preferences and generates a new interview
    GeneratePractice,
    /// The assistant asks a stored interview's questions; feedback follows
    ScriptedInterview(InterviewContext),
}

impl CallMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            CallMode::GeneratePractice => ModeKind::GeneratePractice,
            CallMode::ScriptedInterview(_) => ModeKind::ScriptedInterview,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    GeneratePractice,
    ScriptedInterview,
}

/// Configuration for a call session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "session-<uuid>")
    pub session_id: String,

    pub caller: CallerIdentity,

    pub mode: CallMode,

    /// Provider workflow for practice generation
    pub workflow_id: String,

    /// Assistant for scripted interviews
    pub interviewer: AssistantConfig,

    /// Force-terminate a call that has not ended after this long.
    /// `None` waits for the provider or the user indefinitely.
    pub call_timeout: Option<Duration>,
}

impl SessionConfig {
    pub fn new(caller: CallerIdentity, mode: CallMode) -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            caller,
            mode,
            workflow_id: String::new(),
            interviewer: AssistantConfig::default(),
            call_timeout: None,
        }
    }

    pub fn with_workflow(mut self, workflow_id: impl Into<String>) -> Self {
        self.workflow_id = workflow_id.into();
        self
    }

    pub fn with_interviewer(mut self, interviewer: AssistantConfig) -> Self {
        self.interviewer = interviewer;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }
}
