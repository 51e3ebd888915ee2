use super::config::{CallMode, SessionConfig};
use super::session::{CallSession, CallStatus};
use super::stats::SessionSnapshot;
use super::termination::TerminationAction;
use crate::feedback::FeedbackRequest;
use crate::navigation::NavigationTarget;
use crate::voice::{CallEvent, CallTarget, StartOptions, VoiceCallService, VoiceEvent};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Result of a start action
#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    /// The provider accepted the command; waiting for call-start
    Connecting,
    /// A call is already connecting or active; nothing was sent
    AlreadyInProgress,
    /// The provider rejected the command and the run finished immediately.
    /// The call never connected, so the only follow-up is returning to landing.
    Failed { termination: Option<TerminationAction> },
}

/// Drives one UI surface's calls against a voice provider
///
/// All methods take `&mut self`: events and user actions are applied one
/// at a time, each to completion. Entering `Finished` yields a
/// `TerminationAction` exactly once per run.
pub struct SessionController {
    config: SessionConfig,
    voice: Arc<dyn VoiceCallService>,
    session: CallSession,
    is_speaking: bool,
    navigation: Option<NavigationTarget>,
}

impl SessionController {
    pub fn new(config: SessionConfig, voice: Arc<dyn VoiceCallService>) -> Self {
        info!(
            "Creating {:?} session {} for user {} (voice: {})",
            config.mode.kind(),
            config.session_id,
            config.caller.user_id,
            voice.name()
        );

        Self {
            config,
            voice,
            session: CallSession::new(),
            is_speaking: false,
            navigation: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn voice(&self) -> Arc<dyn VoiceCallService> {
        Arc::clone(&self.voice)
    }

    pub fn session(&self) -> &CallSession {
        &self.session
    }

    pub fn status(&self) -> CallStatus {
        self.session.status()
    }

    pub fn is_speaking(&self) -> bool {
        self.is_speaking
    }

    pub fn navigation(&self) -> Option<&NavigationTarget> {
        self.navigation.as_ref()
    }

    /// Target and variables for the start command
    pub fn call_request(&self) -> (CallTarget, StartOptions) {
        match &self.config.mode {
            CallMode::GeneratePractice => (
                CallTarget::Workflow(self.config.workflow_id.clone()),
                StartOptions::default()
                    .with_variable("username", self.config.caller.user_name.clone())
                    .with_variable("userid", self.config.caller.user_id.clone()),
            ),
            CallMode::ScriptedInterview(interview) => (
                CallTarget::Assistant(self.config.interviewer.clone()),
                StartOptions::default()
                    .with_variable("questions", format_questions(&interview.questions)),
            ),
        }
    }

    /// Start a new call run
    pub async fn start(&mut self) -> StartOutcome {
        let status = self.session.status();
        if !status.can_start() {
            warn!(
                "Ignoring start for session {}: call already {:?}",
                self.config.session_id, status
            );
            return StartOutcome::AlreadyInProgress;
        }

        self.session = CallSession::new();
        self.is_speaking = false;
        self.navigation = None;
        self.session.begin_connecting();

        info!(
            "Starting call run {} for session {}",
            self.session.run_id(),
            self.config.session_id
        );

        let (target, options) = self.call_request();

        match self.voice.start(self.session.run_id(), target, options).await {
            Ok(()) => StartOutcome::Connecting,
            Err(e) => {
                error!("Failed to start call: {:#}", e);
                // Nothing was said, so there is nothing to evaluate
                let termination = self
                    .finish("start failed")
                    .map(|_| TerminationAction::ReturnToLanding);
                StartOutcome::Failed { termination }
            }
        }
    }

    /// End the call on the user's request
    ///
    /// The stop command is sent before the local transition so an active
    /// provider call is never orphaned.
    pub async fn disconnect(&mut self) -> Option<TerminationAction> {
        if !self.session.status().in_call() {
            debug!(
                "Ignoring disconnect for session {}: no call in flight",
                self.config.session_id
            );
            return None;
        }

        info!("Disconnecting call for session {}", self.config.session_id);

        if let Err(e) = self.voice.stop().await {
            warn!("Failed to stop call: {:#}", e);
        }

        self.finish("disconnected")
    }

    /// Apply one provider event
    ///
    /// Events tagged with another call's id are late arrivals from an
    /// earlier run and are dropped.
    pub fn handle_event(&mut self, event: impl Into<CallEvent>) -> Option<TerminationAction> {
        let event = event.into();
        if !event.belongs_to(self.session.run_id()) {
            debug!(
                "Ignoring {} from earlier call {:?}",
                event.event.name(),
                event.call_id
            );
            return None;
        }

        let status = self.session.status();

        match event.event {
            VoiceEvent::CallStart => {
                if self.session.activate() {
                    info!("Call active for session {}", self.config.session_id);
                } else {
                    debug!("Ignoring call-start while {:?}", status);
                }
                None
            }
            VoiceEvent::CallEnd => self.finish("call ended"),
            VoiceEvent::Message(message) => {
                if !status.in_call() {
                    debug!("Ignoring message while {:?}", status);
                    return None;
                }
                if let Some(entry) = message.final_entry() {
                    debug!("Transcript [{:?}]: {}", entry.speaker, entry.text);
                    self.session.append(entry);
                }
                None
            }
            VoiceEvent::SpeechStart => {
                self.set_speaking(true);
                None
            }
            VoiceEvent::SpeechEnd => {
                self.set_speaking(false);
                None
            }
            VoiceEvent::Error { message } => {
                warn!(
                    "Voice provider error in session {}: {}",
                    self.config.session_id, message
                );
                None
            }
        }
    }

    /// Record where the termination action sent the user. Stale runs are ignored.
    pub fn record_navigation(&mut self, run_id: Uuid, target: NavigationTarget) -> bool {
        if run_id != self.session.run_id() {
            debug!("Ignoring navigation from stale run {}", run_id);
            return false;
        }
        self.navigation = Some(target);
        true
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.config.session_id.clone(),
            run_id: self.session.run_id(),
            mode: self.config.mode.kind(),
            status: self.session.status(),
            is_speaking: self.is_speaking,
            last_message: self.session.last_entry().map(|e| e.text.clone()),
            transcript_len: self.session.transcript().len(),
            navigation: self.navigation.clone(),
            started_at: self.session.started_at(),
            finished_at: self.session.finished_at(),
            duration_secs: self.session.duration_secs(),
        }
    }

    fn set_speaking(&mut self, speaking: bool) {
        if self.session.status().in_call() {
            self.is_speaking = speaking;
        }
    }

    fn finish(&mut self, reason: &str) -> Option<TerminationAction> {
        if self.session.finish() {
            self.is_speaking = false;
            info!(
                "Call run {} finished ({}) with {} transcript entries",
                self.session.run_id(),
                reason,
                self.session.transcript().len()
            );
        }

        if !self.session.claim_termination() {
            return None;
        }

        Some(self.termination_action())
    }

    fn termination_action(&self) -> TerminationAction {
        match &self.config.mode {
            CallMode::GeneratePractice => TerminationAction::ReturnToLanding,
            CallMode::ScriptedInterview(interview) => {
                TerminationAction::RequestFeedback(FeedbackRequest {
                    interview_id: interview.interview_id.clone(),
                    user_id: self.config.caller.user_id.clone(),
                    transcript: self.session.transcript().to_vec(),
                    feedback_id: interview.feedback_id.clone(),
                })
            }
        }
    }
}

/// Questions as a bulleted list, one `- question` per line
pub fn format_questions(questions: &[String]) -> String {
    questions
        .iter()
        .map(|q| format!("- {}", q))
        .collect::<Vec<_>>()
        .join("\n")
}
