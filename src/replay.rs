//! Offline replay of a recorded call
//!
//! A fixture lists user actions and provider events in order. Replaying it
//! drives a real `SessionHandle` against the scripted provider and a fixed
//! feedback answer, then reports what the session did.

use crate::feedback::{FeedbackRequest, FeedbackResponse, FixedFeedbackGenerator};
use crate::navigation::{NavigationTarget, RecordingNavigator};
use crate::session::{
    CallMode, CallStatus, CallerIdentity, InterviewContext, SessionConfig, SessionController,
    SessionHandle, StartReply, TranscriptEntry,
};
use crate::voice::{AssistantConfig, ScriptedVoiceService, VoiceCommand, VoiceEvent};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const NAVIGATION_WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayStep {
    Start,
    Disconnect,
    Emit(VoiceEvent),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayFixture {
    pub user_id: String,
    pub user_name: String,

    /// Present for scripted interviews, absent for practice generation
    #[serde(default)]
    pub interview: Option<InterviewContext>,

    pub steps: Vec<ReplayStep>,

    /// What the feedback generator answers; failure when omitted
    #[serde(default)]
    pub feedback_response: Option<FeedbackResponse>,
}

impl ReplayFixture {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid fixture {}", path.display()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub status: CallStatus,
    pub start_replies: Vec<StartReply>,
    pub commands: Vec<VoiceCommand>,
    pub transcript: Vec<TranscriptEntry>,
    pub feedback_requests: Vec<FeedbackRequest>,
    pub navigation: Option<NavigationTarget>,
}

pub async fn run_replay(
    fixture: ReplayFixture,
    workflow_id: &str,
    interviewer: AssistantConfig,
) -> Result<ReplayReport> {
    let mode = match fixture.interview {
        Some(interview) => CallMode::ScriptedInterview(interview),
        None => CallMode::GeneratePractice,
    };
    let caller = CallerIdentity {
        user_id: fixture.user_id,
        user_name: fixture.user_name,
    };
    let config = SessionConfig::new(caller, mode)
        .with_workflow(workflow_id)
        .with_interviewer(interviewer);

    let voice = Arc::new(ScriptedVoiceService::new());
    let generator = Arc::new(FixedFeedbackGenerator::responding(
        fixture.feedback_response.unwrap_or_else(FeedbackResponse::failed),
    ));

    let handle = SessionHandle::spawn(
        SessionController::new(config, voice.clone()),
        generator.clone(),
        Arc::new(RecordingNavigator::new()),
    );

    info!("Replaying {} steps", fixture.steps.len());

    let mut start_replies = Vec::new();
    for step in fixture.steps {
        match step {
            ReplayStep::Start => start_replies.push(handle.start().await?),
            ReplayStep::Disconnect => handle.disconnect().await?,
            ReplayStep::Emit(event) => {
                voice.emit(event);
            }
        }
    }

    // Drains every emitted event before answering
    let transcript = handle.transcript().await?;
    let status = handle.snapshot().status;

    let navigation = if status == CallStatus::Finished {
        let target = tokio::time::timeout(NAVIGATION_WAIT, handle.wait_for_navigation())
            .await
            .context("Timed out waiting for the call to navigate")??;
        Some(target)
    } else {
        None
    };

    handle.shutdown().await?;

    Ok(ReplayReport {
        status,
        start_replies,
        commands: voice.commands(),
        transcript,
        feedback_requests: generator.requests(),
        navigation,
    })
}
