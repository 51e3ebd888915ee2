// Tests for offline fixture replay

use interview_agent::replay::{run_replay, ReplayFixture};
use interview_agent::session::StartReply;
use interview_agent::voice::{AssistantConfig, CallTarget, VoiceCommand};
use interview_agent::{CallStatus, NavigationTarget};
use std::io::Write;

#[tokio::test]
async fn test_replay_scripted_interview_fixture() {
    let fixture = ReplayFixture::load("tests/fixtures/scripted-interview.json").unwrap();

    let report = run_replay(fixture, "wf-123", AssistantConfig::default())
        .await
        .unwrap();

    assert_eq!(report.status, CallStatus::Finished);
    assert_eq!(report.start_replies, vec![StartReply::Connecting]);
    assert_eq!(report.transcript.len(), 2);
    assert_eq!(report.transcript[0].text, "Tell me about yourself");
    assert_eq!(report.feedback_requests.len(), 1);
    assert_eq!(
        report.navigation,
        Some(NavigationTarget::FeedbackDetail {
            interview_id: "interview-1".to_string()
        })
    );

    match &report.commands[0] {
        VoiceCommand::Start { options, .. } => assert_eq!(
            options.variable_values["questions"],
            "- Tell me about yourself\n- Explain REST"
        ),
        other => panic!("expected start command, got {:?}", other),
    }
}

#[tokio::test]
async fn test_replay_practice_without_feedback_response() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "user_id": "user-1",
            "user_name": "Ada",
            "steps": ["start", {{ "emit": {{ "event": "call-start" }} }}, "disconnect"]
        }}"#
    )
    .unwrap();

    let fixture = ReplayFixture::load(file.path()).unwrap();
    let report = run_replay(fixture, "wf-123", AssistantConfig::default())
        .await
        .unwrap();

    assert_eq!(report.status, CallStatus::Finished);
    assert!(report.feedback_requests.is_empty());
    assert_eq!(report.navigation, Some(NavigationTarget::Landing));
    assert_eq!(report.commands.len(), 2);
    assert!(matches!(
        &report.commands[0],
        VoiceCommand::Start { target: CallTarget::Workflow(id), .. } if id == "wf-123"
    ));
    assert_eq!(report.commands[1], VoiceCommand::Stop);
}

#[tokio::test]
async fn test_replay_unfinished_call_has_no_navigation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "user_id": "u", "user_name": "U", "steps": ["start", {{ "emit": {{ "event": "call-start" }} }}] }}"#
    )
    .unwrap();

    let report = run_replay(
        ReplayFixture::load(file.path()).unwrap(),
        "wf",
        AssistantConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.status, CallStatus::Active);
    assert_eq!(report.navigation, None);
}

#[test]
fn test_invalid_fixture_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();

    let err = ReplayFixture::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("Invalid fixture"));
}
