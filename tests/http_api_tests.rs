// HTTP API tests
//
// The router is exercised in-process with `tower::ServiceExt::oneshot`,
// backed by the scripted voice connector and a fixed feedback answer.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use interview_agent::directory::{FeedbackRecord, InMemoryDirectory, Interview, User};
use interview_agent::feedback::FixedFeedbackGenerator;
use interview_agent::generation::{FixedInterviewGenerator, GenerateInterviewResponse, InterviewType};
use interview_agent::http::{CreateSessionResponse, StartCallResponse};
use interview_agent::session::{ModeKind, StartReply};
use interview_agent::voice::{ScriptedVoiceConnector, VoiceCommand, VoiceEvent};
use interview_agent::{
    create_router, AppState, AssistantConfig, CallStatus, NavigationTarget, SessionSettings,
    SessionSnapshot, Speaker, TranscriptEntry,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    voice: Arc<ScriptedVoiceConnector>,
    feedback: Arc<FixedFeedbackGenerator>,
    interviews: Arc<FixedInterviewGenerator>,
}

async fn test_app() -> TestApp {
    test_app_with(None).await
}

fn interview(id: &str, user_id: &str, created_at: &str) -> Interview {
    Interview {
        id: id.to_string(),
        user_id: user_id.to_string(),
        role: "Frontend Developer".to_string(),
        interview_type: "technical".to_string(),
        level: "Mid".to_string(),
        techstack: vec!["React".to_string()],
        questions: vec!["Tell me about yourself".to_string(), "Explain REST".to_string()],
        finalized: true,
        created_at: Some(created_at.parse().unwrap()),
    }
}

async fn test_app_with(reap_after: Option<Duration>) -> TestApp {
    let directory = InMemoryDirectory::new();
    directory
        .insert_user(User {
            id: "user-1".to_string(),
            name: "Ada".to_string(),
            email: None,
        })
        .await;
    directory
        .insert_user(User {
            id: "user-2".to_string(),
            name: "Grace".to_string(),
            email: None,
        })
        .await;
    directory
        .insert_interview(interview("interview-1", "user-1", "2025-01-01T10:00:00Z"))
        .await;
    directory
        .insert_interview(interview("interview-2", "user-2", "2025-02-01T10:00:00Z"))
        .await;
    directory
        .insert_interview(interview("interview-3", "user-2", "2025-03-01T10:00:00Z"))
        .await;
    directory
        .insert_feedback(FeedbackRecord {
            id: "fb-previous".to_string(),
            interview_id: "interview-1".to_string(),
            user_id: "user-1".to_string(),
            total_score: Some(68),
            final_assessment: Some("Good grasp of the basics".to_string()),
            ..Default::default()
        })
        .await;

    let voice = Arc::new(ScriptedVoiceConnector::new());
    let feedback = Arc::new(FixedFeedbackGenerator::succeeding("fb1"));
    let interviews = Arc::new(FixedInterviewGenerator::responding(
        GenerateInterviewResponse::created("interview-new"),
    ));

    let state = AppState::new(
        Arc::new(directory),
        voice.clone(),
        feedback.clone(),
        interviews.clone(),
        SessionSettings {
            workflow_id: "wf-123".to_string(),
            interviewer: AssistantConfig::default(),
            call_timeout: None,
            reap_after,
        },
    );

    TestApp {
        router: create_router(state),
        voice,
        feedback,
        interviews,
    }
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn parse<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).unwrap()
}

async fn create(app: &TestApp, body: serde_json::Value) -> CreateSessionResponse {
    let (status, bytes) = send(&app.router, Method::POST, "/sessions", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    parse(&bytes)
}

async fn wait_for_navigation(app: &TestApp, session_id: &str) -> SessionSnapshot {
    for _ in 0..100 {
        let (_, bytes) = send(&app.router, Method::GET, &format!("/sessions/{}", session_id), None).await;
        let snapshot: SessionSnapshot = parse(&bytes);
        if snapshot.navigation.is_some() {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("session {} never navigated", session_id);
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app().await;
    let (status, body) = send(&app.router, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_scripted_interview_over_http() {
    let app = test_app().await;
    let created = create(
        &app,
        serde_json::json!({ "user_id": "user-1", "interview_id": "interview-1" }),
    )
    .await;
    assert_eq!(created.mode, ModeKind::ScriptedInterview);
    let id = created.session_id;

    let (status, bytes) = send(&app.router, Method::POST, &format!("/sessions/{}/start", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let started: StartCallResponse = parse(&bytes);
    assert_eq!(started.status, StartReply::Connecting);

    let voice = app.voice.service(&id).expect("voice service for session");
    voice.emit_all(vec![
        VoiceEvent::CallStart,
        VoiceEvent::final_transcript(Speaker::Assistant, "Tell me about yourself"),
        VoiceEvent::final_transcript(Speaker::User, "I am..."),
    ]);

    let (status, bytes) = send(&app.router, Method::GET, &format!("/sessions/{}/transcript", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let transcript: Vec<TranscriptEntry> = parse(&bytes);
    assert_eq!(transcript.len(), 2);

    let (status, bytes) = send(&app.router, Method::POST, &format!("/sessions/{}/disconnect", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let snapshot: SessionSnapshot = parse(&bytes);
    assert_eq!(snapshot.status, CallStatus::Finished);
    assert_eq!(voice.stop_count(), 1);

    let snapshot = wait_for_navigation(&app, &id).await;
    assert_eq!(
        snapshot.navigation,
        Some(NavigationTarget::FeedbackDetail {
            interview_id: "interview-1".to_string()
        })
    );

    let requests = app.feedback.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].feedback_id.as_deref(), Some("fb-previous"));
    assert_eq!(requests[0].transcript.len(), 2);
}

#[tokio::test]
async fn test_practice_session_over_http() {
    let app = test_app().await;
    let created = create(&app, serde_json::json!({ "user_id": "user-1" })).await;
    assert_eq!(created.mode, ModeKind::GeneratePractice);
    let id = created.session_id;

    send(&app.router, Method::POST, &format!("/sessions/{}/start", id), None).await;

    let voice = app.voice.service(&id).unwrap();
    voice.emit_all(vec![VoiceEvent::CallStart, VoiceEvent::CallEnd]);

    let snapshot = wait_for_navigation(&app, &id).await;
    assert_eq!(snapshot.navigation, Some(NavigationTarget::Landing));
    assert_eq!(app.feedback.request_count(), 0);

    match &voice.commands()[0] {
        VoiceCommand::Start { options, .. } => {
            assert_eq!(options.variable_values["username"], "Ada");
        }
        other => panic!("expected start command, got {:?}", other),
    }
}

#[tokio::test]
async fn test_second_start_conflicts() {
    let app = test_app().await;
    let id = create(&app, serde_json::json!({ "user_id": "user-1" })).await.session_id;
    let uri = format!("/sessions/{}/start", id);

    let (first, _) = send(&app.router, Method::POST, &uri, None).await;
    let (second, bytes) = send(&app.router, Method::POST, &uri, None).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::CONFLICT);
    let reply: StartCallResponse = parse(&bytes);
    assert_eq!(reply.status, StartReply::AlreadyInProgress);
}

#[tokio::test]
async fn test_unknown_user_and_interview() {
    let app = test_app().await;

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/sessions",
        Some(serde_json::json!({ "user_id": "nobody" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/sessions",
        Some(serde_json::json!({ "user_id": "user-1", "interview_id": "missing" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_session_routes() {
    let app = test_app().await;

    for (method, uri) in [
        (Method::GET, "/sessions/nope"),
        (Method::GET, "/sessions/nope/transcript"),
        (Method::POST, "/sessions/nope/start"),
        (Method::POST, "/sessions/nope/disconnect"),
        (Method::DELETE, "/sessions/nope"),
    ] {
        let (status, _) = send(&app.router, method.clone(), uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn test_delete_session_unsubscribes() {
    let app = test_app().await;
    let id = create(&app, serde_json::json!({ "user_id": "user-1" })).await.session_id;
    let voice = app.voice.service(&id).unwrap();
    assert_eq!(voice.subscriber_count(), 1);

    let (status, _) = send(&app.router, Method::DELETE, &format!("/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(voice.subscriber_count(), 0);

    let (status, _) = send(&app.router, Method::GET, &format!("/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_finished_session_is_reaped_after_navigation() {
    let app = test_app_with(Some(Duration::from_millis(50))).await;
    let id = create(&app, serde_json::json!({ "user_id": "user-1" })).await.session_id;

    send(&app.router, Method::POST, &format!("/sessions/{}/start", id), None).await;
    let voice = app.voice.service(&id).unwrap();
    voice.emit_all(vec![VoiceEvent::CallStart, VoiceEvent::CallEnd]);
    wait_for_navigation(&app, &id).await;

    let uri = format!("/sessions/{}", id);
    let mut status = StatusCode::OK;
    for _ in 0..100 {
        status = send(&app.router, Method::GET, &uri, None).await.0;
        if status == StatusCode::NOT_FOUND && voice.subscriber_count() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(voice.subscriber_count(), 0);
}

#[tokio::test]
async fn test_active_session_is_not_reaped() {
    let app = test_app_with(Some(Duration::from_millis(20))).await;
    let id = create(&app, serde_json::json!({ "user_id": "user-1" })).await.session_id;

    send(&app.router, Method::POST, &format!("/sessions/{}/start", id), None).await;
    app.voice.service(&id).unwrap().emit(VoiceEvent::CallStart);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (status, bytes) = send(&app.router, Method::GET, &format!("/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let snapshot: SessionSnapshot = parse(&bytes);
    assert_eq!(snapshot.status, CallStatus::Active);
}

#[tokio::test]
async fn test_user_lookup() {
    let app = test_app().await;

    let (status, bytes) = send(&app.router, Method::GET, "/users/user-1", None).await;
    assert_eq!(status, StatusCode::OK);
    let user: User = parse(&bytes);
    assert_eq!(user.name, "Ada");

    let (status, _) = send(&app.router, Method::GET, "/users/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_landing_page_interview_lists() {
    let app = test_app().await;

    let (status, bytes) = send(&app.router, Method::GET, "/users/user-2/interviews", None).await;
    assert_eq!(status, StatusCode::OK);
    let own: Vec<Interview> = parse(&bytes);
    let ids: Vec<&str> = own.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["interview-3", "interview-2"]);

    let (_, bytes) = send(&app.router, Method::GET, "/users/user-1/available-interviews", None).await;
    let available: Vec<Interview> = parse(&bytes);
    assert_eq!(available.len(), 2);
    assert!(available.iter().all(|i| i.user_id != "user-1"));

    let (_, bytes) = send(
        &app.router,
        Method::GET,
        "/users/user-1/available-interviews?limit=1",
        None,
    )
    .await;
    let limited: Vec<Interview> = parse(&bytes);
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].id, "interview-3");
}

#[tokio::test]
async fn test_interview_and_feedback_detail() {
    let app = test_app().await;

    let (status, bytes) = send(&app.router, Method::GET, "/interviews/interview-1", None).await;
    assert_eq!(status, StatusCode::OK);
    let found: Interview = parse(&bytes);
    assert_eq!(found.questions.len(), 2);

    let (status, bytes) = send(
        &app.router,
        Method::GET,
        "/interviews/interview-1/feedback?user_id=user-1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let record: FeedbackRecord = parse(&bytes);
    assert_eq!(record.id, "fb-previous");
    assert_eq!(record.total_score, Some(68));

    let (status, _) = send(
        &app.router,
        Method::GET,
        "/interviews/interview-1/feedback?user_id=user-2",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app.router, Method::GET, "/interviews/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generate_interview_is_forwarded() {
    let app = test_app().await;
    let body = serde_json::json!({
        "type": "mixed",
        "role": "Backend Engineer",
        "level": "Senior",
        "techstack": "Rust, Postgres",
        "amount": "5",
        "userid": "user-1"
    });

    let (status, bytes) = send(&app.router, Method::POST, "/interviews", Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
    let response: GenerateInterviewResponse = parse(&bytes);
    assert_eq!(response.interview_id.as_deref(), Some("interview-new"));

    let requests = app.interviews.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].interview_type, InterviewType::Mixed);
    assert_eq!(requests[0].userid, "user-1");
}

#[tokio::test]
async fn test_generate_interview_validation() {
    let app = test_app().await;
    let valid = serde_json::json!({
        "type": "technical",
        "role": "Backend Engineer",
        "level": "Senior",
        "techstack": "Rust",
        "amount": "5",
        "userid": "user-1"
    });

    let mut short_role = valid.clone();
    short_role["role"] = serde_json::json!("B");
    let (status, _) = send(&app.router, Method::POST, "/interviews", Some(short_role)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let mut too_many = valid.clone();
    too_many["amount"] = serde_json::json!("50");
    let (status, _) = send(&app.router, Method::POST, "/interviews", Some(too_many)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let mut bad_type = valid.clone();
    bad_type["type"] = serde_json::json!("casual");
    let (status, _) = send(&app.router, Method::POST, "/interviews", Some(bad_type)).await;
    assert!(status.is_client_error());

    let mut unknown_user = valid;
    unknown_user["userid"] = serde_json::json!("nobody");
    let (status, _) = send(&app.router, Method::POST, "/interviews", Some(unknown_user)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert!(app.interviews.requests().is_empty());
}
