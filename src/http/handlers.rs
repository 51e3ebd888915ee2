use super::state::AppState;
use crate::generation::{GenerateInterviewRequest, GenerateInterviewResponse};
use crate::navigation::RecordingNavigator;
use crate::session::{
    CallMode, CallerIdentity, InterviewContext, ModeKind, SessionConfig, SessionController,
    SessionHandle, StartReply,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub user_id: String,

    /// Stored interview to run; omitted for practice generation
    pub interview_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub mode: ModeKind,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartCallResponse {
    pub session_id: String,
    pub status: StartReply,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailableInterviewsQuery {
    /// Maximum number of interviews returned (default 20)
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedbackQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

const DEFAULT_AVAILABLE_LIMIT: usize = 20;

fn lookup_failed(what: &str, e: anyhow::Error) -> Response {
    error!("Failed to look up {}: {:#}", what, e);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn session_not_found(session_id: &str) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        format!("Session {} not found", session_id),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sessions
/// Create a session for a user, optionally bound to a stored interview
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    let user = match state.directory.user(&req.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return error_response(
                StatusCode::NOT_FOUND,
                format!("User {} not found", req.user_id),
            )
        }
        Err(e) => {
            error!("Failed to look up user: {:#}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let mode = match req.interview_id {
        None => CallMode::GeneratePractice,
        Some(interview_id) => {
            let interview = match state.directory.interview(&interview_id).await {
                Ok(Some(interview)) => interview,
                Ok(None) => {
                    return error_response(
                        StatusCode::NOT_FOUND,
                        format!("Interview {} not found", interview_id),
                    )
                }
                Err(e) => {
                    error!("Failed to look up interview: {:#}", e);
                    return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
                }
            };

            let feedback_id = match state.directory.feedback_id(&interview.id, &user.id).await {
                Ok(id) => id,
                Err(e) => {
                    error!("Failed to look up feedback: {:#}", e);
                    return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
                }
            };

            CallMode::ScriptedInterview(InterviewContext {
                interview_id: interview.id,
                feedback_id,
                questions: interview.questions,
            })
        }
    };

    let caller = CallerIdentity {
        user_id: user.id,
        user_name: user.name,
    };

    let config = SessionConfig::new(caller, mode)
        .with_workflow(state.settings.workflow_id.clone())
        .with_interviewer(state.settings.interviewer.clone())
        .with_call_timeout(state.settings.call_timeout);
    let session_id = config.session_id.clone();
    let mode = config.mode.kind();

    let voice = match state.voice.connect(&session_id).await {
        Ok(voice) => voice,
        Err(e) => {
            error!("Failed to connect voice provider: {:#}", e);
            return error_response(
                StatusCode::BAD_GATEWAY,
                format!("Failed to connect voice provider: {}", e),
            );
        }
    };

    let controller = SessionController::new(config, voice);
    let handle = SessionHandle::spawn(
        controller,
        Arc::clone(&state.feedback),
        Arc::new(RecordingNavigator::new()),
    );

    state.insert_session(handle).await;

    info!("Created session {}", session_id);

    (
        StatusCode::CREATED,
        Json(CreateSessionResponse { session_id, mode }),
    )
        .into_response()
}

/// POST /sessions/:session_id/start
/// Start a call; 409 while one is already connecting or active
pub async fn start_call(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let Some(session) = state.session(&session_id).await else {
        return session_not_found(&session_id);
    };

    match session.start().await {
        Ok(status) => {
            let code = match status {
                StartReply::Connecting => StatusCode::OK,
                StartReply::AlreadyInProgress => StatusCode::CONFLICT,
                StartReply::Failed => StatusCode::BAD_GATEWAY,
            };
            (code, Json(StartCallResponse { session_id, status })).into_response()
        }
        Err(e) => {
            error!("Failed to start call: {:#}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// POST /sessions/:session_id/disconnect
/// End the current call
pub async fn disconnect_call(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let Some(session) = state.session(&session_id).await else {
        return session_not_found(&session_id);
    };

    match session.disconnect().await {
        Ok(()) => (StatusCode::OK, Json(session.snapshot())).into_response(),
        Err(e) => {
            error!("Failed to disconnect call: {:#}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /sessions/:session_id
/// Current status of a session
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.session(&session_id).await {
        Some(session) => (StatusCode::OK, Json(session.snapshot())).into_response(),
        None => session_not_found(&session_id),
    }
}

/// GET /sessions/:session_id/transcript
/// Transcript of the current call (accumulated so far)
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let Some(session) = state.session(&session_id).await else {
        return session_not_found(&session_id);
    };

    match session.transcript().await {
        Ok(transcript) => (StatusCode::OK, Json(transcript)).into_response(),
        Err(e) => {
            error!("Failed to read transcript: {:#}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// DELETE /sessions/:session_id
/// Tear down a session and release its provider subscription
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let session = state.sessions.write().await.remove(&session_id);

    match session {
        Some(session) => {
            if let Err(e) = session.shutdown().await {
                error!("Failed to shut down session {}: {:#}", session_id, e);
            }
            info!("Deleted session {}", session_id);
            StatusCode::NO_CONTENT.into_response()
        }
        None => session_not_found(&session_id),
    }
}

/// GET /users/:user_id
/// Identity of a user, as shown in the page header
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    match state.directory.user(&user_id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(user)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, format!("User {} not found", user_id)),
        Err(e) => lookup_failed("user", e),
    }
}

/// GET /users/:user_id/interviews
/// Interviews the user created, newest first
pub async fn list_user_interviews(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    match state.directory.interviews_by_user(&user_id).await {
        Ok(interviews) => (StatusCode::OK, Json(interviews)).into_response(),
        Err(e) => lookup_failed("interviews", e),
    }
}

/// GET /users/:user_id/available-interviews?limit=N
/// Newest finalized interviews from other users
pub async fn list_available_interviews(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<AvailableInterviewsQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(DEFAULT_AVAILABLE_LIMIT);

    match state.directory.latest_interviews(&user_id, limit).await {
        Ok(interviews) => (StatusCode::OK, Json(interviews)).into_response(),
        Err(e) => lookup_failed("interviews", e),
    }
}

/// GET /interviews/:interview_id
pub async fn get_interview(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
) -> impl IntoResponse {
    match state.directory.interview(&interview_id).await {
        Ok(Some(interview)) => (StatusCode::OK, Json(interview)).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("Interview {} not found", interview_id),
        ),
        Err(e) => lookup_failed("interview", e),
    }
}

/// GET /interviews/:interview_id/feedback?user_id=...
/// Feedback detail view a finished scripted interview navigates to
pub async fn get_feedback(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
    Query(query): Query<FeedbackQuery>,
) -> impl IntoResponse {
    match state.directory.feedback_for(&interview_id, &query.user_id).await {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!(
                "No feedback for interview {} and user {}",
                interview_id, query.user_id
            ),
        ),
        Err(e) => lookup_failed("feedback", e),
    }
}

/// POST /interviews
/// Validate an interview description and hand it to the generation backend
pub async fn generate_interview(
    State(state): State<AppState>,
    Json(req): Json<GenerateInterviewRequest>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        warn!("Rejected interview request: {}", e);
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string());
    }

    match state.directory.user(&req.userid).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return error_response(StatusCode::NOT_FOUND, format!("User {} not found", req.userid))
        }
        Err(e) => return lookup_failed("user", e),
    }

    match state.interviews.generate(req).await {
        Ok(response) if response.success => {
            info!("Interview generated: {:?}", response.interview_id);
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Ok(response) => {
            warn!("Interview generation reported failure");
            (StatusCode::BAD_GATEWAY, Json(response)).into_response()
        }
        Err(e) => {
            error!("Interview generation failed: {:#}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(GenerateInterviewResponse::failed()),
            )
                .into_response()
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
