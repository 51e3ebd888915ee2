use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session lifecycle
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/:session_id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        // Call control
        .route("/sessions/:session_id/start", post(handlers::start_call))
        .route(
            "/sessions/:session_id/disconnect",
            post(handlers::disconnect_call),
        )
        // Transcript
        .route(
            "/sessions/:session_id/transcript",
            get(handlers::get_transcript),
        )
        // Directory
        .route("/users/:user_id", get(handlers::get_user))
        .route(
            "/users/:user_id/interviews",
            get(handlers::list_user_interviews),
        )
        .route(
            "/users/:user_id/available-interviews",
            get(handlers::list_available_interviews),
        )
        .route("/interviews", post(handlers::generate_interview))
        .route("/interviews/:interview_id", get(handlers::get_interview))
        .route(
            "/interviews/:interview_id/feedback",
            get(handlers::get_feedback),
        )
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        // The call view is served from another origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
