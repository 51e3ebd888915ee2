//! HTTP API for the interview UI
//!
//! This module exposes the controls a call view needs:
//! - POST /sessions - Create a session (practice or scripted interview)
//! - POST /sessions/:id/start - Start a call
//! - POST /sessions/:id/disconnect - End a call
//! - GET /sessions/:id - Status, speaking flag, last message, navigation
//! - GET /sessions/:id/transcript - Transcript of the current call
//! - DELETE /sessions/:id - Tear down a session
//! - GET /users/:id - User lookup
//! - GET /users/:id/interviews - Interviews the user created
//! - GET /users/:id/available-interviews - Latest interviews from other users
//! - POST /interviews - Generate a new interview
//! - GET /interviews/:id - Interview details
//! - GET /interviews/:id/feedback?user_id= - Stored feedback
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::{
    AvailableInterviewsQuery, CreateSessionRequest, CreateSessionResponse, FeedbackQuery,
    StartCallResponse,
};
pub use routes::create_router;
pub use state::{AppState, SessionSettings};
