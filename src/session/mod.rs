//! Call session management
//!
//! This module provides the `SessionController` that manages:
//! - Call lifecycle (idle, connecting, active, finished)
//! - Transcript accumulation from provider events
//! - The one-shot termination action (feedback request or return home)
//! - A single-task event loop (`SessionHandle`) for hosting a controller

mod config;
mod controller;
mod handle;
mod session;
mod stats;
mod termination;

pub use config::{CallMode, CallerIdentity, InterviewContext, ModeKind, SessionConfig};
pub use controller::{format_questions, SessionController, StartOutcome};
pub use handle::{SessionHandle, StartReply};
pub use session::{CallSession, CallStatus};
pub use stats::{SessionSnapshot, Speaker, TranscriptEntry};
pub use termination::{execute_termination, TerminationAction};
