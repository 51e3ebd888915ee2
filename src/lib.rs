pub mod config;
pub mod directory;
pub mod feedback;
pub mod generation;
pub mod http;
pub mod nats;
pub mod navigation;
pub mod replay;
pub mod session;
pub mod voice;

pub use config::Config;
pub use directory::{Directory, FeedbackRecord, InMemoryDirectory, Interview, User};
pub use feedback::{FeedbackGenerator, FeedbackRequest, FeedbackResponse};
pub use generation::{GenerateInterviewRequest, InterviewGenerator};
pub use http::{create_router, AppState, SessionSettings};
pub use nats::NatsClient;
pub use navigation::{NavigationTarget, Navigator, RecordingNavigator};
pub use session::{
    CallMode, CallStatus, CallerIdentity, InterviewContext, SessionConfig, SessionController,
    SessionHandle, SessionSnapshot, Speaker, TerminationAction, TranscriptEntry,
};
pub use voice::{
    AssistantConfig, CallEvent, CallTarget, ScriptedVoiceService, StartOptions, VoiceCallService, VoiceEvent,
};
