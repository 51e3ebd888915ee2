use crate::directory::Directory;
use crate::feedback::FeedbackGenerator;
use crate::generation::InterviewGenerator;
use crate::session::SessionHandle;
use crate::voice::{AssistantConfig, VoiceConnector};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Settings shared by every session the API creates
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub workflow_id: String,
    pub interviewer: AssistantConfig,
    pub call_timeout: Option<Duration>,
    /// How long a session lingers after navigating away; `None` keeps it until deleted
    pub reap_after: Option<Duration>,
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Live sessions (session_id → handle)
    pub sessions: Arc<RwLock<HashMap<String, Arc<SessionHandle>>>>,
    pub directory: Arc<dyn Directory>,
    pub voice: Arc<dyn VoiceConnector>,
    pub feedback: Arc<dyn FeedbackGenerator>,
    pub interviews: Arc<dyn InterviewGenerator>,
    pub settings: Arc<SessionSettings>,
}

impl AppState {
    pub fn new(
        directory: Arc<dyn Directory>,
        voice: Arc<dyn VoiceConnector>,
        feedback: Arc<dyn FeedbackGenerator>,
        interviews: Arc<dyn InterviewGenerator>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            directory,
            voice,
            feedback,
            interviews,
            settings: Arc::new(settings),
        }
    }

    pub async fn session(&self, session_id: &str) -> Option<Arc<SessionHandle>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Register a session and schedule its removal once the call view has
    /// navigated away and stayed idle for `reap_after`
    pub async fn insert_session(&self, handle: SessionHandle) {
        let session_id = handle.session_id().to_string();
        let mut snapshots = handle.watch();

        self.sessions
            .write()
            .await
            .insert(session_id.clone(), Arc::new(handle));

        let Some(grace) = self.settings.reap_after else {
            return;
        };
        let sessions = Arc::clone(&self.sessions);

        tokio::spawn(async move {
            loop {
                let closed = snapshots.wait_for(|s| s.navigation.is_some()).await.is_err();
                if closed {
                    // Deleted or shut down elsewhere
                    return;
                }

                tokio::time::sleep(grace).await;

                // A restart during the grace period clears the navigation
                let done = {
                    let snapshot = snapshots.borrow_and_update();
                    snapshot.navigation.is_some() && !snapshot.status.in_call()
                };
                if done {
                    break;
                }
            }

            let removed = sessions.write().await.remove(&session_id);
            if let Some(session) = removed {
                info!("Reaping session {} after navigation", session_id);
                if let Err(e) = session.shutdown().await {
                    warn!("Failed to shut down session {}: {:#}", session_id, e);
                }
            }
        });
    }
}
