use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

/// Where the user is sent once a call is over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum NavigationTarget {
    Landing,
    FeedbackDetail { interview_id: String },
}

impl NavigationTarget {
    pub fn path(&self) -> String {
        match self {
            NavigationTarget::Landing => "/".to_string(),
            NavigationTarget::FeedbackDetail { interview_id } => {
                format!("/interview/{}/feedback", interview_id)
            }
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, target: NavigationTarget);
}

/// Navigator that keeps the history of targets it was sent to
#[derive(Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<NavigationTarget>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<NavigationTarget> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<NavigationTarget> {
        self.lock().last().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<NavigationTarget>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: NavigationTarget) {
        info!("Navigating to {}", target.path());
        self.lock().push(target);
    }
}
