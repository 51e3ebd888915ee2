use crate::session::TranscriptEntry;
use serde::{Deserialize, Serialize};

/// Request sent to the feedback generator once a scripted interview ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub interview_id: String,
    pub user_id: String,
    pub transcript: Vec<TranscriptEntry>,

    /// Existing feedback record to overwrite, if the interview was taken before
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_id: Option<String>,
}

impl FeedbackResponse {
    pub fn succeeded(feedback_id: impl Into<String>) -> Self {
        Self {
            success: true,
            feedback_id: Some(feedback_id.into()),
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            feedback_id: None,
        }
    }

    /// A response only counts when it is flagged successful and names the record
    pub fn is_usable(&self) -> bool {
        self.success && self.feedback_id.is_some()
    }
}
