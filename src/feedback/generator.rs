use super::messages::{FeedbackRequest, FeedbackResponse};
use crate::nats::NatsClient;
use anyhow::{Context, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::info;

/// Produces an evaluation for a finished interview transcript
#[async_trait::async_trait]
pub trait FeedbackGenerator: Send + Sync {
    async fn create_feedback(&self, request: FeedbackRequest) -> Result<FeedbackResponse>;
}

/// Feedback generator reached through NATS request/reply
pub struct NatsFeedbackGenerator {
    client: Arc<NatsClient>,
    subject: String,
    timeout: Duration,
}

impl NatsFeedbackGenerator {
    pub fn new(client: Arc<NatsClient>, subject: String, timeout: Duration) -> Self {
        Self {
            client,
            subject,
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl FeedbackGenerator for NatsFeedbackGenerator {
    async fn create_feedback(&self, request: FeedbackRequest) -> Result<FeedbackResponse> {
        info!(
            "Requesting feedback for interview {} ({} transcript entries)",
            request.interview_id,
            request.transcript.len()
        );

        tokio::time::timeout(
            self.timeout,
            self.client.request_json::<_, FeedbackResponse>(&self.subject, &request),
        )
        .await
        .with_context(|| format!("Feedback request timed out after {:?}", self.timeout))?
    }
}

#[derive(Debug, Clone)]
enum FixedReply {
    Respond(FeedbackResponse),
    Fail(String),
}

/// Generator that always gives the same answer and records what it was asked
pub struct FixedFeedbackGenerator {
    reply: FixedReply,
    requests: Mutex<Vec<FeedbackRequest>>,
}

impl FixedFeedbackGenerator {
    pub fn responding(response: FeedbackResponse) -> Self {
        Self {
            reply: FixedReply::Respond(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding(feedback_id: &str) -> Self {
        Self::responding(FeedbackResponse::succeeded(feedback_id))
    }

    /// Every request errors instead of answering
    pub fn erroring(message: &str) -> Self {
        Self {
            reply: FixedReply::Fail(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<FeedbackRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait::async_trait]
impl FeedbackGenerator for FixedFeedbackGenerator {
    async fn create_feedback(&self, request: FeedbackRequest) -> Result<FeedbackResponse> {
        lock(&self.requests).push(request);

        match &self.reply {
            FixedReply::Respond(response) => Ok(response.clone()),
            FixedReply::Fail(message) => anyhow::bail!("{}", message),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
