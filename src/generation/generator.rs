use super::messages::{GenerateInterviewRequest, GenerateInterviewResponse};
use crate::nats::NatsClient;
use anyhow::{Context, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::info;

/// Backend that turns an interview description into a stored interview
#[async_trait::async_trait]
pub trait InterviewGenerator: Send + Sync {
    async fn generate(&self, request: GenerateInterviewRequest) -> Result<GenerateInterviewResponse>;
}

/// Interview generator reached through NATS request/reply
pub struct NatsInterviewGenerator {
    client: Arc<NatsClient>,
    subject: String,
    timeout: Duration,
}

impl NatsInterviewGenerator {
    pub fn new(client: Arc<NatsClient>, subject: String, timeout: Duration) -> Self {
        Self {
            client,
            subject,
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl InterviewGenerator for NatsInterviewGenerator {
    async fn generate(&self, request: GenerateInterviewRequest) -> Result<GenerateInterviewResponse> {
        info!(
            "Requesting {} {:?} interview for {} ({} questions)",
            request.level, request.interview_type, request.userid, request.amount
        );

        tokio::time::timeout(
            self.timeout,
            self.client
                .request_json::<_, GenerateInterviewResponse>(&self.subject, &request),
        )
        .await
        .with_context(|| format!("Interview generation timed out after {:?}", self.timeout))?
    }
}

/// Generator that always gives the same answer and records what it was asked
pub struct FixedInterviewGenerator {
    response: GenerateInterviewResponse,
    requests: Mutex<Vec<GenerateInterviewRequest>>,
}

impl FixedInterviewGenerator {
    pub fn responding(response: GenerateInterviewResponse) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerateInterviewRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait::async_trait]
impl InterviewGenerator for FixedInterviewGenerator {
    async fn generate(&self, request: GenerateInterviewRequest) -> Result<GenerateInterviewResponse> {
        lock(&self.requests).push(request);
        Ok(self.response.clone())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
