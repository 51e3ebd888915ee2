use super::subscription::Subscription;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// What the voice provider should run for a call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallTarget {
    /// A provider-side workflow, referenced by id
    Workflow(String),
    /// An inline assistant definition
    Assistant(AssistantConfig),
}

/// Inline assistant definition used for scripted interviews
///
/// `system_prompt` may reference `{{questions}}`, which the provider
/// substitutes from the call's variable values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig {
    pub name: String,
    pub first_message: String,
    pub system_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcriber_language: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: "Interviewer".to_string(),
            first_message: "Hello! Thank you for taking the time to speak with me today.".to_string(),
            system_prompt: "You are a professional job interviewer. Ask the following questions one at a time:\n{{questions}}".to_string(),
            voice: None,
            transcriber_language: Some("en".to_string()),
        }
    }
}

/// Start options forwarded to the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartOptions {
    /// Substituted into the target's prompts
    pub variable_values: BTreeMap<String, String>,
}

impl StartOptions {
    pub fn with_variable(mut self, key: &str, value: impl Into<String>) -> Self {
        self.variable_values.insert(key.to_string(), value.into());
        self
    }
}

/// Realtime voice call provider
///
/// Implementations:
/// - `NatsVoiceService`: commands and events relayed over NATS
/// - `ScriptedVoiceService`: in-process fake driven by scripted events
#[async_trait::async_trait]
pub trait VoiceCallService: Send + Sync {
    /// Begin connecting a call. Returns once the provider accepted the command.
    ///
    /// Events for this call are tagged with `call_id`.
    async fn start(&self, call_id: Uuid, target: CallTarget, options: StartOptions) -> Result<()>;

    /// Request termination of the active call
    async fn stop(&self) -> Result<()>;

    /// Register for every event kind at once. Dropping the subscription unregisters it.
    fn subscribe(&self) -> Subscription;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Creates one voice service per session
#[async_trait::async_trait]
pub trait VoiceConnector: Send + Sync {
    async fn connect(&self, session_id: &str) -> Result<Arc<dyn VoiceCallService>>;
}
