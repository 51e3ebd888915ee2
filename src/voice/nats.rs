use super::events::CallEvent;
use super::service::{CallTarget, StartOptions, VoiceCallService, VoiceConnector};
use super::subscription::{EventBus, Subscription};
use crate::nats::messages::{events_subject, start_subject, stop_subject};
use crate::nats::{NatsClient, StartCallCommand, StopCallCommand};
use anyhow::{Context, Result};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

/// Voice provider reached through a NATS relay
///
/// Commands go out on `voice.call.<session>.{start,stop}`; provider events
/// come back on `voice.events.<session>` and are fanned out to subscribers.
pub struct NatsVoiceService {
    client: Arc<NatsClient>,
    session_id: String,
    bus: EventBus,
    pump: JoinHandle<()>,
}

impl NatsVoiceService {
    pub async fn new(client: Arc<NatsClient>, session_id: String) -> Result<Self> {
        let mut events = client
            .subscribe(&events_subject(&session_id))
            .await
            .context("Failed to subscribe to voice events")?;

        let bus = EventBus::new();
        let pump_bus = bus.clone();
        let pump_session = session_id.clone();

        let pump = tokio::spawn(async move {
            info!("Voice event pump started for {}", pump_session);

            while let Some(msg) = events.next().await {
                match serde_json::from_slice::<CallEvent>(&msg.payload) {
                    Ok(event) => {
                        pump_bus.publish(event);
                    }
                    Err(e) => {
                        warn!("Failed to parse voice event: {}", e);
                    }
                }
            }

            info!("Voice event pump stopped for {}", pump_session);
        });

        Ok(Self {
            client,
            session_id,
            bus,
            pump,
        })
    }
}

#[async_trait::async_trait]
impl VoiceCallService for NatsVoiceService {
    async fn start(&self, call_id: Uuid, target: CallTarget, options: StartOptions) -> Result<()> {
        let command = StartCallCommand {
            session_id: self.session_id.clone(),
            call_id,
            target,
            variable_values: options.variable_values,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        self.client
            .publish_json(&start_subject(&self.session_id), &command)
            .await
            .context("Failed to send start command")
    }

    async fn stop(&self) -> Result<()> {
        let command = StopCallCommand {
            session_id: self.session_id.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        self.client
            .publish_json(&stop_subject(&self.session_id), &command)
            .await
            .context("Failed to send stop command")
    }

    fn subscribe(&self) -> Subscription {
        self.bus.subscribe()
    }

    fn name(&self) -> &str {
        "nats"
    }
}

impl Drop for NatsVoiceService {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

/// Hands out `NatsVoiceService`s sharing one connection
pub struct NatsVoiceConnector {
    client: Arc<NatsClient>,
}

impl NatsVoiceConnector {
    pub fn new(client: Arc<NatsClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl VoiceConnector for NatsVoiceConnector {
    async fn connect(&self, session_id: &str) -> Result<Arc<dyn VoiceCallService>> {
        let service = NatsVoiceService::new(Arc::clone(&self.client), session_id.to_string()).await?;
        Ok(Arc::new(service))
    }
}
