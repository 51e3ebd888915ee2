use super::events::{CallEvent, VoiceEvent};
use super::service::{CallTarget, StartOptions, VoiceCallService, VoiceConnector};
use super::subscription::{EventBus, Subscription};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;
use uuid::Uuid;

/// Command observed by the scripted provider
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum VoiceCommand {
    Start {
        call_id: Uuid,
        target: CallTarget,
        options: StartOptions,
    },
    Stop,
}

/// In-process provider that records commands and emits whatever events it is told to
///
/// Used for tests and fixture replay.
#[derive(Default)]
pub struct ScriptedVoiceService {
    bus: EventBus,
    commands: Mutex<Vec<VoiceCommand>>,
    current_call: Mutex<Option<Uuid>>,
    fail_start: AtomicBool,
}

impl ScriptedVoiceService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next start command fail
    pub fn fail_next_start(&self) {
        self.fail_start.store(true, Ordering::SeqCst);
    }

    /// Emit one event of the most recently started call
    pub fn emit(&self, event: VoiceEvent) -> usize {
        self.bus.publish(self.tag(event))
    }

    pub fn emit_all(&self, events: impl IntoIterator<Item = VoiceEvent>) {
        for event in events {
            self.bus.publish(self.tag(event));
        }
    }

    /// Emit an event belonging to a specific call, e.g. a late one from an earlier call
    pub fn emit_for(&self, call_id: Uuid, event: VoiceEvent) -> usize {
        self.bus.publish(CallEvent::for_call(call_id, event))
    }

    /// Ids of every call started so far, oldest first
    pub fn call_ids(&self) -> Vec<Uuid> {
        lock(&self.commands)
            .iter()
            .filter_map(|c| match c {
                VoiceCommand::Start { call_id, .. } => Some(*call_id),
                VoiceCommand::Stop => None,
            })
            .collect()
    }

    pub fn commands(&self) -> Vec<VoiceCommand> {
        lock(&self.commands).clone()
    }

    pub fn start_count(&self) -> usize {
        lock(&self.commands)
            .iter()
            .filter(|c| matches!(c, VoiceCommand::Start { .. }))
            .count()
    }

    pub fn stop_count(&self) -> usize {
        lock(&self.commands)
            .iter()
            .filter(|c| matches!(c, VoiceCommand::Stop))
            .count()
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }

    fn tag(&self, event: VoiceEvent) -> CallEvent {
        match *lock(&self.current_call) {
            Some(call_id) => CallEvent::for_call(call_id, event),
            None => event.into(),
        }
    }
}

#[async_trait::async_trait]
impl VoiceCallService for ScriptedVoiceService {
    async fn start(&self, call_id: Uuid, target: CallTarget, options: StartOptions) -> Result<()> {
        lock(&self.commands).push(VoiceCommand::Start {
            call_id,
            target,
            options,
        });
        *lock(&self.current_call) = Some(call_id);

        if self.fail_start.swap(false, Ordering::SeqCst) {
            anyhow::bail!("scripted start failure");
        }

        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        lock(&self.commands).push(VoiceCommand::Stop);
        Ok(())
    }

    fn subscribe(&self) -> Subscription {
        self.bus.subscribe()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Connector that keeps every scripted service it creates, keyed by session id
#[derive(Default)]
pub struct ScriptedVoiceConnector {
    services: Mutex<HashMap<String, Arc<ScriptedVoiceService>>>,
}

impl ScriptedVoiceConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service(&self, session_id: &str) -> Option<Arc<ScriptedVoiceService>> {
        lock(&self.services).get(session_id).cloned()
    }
}

#[async_trait::async_trait]
impl VoiceConnector for ScriptedVoiceConnector {
    async fn connect(&self, session_id: &str) -> Result<Arc<dyn VoiceCallService>> {
        info!("Creating scripted voice service for {}", session_id);
        let service = Arc::new(ScriptedVoiceService::new());
        lock(&self.services).insert(session_id.to_string(), Arc::clone(&service));
        Ok(service)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
