//! Voice call provider contract
//!
//! The provider owns audio and speech recognition. This crate only sends it
//! start/stop commands and consumes its lifecycle and transcript events.

pub mod events;
pub mod nats;
pub mod scripted;
pub mod service;
pub mod subscription;

pub use events::{CallEvent, ServiceMessage, VoiceEvent};
pub use nats::{NatsVoiceConnector, NatsVoiceService};
pub use scripted::{ScriptedVoiceConnector, ScriptedVoiceService, VoiceCommand};
pub use service::{AssistantConfig, CallTarget, StartOptions, VoiceCallService, VoiceConnector};
pub use subscription::{EventBus, Subscription};
