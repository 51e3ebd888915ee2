use crate::voice::AssistantConfig;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub voice: VoiceConfig,
    pub feedback: FeedbackConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub session: SessionDefaults,
    #[serde(default)]
    pub directory: DirectoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    pub nats_url: String,
    /// Workflow used for practice-generation calls
    pub workflow_id: String,
    /// Assistant used for scripted interviews
    pub interviewer: AssistantConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackConfig {
    pub subject: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_subject")]
    pub subject: String,
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            subject: default_generation_subject(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

fn default_generation_subject() -> String {
    "interview.generate".to_string()
}

fn default_generation_timeout() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionDefaults {
    /// Force-terminate calls that never end on their own. Unset = wait forever.
    #[serde(default)]
    pub call_timeout_secs: Option<u64>,
    /// Drop a session this long after it navigated away. 0 keeps sessions until deleted.
    #[serde(default = "default_reap_after")]
    pub reap_after_secs: u64,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            call_timeout_secs: None,
            reap_after_secs: default_reap_after(),
        }
    }
}

fn default_reap_after() -> u64 {
    300
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryConfig {
    /// JSON file with users, interviews and feedback records
    pub seed_path: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("INTERVIEW_AGENT").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
