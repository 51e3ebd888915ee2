use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use interview_agent::directory::{Directory, InMemoryDirectory};
use interview_agent::feedback::NatsFeedbackGenerator;
use interview_agent::generation::NatsInterviewGenerator;
use interview_agent::replay::{run_replay, ReplayFixture};
use interview_agent::voice::{AssistantConfig, NatsVoiceConnector};
use interview_agent::{create_router, AppState, Config, NatsClient, SessionSettings};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "interview-agent", version, about = "Voice mock-interview session service")]
struct Cli {
    /// Config file (without extension)
    #[arg(short, long, default_value = "config/interview-agent")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API against the NATS voice relay and feedback service
    Serve,
    /// Replay a recorded call fixture offline and print what the session did
    Replay { fixture: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve => serve(&cli.config).await,
        Command::Replay { fixture } => replay(&cli.config, fixture).await,
    }
}

async fn serve(config_path: &str) -> Result<()> {
    let cfg = Config::load(config_path)?;

    info!("Interview Agent v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    let nats = Arc::new(NatsClient::connect(&cfg.voice.nats_url).await?);

    let directory: Arc<dyn Directory> = match &cfg.directory.seed_path {
        Some(path) => Arc::new(InMemoryDirectory::load(path)?),
        None => {
            warn!("No directory seed configured; every lookup will miss");
            Arc::new(InMemoryDirectory::new())
        }
    };

    let feedback = Arc::new(NatsFeedbackGenerator::new(
        Arc::clone(&nats),
        cfg.feedback.subject.clone(),
        Duration::from_secs(cfg.feedback.timeout_secs),
    ));

    let interviews = Arc::new(NatsInterviewGenerator::new(
        Arc::clone(&nats),
        cfg.generation.subject.clone(),
        Duration::from_secs(cfg.generation.timeout_secs),
    ));

    let settings = SessionSettings {
        workflow_id: cfg.voice.workflow_id.clone(),
        interviewer: cfg.voice.interviewer.clone(),
        call_timeout: cfg.session.call_timeout_secs.map(Duration::from_secs),
        reap_after: match cfg.session.reap_after_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        },
    };

    if settings.call_timeout.is_none() {
        info!("No call timeout configured; calls end only on provider or user action");
    }

    let state = AppState::new(
        directory,
        Arc::new(NatsVoiceConnector::new(nats)),
        feedback,
        interviews,
        settings,
    );

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(state))
        .await
        .context("HTTP server failed")
}

async fn replay(config_path: &str, fixture_path: PathBuf) -> Result<()> {
    let (workflow_id, interviewer) = match Config::load(config_path) {
        Ok(cfg) => (cfg.voice.workflow_id, cfg.voice.interviewer),
        Err(e) => {
            warn!("Using built-in interviewer, config not loaded: {}", e);
            ("practice-generation-workflow".to_string(), AssistantConfig::default())
        }
    };

    let fixture = ReplayFixture::load(&fixture_path)?;
    let report = run_replay(fixture, &workflow_id, interviewer).await?;

    info!(
        "Replay finished: status={:?}, {} transcript entries, {} feedback requests",
        report.status,
        report.transcript.len(),
        report.feedback_requests.len()
    );

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
