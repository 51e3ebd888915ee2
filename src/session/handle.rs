use super::controller::{SessionController, StartOutcome};
use super::session::CallStatus;
use super::stats::{SessionSnapshot, TranscriptEntry};
use super::termination::{execute_termination, TerminationAction};
use crate::feedback::FeedbackGenerator;
use crate::navigation::{NavigationTarget, Navigator};
use crate::voice::Subscription;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Reply to a start request made through a `SessionHandle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartReply {
    Connecting,
    AlreadyInProgress,
    Failed,
}

enum Command {
    Start(oneshot::Sender<StartReply>),
    Disconnect(oneshot::Sender<()>),
    Transcript(oneshot::Sender<Vec<TranscriptEntry>>),
    Resolved { run_id: Uuid, target: NavigationTarget },
    Shutdown,
}

/// A session controller running on its own task
///
/// Provider events and user commands are funneled into a single loop, so
/// the controller sees them one at a time. The voice subscription is taken
/// when the loop starts and released when it ends.
pub struct SessionHandle {
    session_id: String,
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionHandle {
    pub fn spawn(
        controller: SessionController,
        feedback: Arc<dyn FeedbackGenerator>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let session_id = controller.config().session_id.clone();
        let events = controller.voice().subscribe();
        let (commands_tx, commands_rx) = mpsc::channel(32);
        let (snapshots_tx, snapshots_rx) = watch::channel(controller.snapshot());

        let event_loop = SessionLoop {
            controller,
            events,
            commands: commands_rx,
            loopback: commands_tx.downgrade(),
            snapshots: snapshots_tx,
            feedback,
            navigator,
            deadline: None,
        };

        let task = tokio::spawn(event_loop.run());

        Self {
            session_id,
            commands: commands_tx,
            snapshots: snapshots_rx,
            task: Mutex::new(Some(task)),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn start(&self) -> Result<StartReply> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Start(tx)).await?;
        rx.await.context("Session loop dropped the start request")
    }

    pub async fn disconnect(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Disconnect(tx)).await?;
        rx.await.context("Session loop dropped the disconnect request")
    }

    /// Transcript of the current run, after every event delivered so far
    pub async fn transcript(&self) -> Result<Vec<TranscriptEntry>> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Transcript(tx)).await?;
        rx.await.context("Session loop dropped the transcript request")
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until the current run has navigated somewhere
    pub async fn wait_for_navigation(&self) -> Result<NavigationTarget> {
        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots
            .wait_for(|s| s.navigation.is_some())
            .await
            .context("Session loop ended before navigating")?;

        snapshot
            .navigation
            .clone()
            .context("Snapshot lost its navigation target")
    }

    /// Stop the loop and release the voice subscription
    pub async fn shutdown(&self) -> Result<()> {
        if self.commands.send(Command::Shutdown).await.is_err() {
            warn!("Session {} loop already stopped", self.session_id);
        }

        let mut handle = self.task.lock().await;
        if let Some(task) = handle.take() {
            task.await.context("Session loop panicked")?;
        }

        Ok(())
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| anyhow!("Session {} is closed", self.session_id))
    }
}

struct SessionLoop {
    controller: SessionController,
    events: Subscription,
    commands: mpsc::Receiver<Command>,
    loopback: mpsc::WeakSender<Command>,
    snapshots: watch::Sender<SessionSnapshot>,
    feedback: Arc<dyn FeedbackGenerator>,
    navigator: Arc<dyn Navigator>,
    deadline: Option<Instant>,
}

impl SessionLoop {
    async fn run(mut self) {
        let session_id = self.controller.config().session_id.clone();
        info!("Session {} loop started", session_id);

        let mut events_open = true;

        loop {
            let deadline = self.deadline;

            // Events already delivered are applied before the next command
            tokio::select! {
                biased;

                event = self.events.recv(), if events_open => match event {
                    Some(event) => {
                        let termination = self.controller.handle_event(event);
                        self.after_transition(termination);
                    }
                    None => {
                        warn!("Voice event stream closed for session {}", session_id);
                        events_open = false;
                    }
                },

                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },

                _ = wait_until(deadline) => {
                    warn!("Call in session {} hit its timeout; forcing termination", session_id);
                    self.deadline = None;
                    let termination = self.controller.disconnect().await;
                    self.after_transition(termination);
                }
            }

            self.publish();
        }

        info!("Session {} loop stopped", session_id);
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start(reply) => {
                let outcome = self.controller.start().await;
                let status = match outcome {
                    StartOutcome::Connecting => {
                        self.deadline = self
                            .controller
                            .config()
                            .call_timeout
                            .map(|timeout| Instant::now() + timeout);
                        StartReply::Connecting
                    }
                    StartOutcome::AlreadyInProgress => StartReply::AlreadyInProgress,
                    StartOutcome::Failed { termination } => {
                        self.after_transition(termination);
                        StartReply::Failed
                    }
                };
                self.publish();
                let _ = reply.send(status);
            }
            Command::Disconnect(reply) => {
                let termination = self.controller.disconnect().await;
                self.after_transition(termination);
                self.publish();
                let _ = reply.send(());
            }
            Command::Transcript(reply) => {
                let _ = reply.send(self.controller.session().transcript().to_vec());
            }
            Command::Resolved { run_id, target } => {
                self.controller.record_navigation(run_id, target);
            }
            Command::Shutdown => {}
        }
    }

    /// Replies go out after the snapshot, so callers never read a stale one
    fn publish(&self) {
        self.snapshots.send_replace(self.controller.snapshot());
    }

    fn after_transition(&mut self, termination: Option<TerminationAction>) {
        if self.controller.status() == CallStatus::Finished {
            self.deadline = None;
        }

        let Some(action) = termination else {
            return;
        };

        // Runs off-loop so snapshots keep flowing while feedback is generated
        let run_id = self.controller.session().run_id();
        let feedback = Arc::clone(&self.feedback);
        let navigator = Arc::clone(&self.navigator);
        let loopback = self.loopback.clone();

        tokio::spawn(async move {
            let target = execute_termination(action, feedback.as_ref(), navigator.as_ref()).await;
            if let Some(commands) = loopback.upgrade() {
                let _ = commands.send(Command::Resolved { run_id, target }).await;
            }
        });
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
