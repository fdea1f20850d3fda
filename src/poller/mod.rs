//! Pipeline status poller.
//!
//! [`StatusPoller`] owns a single background task that checks the pipeline
//! status on a fixed interval, fetches follow-up questions while the pipeline
//! is still working, and stops for good once a terminal status arrives.
//! Results are delivered as [`PollEvent`]s over an mpsc channel.
//!
//! ```text
//!   start ──▶ status check ──▶ classify ──┬─ FetchSecondary ─▶ question fetch ─┐
//!               ▲                         ├─ Continue ─────────────────────────┤
//!               │                         └─ Terminal ─▶ emit, stop            │
//!               └──────────────── sleep(interval) ◀───────────────────────────┘
//! ```


use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{PipelineApi, PipelineStatus, QuestionRecord, StatusResponse};
use crate::error::ApiError;

/// What the poller does after observing a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
    /// Reschedule without fetching anything else
    Continue,
    /// Fetch pending questions, then reschedule
    FetchSecondary,
    /// Stop polling permanently
    Terminal,
}

/// Classify a pipeline status. Unrecognized values keep polling.
pub fn classify(status: &PipelineStatus) -> PollDecision {
    match status {
        PipelineStatus::SessionCreated
        | PipelineStatus::Started
        | PipelineStatus::PipelineRunning => PollDecision::FetchSecondary,
        PipelineStatus::Ready
        | PipelineStatus::Error
        | PipelineStatus::GeneratingReport
        | PipelineStatus::NotFound => PollDecision::Terminal,
        PipelineStatus::Unknown(_) => PollDecision::Continue,
    }
}

/// Messages emitted by a running poller
#[derive(Debug)]
pub enum PollEvent {
    /// Result of a question fetch; `None` when the backend returned null
    Questions(Option<Vec<QuestionRecord>>),
    /// A terminal status was observed; polling has stopped
    Terminal(StatusResponse),
    /// The backend rejected our credentials; polling has stopped
    AuthExpired,
}

/// Poller settings
#[derive(Clone)]
pub struct PollerConfig {
    pub interval: Duration,
    /// Whether fetch-secondary statuses trigger a question fetch
    pub fetch_questions: bool,
    /// Status classification; [`classify`] unless overridden
    pub classifier: fn(&PipelineStatus) -> PollDecision,
}

impl PollerConfig {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            fetch_questions: true,
            classifier: classify,
        }
    }

    pub fn without_questions(mut self) -> Self {
        self.fetch_questions = false;
        self
    }

    /// Replace the status classification for this poller
    pub fn with_classifier(mut self, classifier: fn(&PipelineStatus) -> PollDecision) -> Self {
        self.classifier = classifier;
        self
    }
}

impl fmt::Debug for PollerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollerConfig")
            .field("interval", &self.interval)
            .field("fetch_questions", &self.fetch_questions)
            .finish_non_exhaustive()
    }
}

/// Point-in-time view of poller progress
#[derive(Debug, Clone, Default)]
pub struct PollSnapshot {
    pub last_status: Option<PipelineStatus>,
    pub cycles: u64,
    pub question_fetches: u64,
    pub last_checked_at: Option<DateTime<Utc>>,
}

/// State shared between the poller handle and one run of its task
#[derive(Debug)]
struct RunState {
    alive: AtomicBool,
    paused: Arc<AtomicBool>,
    snapshot: Arc<Mutex<PollSnapshot>>,
}

impl RunState {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    fn update(&self, f: impl FnOnce(&mut PollSnapshot)) {
        let mut guard = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard);
    }
}

enum CycleOutcome {
    Reschedule,
    Stop,
}

/// Owned scheduler for status polling.
///
/// At most one task runs per poller. Each run has its own liveness flag, so a
/// cycle still in flight when [`stop`](Self::stop) is called can neither emit
/// events nor reschedule itself. Dropping the poller stops it.
pub struct StatusPoller {
    api: Arc<dyn PipelineApi>,
    config: PollerConfig,
    paused: Arc<AtomicBool>,
    snapshot: Arc<Mutex<PollSnapshot>>,
    run: Option<(Arc<RunState>, JoinHandle<()>)>,
}

impl StatusPoller {
    pub fn new(api: Arc<dyn PipelineApi>, config: PollerConfig) -> Self {
        Self {
            api,
            config,
            paused: Arc::new(AtomicBool::new(false)),
            snapshot: Arc::new(Mutex::new(PollSnapshot::default())),
            run: None,
        }
    }

    /// Begin polling `session_id`, delivering events to `events`.
    ///
    /// Returns `false` without doing anything if a run is already active.
    pub fn start(&mut self, session_id: impl Into<String>, events: mpsc::Sender<PollEvent>) -> bool {
        if self.is_running() {
            debug!("Poller already running, ignoring start");
            return false;
        }
        self.stop();

        let session_id = session_id.into();
        let state = Arc::new(RunState {
            alive: AtomicBool::new(true),
            paused: self.paused.clone(),
            snapshot: self.snapshot.clone(),
        });

        info!(
            session_id = %session_id,
            interval_ms = self.config.interval.as_millis(),
            "Starting status poller"
        );

        let handle = tokio::spawn(poll_loop(
            self.api.clone(),
            self.config.clone(),
            session_id,
            state.clone(),
            events,
        ));
        self.run = Some((state, handle));
        true
    }

    /// Stop polling and cancel any pending reschedule
    pub fn stop(&mut self) {
        if let Some((state, handle)) = self.run.take() {
            state.alive.store(false, Ordering::SeqCst);
            handle.abort();
            debug!("Status poller stopped");
        }
    }

    /// Skip requests until [`resume`](Self::resume) is called
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Whether a run is active and has not halted on its own
    pub fn is_running(&self) -> bool {
        self.run
            .as_ref()
            .map(|(state, handle)| state.is_alive() && !handle.is_finished())
            .unwrap_or(false)
    }

    pub fn snapshot(&self) -> PollSnapshot {
        self.snapshot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    api: Arc<dyn PipelineApi>,
    config: PollerConfig,
    session_id: String,
    state: Arc<RunState>,
    events: mpsc::Sender<PollEvent>,
) {
    while state.is_alive() {
        if !state.is_paused() {
            match run_cycle(api.as_ref(), &config, &session_id, &state, &events).await {
                CycleOutcome::Reschedule => {}
                CycleOutcome::Stop => break,
            }
        }
        if !state.is_alive() {
            break;
        }
        tokio::time::sleep(config.interval).await;
    }
    state.alive.store(false, Ordering::SeqCst);
    debug!(session_id = %session_id, "Poll loop exited");
}

async fn run_cycle(
    api: &dyn PipelineApi,
    config: &PollerConfig,
    session_id: &str,
    state: &RunState,
    events: &mpsc::Sender<PollEvent>,
) -> CycleOutcome {
    let status = match api.pipeline_status(session_id).await {
        Ok(status) => status,
        Err(e) => return on_error(e, session_id, state, events).await,
    };

    if !state.is_alive() {
        return CycleOutcome::Stop;
    }

    state.update(|snap| {
        snap.cycles += 1;
        snap.last_status = Some(status.status.clone());
        snap.last_checked_at = Some(Utc::now());
    });

    match (config.classifier)(&status.status) {
        PollDecision::Terminal => {
            info!(
                session_id = %session_id,
                status = %status.status,
                "Terminal pipeline status, stopping poller"
            );
            emit(state, events, PollEvent::Terminal(status)).await;
            CycleOutcome::Stop
        }
        PollDecision::Continue => {
            if matches!(status.status, PipelineStatus::Unknown(_)) {
                warn!(
                    session_id = %session_id,
                    status = %status.status,
                    "Unrecognized pipeline status, continuing to poll"
                );
            } else {
                debug!(session_id = %session_id, status = %status.status, "Pipeline still working");
            }
            CycleOutcome::Reschedule
        }
        PollDecision::FetchSecondary if !config.fetch_questions => CycleOutcome::Reschedule,
        PollDecision::FetchSecondary => {
            debug!(session_id = %session_id, status = %status.status, "Fetching follow-up questions");
            match api.followup_questions(session_id).await {
                Ok(questions) => {
                    state.update(|snap| snap.question_fetches += 1);
                    if emit(state, events, PollEvent::Questions(questions)).await {
                        CycleOutcome::Reschedule
                    } else {
                        CycleOutcome::Stop
                    }
                }
                Err(e) => on_error(e, session_id, state, events).await,
            }
        }
    }
}

async fn on_error(
    error: ApiError,
    session_id: &str,
    state: &RunState,
    events: &mpsc::Sender<PollEvent>,
) -> CycleOutcome {
    if error.is_transient() {
        warn!(
            session_id = %session_id,
            error = %error,
            "Poll request failed, retrying next interval"
        );
        return CycleOutcome::Reschedule;
    }

    warn!(session_id = %session_id, error = %error, "Authentication lost, stopping poller");
    emit(state, events, PollEvent::AuthExpired).await;
    CycleOutcome::Stop
}

/// Deliver an event if the run is still alive; `false` means stop
async fn emit(state: &RunState, events: &mpsc::Sender<PollEvent>, event: PollEvent) -> bool {
    if !state.is_alive() {
        return false;
    }
    if events.send(event).await.is_err() {
        debug!("Event receiver dropped, stopping poller");
        state.alive.store(false, Ordering::SeqCst);
        return false;
    }
    true
}
