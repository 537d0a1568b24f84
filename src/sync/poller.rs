use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, Instant},
};

use crate::{
    domain::JobState,
    gateway::RemoteGateway,
    infrastructure::signal::{StopListener, StopSignal},
};

pub type CompletionCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
    Stopped,
}

struct ActivePoll {
    subject: String,
    stop: StopSignal,
    finished: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Polls job status for one subject at a time until the job completes.
pub struct JobPoller {
    gateway: Arc<dyn RemoteGateway>,
    interval: Duration,
    active: Option<ActivePoll>,
    started_once: bool,
    job_state: Arc<watch::Sender<Option<JobState>>>,
}

impl JobPoller {
    pub fn new(gateway: Arc<dyn RemoteGateway>, interval: Duration) -> Self {
        let (job_state, _) = watch::channel(None);
        Self {
            gateway,
            interval,
            active: None,
            started_once: false,
            job_state: Arc::new(job_state),
        }
    }

    /// Last job state reported for the current subject; `None` until the first reply.
    pub fn job_state(&self) -> watch::Receiver<Option<JobState>> {
        self.job_state.subscribe()
    }

    pub fn state(&self) -> PollerState {
        match &self.active {
            Some(active) if !active.finished.load(Ordering::SeqCst) => PollerState::Polling,
            Some(_) => PollerState::Stopped,
            None if self.started_once => PollerState::Stopped,
            None => PollerState::Idle,
        }
    }

    pub fn subject(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.subject.as_str())
    }

    /// Starts polling `subject`, replacing any poll already running.
    ///
    /// The first status request goes out one interval after this call.
    pub fn start(&mut self, subject: &str, on_complete: CompletionCallback) {
        self.stop();
        self.started_once = true;
        self.job_state.send_replace(None);

        let (stop, listener) = StopSignal::new();
        let finished = Arc::new(AtomicBool::new(false));
        let handle = tokio::spawn(poll_until_complete(
            self.gateway.clone(),
            subject.to_string(),
            self.interval,
            listener,
            on_complete,
            self.job_state.clone(),
            finished.clone(),
        ));

        tracing::info!(
            target: "poller",
            subject,
            interval_ms = self.interval.as_millis() as u64,
            "job polling started"
        );
        self.active = Some(ActivePoll {
            subject: subject.to_string(),
            stop,
            finished,
            handle,
        });
    }

    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.stop.trigger();
            active.handle.abort();
            if !active.finished.load(Ordering::SeqCst) {
                tracing::info!(target: "poller", subject = %active.subject, "job polling stopped");
            }
        }
        self.started_once = true;
    }
}

impl Drop for JobPoller {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.stop.trigger();
            active.handle.abort();
        }
    }
}

async fn poll_until_complete(
    gateway: Arc<dyn RemoteGateway>,
    subject: String,
    interval: Duration,
    mut stop: StopListener,
    on_complete: CompletionCallback,
    job_state: Arc<watch::Sender<Option<JobState>>>,
    finished: Arc<AtomicBool>,
) {
    let mut next_tick = Instant::now() + interval;
    let mut consecutive_failures: u32 = 0;

    loop {
        tokio::select! {
            biased;
            _ = stop.notified() => break,
            _ = time::sleep_until(next_tick) => {}
        }

        let result = tokio::select! {
            biased;
            _ = stop.notified() => break,
            res = gateway.fetch_job_status(&subject) => res,
        };

        if stop.is_triggered() {
            break;
        }

        match result {
            Ok(status) => {
                consecutive_failures = 0;
                job_state.send_replace(Some(status.status));
                match status.status {
                    state if state.is_completed() => {
                        tracing::info!(target: "poller", subject = %subject, "analysis job completed");
                        on_complete();
                        break;
                    }
                    JobState::Failed => {
                        tracing::warn!(
                            target: "poller",
                            subject = %subject,
                            "analysis job reported failure; still polling"
                        );
                    }
                    state => {
                        tracing::debug!(target: "poller", subject = %subject, ?state, "job not finished");
                    }
                }
            }
            Err(err) => {
                consecutive_failures += 1;
                tracing::warn!(
                    target: "poller",
                    subject = %subject,
                    error = %err,
                    consecutive_failures,
                    "job status poll failed; retrying on next tick"
                );
            }
        }

        // Ticks that elapsed while the request was in flight are dropped.
        let now = Instant::now();
        while next_tick <= now {
            next_tick += interval;
        }
    }

    finished.store(true, Ordering::SeqCst);
}
