use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    config::{PollConfig, ViewConfig},
    domain::{JobState, Post, StatsSummary},
    gateway::{GatewayError, RemoteGateway},
    view::{CategorySelection, SyncPhase, ViewState},
};

use super::poller::{CompletionCallback, JobPoller, PollerState};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("no results are open")]
    NotOpen,
    #[error("results for {0} have not loaded yet")]
    NotLoaded(String),
}

/// Identifies one issued load: the session it belongs to and its issue order.
#[derive(Debug, Clone, Copy)]
struct LoadTicket {
    session: u64,
    seq: u64,
}

struct SyncInner {
    view: ViewState,
    open: bool,
    session: u64,
    issued: u64,
    applied: u64,
}

struct Shared {
    gateway: Arc<dyn RemoteGateway>,
    uncategorized: Vec<String>,
    inner: Mutex<SyncInner>,
    updates: watch::Sender<ViewState>,
}

impl Shared {
    fn begin_load(&self, subject: &str, analysis_complete: bool) -> Option<LoadTicket> {
        let mut inner = self.inner.lock();
        if !inner.open || inner.view.subject != subject {
            tracing::debug!(target: "sync", subject, "load skipped; subject is not open");
            return None;
        }
        inner.issued += 1;
        inner.view.loading = true;
        if analysis_complete {
            inner.view.analysis_complete = true;
        }
        let ticket = LoadTicket {
            session: inner.session,
            seq: inner.issued,
        };
        self.updates.send_replace(inner.view.clone());
        Some(ticket)
    }

    async fn run_load(&self, subject: &str, ticket: LoadTicket) {
        let (posts, stats) = tokio::join!(
            self.gateway.fetch_posts(subject),
            self.gateway.fetch_stats(subject)
        );
        self.apply(subject, ticket, posts, stats);
    }

    fn apply(
        &self,
        subject: &str,
        ticket: LoadTicket,
        posts: Result<Vec<Post>, GatewayError>,
        stats: Result<StatsSummary, GatewayError>,
    ) {
        let mut inner = self.inner.lock();
        if !inner.open || inner.session != ticket.session {
            tracing::debug!(target: "sync", subject, "dropping load result from a closed session");
            return;
        }
        if ticket.seq <= inner.applied {
            tracing::debug!(
                target: "sync",
                subject,
                seq = ticket.seq,
                applied = inner.applied,
                "dropping load result superseded by a newer one"
            );
            return;
        }
        inner.applied = ticket.seq;
        inner.view.loading = inner.applied < inner.issued;

        match (posts, stats) {
            (Ok(posts), Ok(stats)) => {
                let local = StatsSummary::from_posts(subject, &posts);
                if !stats.agrees_with(&local) {
                    tracing::debug!(
                        target: "sync",
                        subject,
                        reported = stats.total_posts,
                        counted = local.total_posts,
                        "stats differ from fetched posts"
                    );
                }
                let count = posts.len();
                inner.view.replace_data(posts, stats, &self.uncategorized);
                tracing::info!(
                    target: "sync",
                    subject,
                    posts = count,
                    categories = inner.view.categories.len(),
                    "results loaded"
                );
            }
            (posts, stats) => {
                let message = failure_message(subject, posts.err(), stats.err());
                tracing::warn!(target: "sync", subject, error = %message, "results load failed");
                inner.view.record_failure(message);
            }
        }
        self.updates.send_replace(inner.view.clone());
    }
}

fn spawn_load(shared: &Arc<Shared>, subject: &str, ticket: LoadTicket) -> JoinHandle<()> {
    let shared = shared.clone();
    let subject = subject.to_string();
    tokio::spawn(async move { shared.run_load(&subject, ticket).await })
}

fn failure_message(
    subject: &str,
    posts: Option<GatewayError>,
    stats: Option<GatewayError>,
) -> String {
    let parts: Vec<String> = [("posts", posts), ("stats", stats)]
        .into_iter()
        .filter_map(|(part, err)| err.map(|err| format!("{part}: {err}")))
        .collect();
    format!(
        "Could not load results for {subject}: {}",
        parts.join("; ")
    )
}

/// Owns the results view for one subject at a time.
///
/// Results reach observers through [`ResultSync::subscribe`]; the only way
/// to change them is through `open`, `load`, `select_category` and `close`.
pub struct ResultSync {
    shared: Arc<Shared>,
    poller: JobPoller,
}

impl ResultSync {
    pub fn new(gateway: Arc<dyn RemoteGateway>, poll: &PollConfig, view: &ViewConfig) -> Self {
        let (updates, _) = watch::channel(ViewState::default());
        let shared = Arc::new(Shared {
            gateway: gateway.clone(),
            uncategorized: view.uncategorized_labels.clone(),
            inner: Mutex::new(SyncInner {
                view: ViewState::default(),
                open: false,
                session: 0,
                issued: 0,
                applied: 0,
            }),
            updates,
        });
        Self {
            shared,
            poller: JobPoller::new(gateway, poll.interval),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.shared.updates.subscribe()
    }

    pub fn snapshot(&self) -> ViewState {
        self.shared.inner.lock().view.clone()
    }

    pub fn phase(&self) -> SyncPhase {
        self.shared.inner.lock().view.phase
    }

    pub fn is_polling(&self) -> bool {
        self.poller.state() == PollerState::Polling
    }

    /// Job states as the poller observes them for the open subject.
    pub fn job_updates(&self) -> watch::Receiver<Option<JobState>> {
        self.poller.job_state()
    }

    /// Shows `subject`: loads it right away and again once its job completes.
    pub fn open(&mut self, subject: &str) {
        if let Some(previous) = self.poller.subject() {
            tracing::debug!(target: "sync", previous, subject, "replacing open results");
        }
        self.close();
        {
            let mut inner = self.shared.inner.lock();
            inner.open = true;
            inner.session += 1;
            inner.view = ViewState::for_subject(subject);
            self.shared.updates.send_replace(inner.view.clone());
        }
        tracing::info!(target: "sync", subject, "results opened");

        let shared = self.shared.clone();
        let owner = subject.to_string();
        let on_complete: CompletionCallback = Arc::new(move || {
            if let Some(ticket) = shared.begin_load(&owner, true) {
                spawn_load(&shared, &owner, ticket);
            }
        });
        self.poller.start(subject, on_complete);

        if let Some(ticket) = self.shared.begin_load(subject, false) {
            spawn_load(&self.shared, subject, ticket);
        }
    }

    /// Fetches posts and stats for the open subject and applies them.
    ///
    /// The fetch runs on its own task, so dropping this future does not
    /// abandon an issued load.
    pub async fn load(&self, subject: &str) {
        if let Some(ticket) = self.shared.begin_load(subject, false) {
            if let Err(err) = spawn_load(&self.shared, subject, ticket).await {
                tracing::error!(target: "sync", subject, error = %err, "load task failed");
            }
        }
    }

    pub fn select_category(&self, token: &str) -> Result<(), SyncError> {
        let mut inner = self.shared.inner.lock();
        if !inner.open {
            return Err(SyncError::NotOpen);
        }
        if !inner.view.has_loaded {
            return Err(SyncError::NotLoaded(inner.view.subject.clone()));
        }
        let selection = CategorySelection::from_token(token);
        tracing::debug!(target: "sync", selection = %selection, "category selected");
        inner.view.select(selection);
        self.shared.updates.send_replace(inner.view.clone());
        Ok(())
    }

    /// Stops polling and discards the view. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.poller.stop();
        let mut inner = self.shared.inner.lock();
        if !inner.open {
            return;
        }
        inner.open = false;
        let subject = std::mem::take(&mut inner.view.subject);
        inner.view = ViewState::default();
        self.shared.updates.send_replace(inner.view.clone());
        tracing::info!(target: "sync", subject = %subject, "results closed");
    }
}
