use std::sync::Arc;

use anyhow::{bail, Result};
use reqwest::Client;
use tokio::sync::watch;

use crate::{
    cli::Cli,
    config::AppConfig,
    domain::JobState,
    gateway::{HttpGateway, RemoteGateway},
    infrastructure::signal::{StopListener, StopSignal},
    profile::ProfileReference,
    report,
    sync::ResultSync,
    view::{CategorySelection, SyncPhase, ViewState},
};

pub struct ReelSpiritApp {
    config: Arc<AppConfig>,
    gateway: Arc<HttpGateway>,
    shutdown: StopSignal,
}

impl ReelSpiritApp {
    pub fn initialize(config: AppConfig, shutdown: StopSignal) -> Result<Self> {
        let config = Arc::new(config);
        let http_client = Client::builder()
            .user_agent(format!("reelspirit-sync/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        let gateway = Arc::new(HttpGateway::new(http_client, &config.api));

        Ok(Self {
            config,
            gateway,
            shutdown,
        })
    }

    pub async fn run(self, args: Cli) -> Result<()> {
        let profile = ProfileReference::parse(&args.profile)?;
        tracing::info!(
            target: "app",
            subject = profile.subject(),
            api = %self.config.api.base_url,
            "reelspirit sync starting"
        );

        self.probe_service().await;

        let Some(view) = self.sync_results(&profile, &args).await? else {
            tracing::info!(target: "app", "interrupted before results were ready");
            return Ok(());
        };

        print!("{}", report::render(&view));

        if view.phase == SyncPhase::Error {
            bail!(view
                .error
                .unwrap_or_else(|| format!("could not load results for {}", view.subject)));
        }
        Ok(())
    }

    async fn probe_service(&self) {
        match self.gateway.check_health().await {
            Ok(health) => {
                tracing::debug!(target: "app", status = %health.status, "analysis service is up");
            }
            Err(err) if err.is_transport() => {
                tracing::warn!(target: "app", error = %err, "analysis service is unreachable");
            }
            Err(err) => {
                tracing::warn!(target: "app", error = %err, "analysis service health check failed");
            }
        }
    }

    /// Submits (unless skipped), follows the job and returns the settled view.
    ///
    /// `None` means shutdown was requested first.
    async fn sync_results(
        &self,
        profile: &ProfileReference,
        args: &Cli,
    ) -> Result<Option<ViewState>> {
        let mut shutdown = self.shutdown.subscribe();

        if !args.skip_submit {
            let profile_url = profile.profile_url();
            let first_page = tokio::select! {
                biased;
                _ = shutdown.notified() => return Ok(None),
                res = self.gateway.submit_analysis(&profile_url) => res?,
            };
            tracing::info!(
                target: "app",
                subject = profile.subject(),
                input = profile.as_str(),
                first_page = first_page.len(),
                "analysis submitted"
            );
        }

        let gateway: Arc<dyn RemoteGateway> = self.gateway.clone();
        let mut sync = ResultSync::new(gateway, &self.config.poll, &self.config.view);
        let mut updates = sync.subscribe();
        let mut jobs = sync.job_updates();
        sync.open(profile.subject());

        let settled = wait_for_results(
            &mut updates,
            &mut jobs,
            &mut shutdown,
            !args.skip_submit,
        )
        .await;
        let outcome = match settled {
            Some(_) => self.finish(&sync, profile, args, &mut shutdown).await,
            None => None,
        };

        tracing::debug!(target: "app", polling = sync.is_polling(), "closing results");
        sync.close();
        Ok(outcome)
    }

    /// Retries a failed load once, then applies the requested category.
    async fn finish(
        &self,
        sync: &ResultSync,
        profile: &ProfileReference,
        args: &Cli,
        shutdown: &mut StopListener,
    ) -> Option<ViewState> {
        if self.shutdown.is_triggered() {
            return None;
        }
        if sync.phase() == SyncPhase::Error {
            tracing::info!(target: "app", subject = profile.subject(), "retrying failed load once");
            tokio::select! {
                biased;
                _ = shutdown.notified() => return None,
                _ = sync.load(profile.subject()) => {}
            }
        }
        if let Err(err) = sync.select_category(&args.category) {
            tracing::warn!(target: "app", error = %err, "could not apply category");
        }
        let view = sync.snapshot();
        if let CategorySelection::Label(label) = &view.selected {
            if !view.categories.contains(label) {
                tracing::warn!(
                    target: "app",
                    category = %label,
                    known = ?view.categories,
                    "no posts in the requested category"
                );
            }
        }
        Some(view)
    }
}

async fn wait_for_results(
    updates: &mut watch::Receiver<ViewState>,
    jobs: &mut watch::Receiver<Option<JobState>>,
    shutdown: &mut StopListener,
    until_complete: bool,
) -> Option<ViewState> {
    let mut jobs_open = true;
    let mut last_job_state = None;
    loop {
        {
            let view = updates.borrow_and_update();
            tracing::debug!(
                target: "app",
                phase = ?view.phase,
                loading = view.loading,
                posts = view.posts.len(),
                analysis_complete = view.analysis_complete,
                "results updated"
            );
            if is_settled(&view, until_complete) {
                return Some(view.clone());
            }
        }

        tokio::select! {
            biased;
            _ = shutdown.notified() => return None,
            changed = updates.changed() => {
                if changed.is_err() {
                    return None;
                }
            }
            changed = jobs.changed(), if jobs_open => {
                if changed.is_err() {
                    jobs_open = false;
                    continue;
                }
                let state = *jobs.borrow_and_update();
                if until_complete && job_failure_started(last_job_state, state) {
                    tracing::warn!(
                        target: "app",
                        "analysis job reports failure; still waiting for it to complete (Ctrl-C to stop)"
                    );
                }
                last_job_state = state;
            }
        }
    }
}

fn job_failure_started(previous: Option<JobState>, current: Option<JobState>) -> bool {
    current == Some(JobState::Failed) && previous != Some(JobState::Failed)
}

fn is_settled(view: &ViewState, until_complete: bool) -> bool {
    if view.loading || matches!(view.phase, SyncPhase::Idle | SyncPhase::Loading) {
        return false;
    }
    !until_complete || view.analysis_complete
}
