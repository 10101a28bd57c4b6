//! Dashboard view-model: today's status, the latest analysis, and the poll
//! cycle started by a new submission.
//!
//! A session stands in for one mounted dashboard view. `teardown()` (or
//! dropping the session) cancels its liveness token; no state change is
//! published after that.

use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

use crate::api::ReflectionApi;
use crate::config::PollerConfig;
use crate::error::{ReflectError, Result};
use crate::models::{Analysis, Reflection, ReflectionDraft};
use crate::poller::{AnalysisPoller, PollState};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub today_reflection_exists: bool,
    pub latest_analysis: Option<Analysis>,
    pub poll: PollState,
}

impl DashboardState {
    pub fn analysis_loading(&self) -> bool {
        self.poll.loading()
    }

    /// Whether the "start today's reflection" prompt should be offered.
    pub fn can_start_reflection(&self) -> bool {
        !self.today_reflection_exists && !self.poll.loading()
    }
}

pub struct DashboardSession {
    api: Arc<dyn ReflectionApi>,
    poller_config: PollerConfig,
    state: Arc<watch::Sender<DashboardState>>,
    liveness: CancellationToken,
    /// Serialises submissions so two cannot both pass the loading check.
    submitting: Mutex<()>,
}

impl DashboardSession {
    pub fn new(api: Arc<dyn ReflectionApi>, poller_config: PollerConfig) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            api,
            poller_config,
            state: Arc::new(state),
            liveness: CancellationToken::new(),
            submitting: Mutex::new(()),
        }
    }

    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    pub fn is_live(&self) -> bool {
        !self.liveness.is_cancelled()
    }

    fn update(&self, f: impl FnOnce(&mut DashboardState)) {
        if self.is_live() {
            self.state.send_modify(f);
        }
    }

    /// Fetch today's status and the latest analysis together. Failures are
    /// logged and leave the corresponding field at its default. While a poll
    /// cycle is waiting the fetched analysis is dropped.
    pub async fn load(&self) {
        let (today, latest) = futures::join!(
            self.api.check_today_reflection_exists(),
            self.api.get_latest_analysis()
        );

        let today = today.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to check today's reflection");
            false
        });
        let latest = latest.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load latest analysis");
            None
        });

        self.update(|s| {
            s.today_reflection_exists = today;
            if s.poll.loading() {
                tracing::debug!("Poll cycle running, keeping analysis slot empty");
            } else {
                s.latest_analysis = latest;
            }
        });
    }

    /// Create a reflection and start polling for its analysis.
    ///
    /// Submission errors are returned to the caller; the draft is untouched
    /// so it can be corrected and resubmitted.
    pub async fn submit(&self, draft: &ReflectionDraft) -> Result<Reflection> {
        draft.validate()?;

        let _guard = self.submitting.lock().await;
        if self.state.borrow().poll.loading() {
            return Err(ReflectError::PollInProgress);
        }

        let reflection = self.api.create_reflection(draft).await?;

        if !self.is_live() {
            tracing::debug!(id = %reflection.id, "Dashboard torn down before polling started");
            return Ok(reflection);
        }

        self.update(|s| {
            s.today_reflection_exists = true;
            s.latest_analysis = None;
            s.poll = PollState::begin();
        });

        self.spawn_cycle();
        Ok(reflection)
    }

    fn spawn_cycle(&self) {
        let poller = AnalysisPoller::new(self.api.clone(), self.poller_config.clone());
        let state = self.state.clone();
        let token = self.liveness.child_token();

        tokio::spawn(async move {
            poller
                .run(&token, |poll| {
                    if token.is_cancelled() {
                        return;
                    }
                    state.send_modify(|s| {
                        s.poll = poll.clone();
                        if let Some(analysis) = poll.analysis() {
                            s.latest_analysis = Some(analysis.clone());
                        }
                    });
                })
                .await;
        });
    }

    /// Resolve once the current poll cycle stops loading, or the session is
    /// torn down.
    pub async fn wait_for_analysis(&self) -> DashboardState {
        let mut rx = self.subscribe();
        tokio::select! {
            result = rx.wait_for(|s| !s.poll.loading()) => match result {
                Ok(state) => state.clone(),
                Err(_) => self.state(),
            },
            _ = self.liveness.cancelled() => self.state(),
        }
    }

    pub fn teardown(&self) {
        if self.is_live() {
            tracing::debug!("Dashboard session torn down");
            self.liveness.cancel();
        }
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        self.liveness.cancel();
    }
}
