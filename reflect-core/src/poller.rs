//! Post-submission analysis polling.
//!
//! The backend produces an analysis some time after a reflection is created.
//! A poll cycle waits `initial_delay`, fetches the latest analysis, and keeps
//! refetching `retry_delay` apart while fewer than `max_attempts` fetches have
//! come back empty. The budget is `max_attempts + 1` fetches in total:
//!
//! ```text
//! Idle -> Waiting -> Found
//!                 -> Exhausted
//! ```
//!
//! Fetch errors count as "not ready yet". Cancelling the cycle's token stops
//! it before the next state change; nothing is published afterwards.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::api::ReflectionApi;
use crate::config::PollerConfig;
use crate::models::Analysis;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PollState {
    #[default]
    Idle,
    Waiting {
        attempts: u32,
    },
    Found {
        attempts: u32,
        analysis: Analysis,
    },
    Exhausted {
        attempts: u32,
    },
}

impl PollState {
    /// State at the start of a cycle, before any fetch.
    pub fn begin() -> Self {
        PollState::Waiting { attempts: 0 }
    }

    pub fn loading(&self) -> bool {
        matches!(self, PollState::Waiting { .. })
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        match self {
            PollState::Found { analysis, .. } => Some(analysis),
            _ => None,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            PollState::Idle => 0,
            PollState::Waiting { attempts }
            | PollState::Found { attempts, .. }
            | PollState::Exhausted { attempts } => *attempts,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PollState::Found { .. } | PollState::Exhausted { .. })
    }

    /// Fold one fetch result into the state. Only `Waiting` moves.
    ///
    /// An empty fetch keeps waiting while the count before it is still
    /// below `max_attempts`.
    pub fn record(self, fetched: Option<Analysis>, max_attempts: u32) -> PollState {
        let PollState::Waiting { attempts: before } = self else {
            return self;
        };
        let attempts = before + 1;

        match fetched {
            Some(analysis) => PollState::Found { attempts, analysis },
            None if before < max_attempts => PollState::Waiting { attempts },
            None => PollState::Exhausted { attempts },
        }
    }
}

pub struct AnalysisPoller {
    api: Arc<dyn ReflectionApi>,
    config: PollerConfig,
}

impl AnalysisPoller {
    pub fn new(api: Arc<dyn ReflectionApi>, config: PollerConfig) -> Self {
        Self { api, config }
    }

    /// Run one cycle, handing every state change to `publish`.
    ///
    /// Returns the terminal state, or `None` if `token` was cancelled first.
    pub async fn run<F>(&self, token: &CancellationToken, mut publish: F) -> Option<PollState>
    where
        F: FnMut(&PollState),
    {
        if token.is_cancelled() {
            return None;
        }

        let mut state = PollState::begin();
        publish(&state);

        tracing::info!(
            initial_delay_ms = self.config.initial_delay_ms,
            retry_delay_ms = self.config.retry_delay_ms,
            max_attempts = self.config.max_attempts,
            "Polling for analysis"
        );

        let mut delay = self.config.initial_delay();
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(attempts = state.attempts(), "Analysis poll cancelled");
                    return None;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            let attempt = state.attempts() + 1;
            let fetched = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(attempt, "Analysis poll cancelled mid-fetch");
                    return None;
                }
                result = self.api.get_latest_analysis_once() => match result {
                    Ok(analysis) => analysis,
                    Err(e) => {
                        tracing::warn!(attempt, error = %e, "Analysis fetch failed, counting as not ready");
                        None
                    }
                },
            };

            if token.is_cancelled() {
                return None;
            }

            state = state.record(fetched, self.config.max_attempts);
            publish(&state);

            match &state {
                PollState::Found { attempts, .. } => {
                    tracing::info!(attempts, "Analysis ready");
                    return Some(state);
                }
                PollState::Exhausted { attempts } => {
                    tracing::info!(attempts, "Analysis not ready, giving up");
                    return Some(state);
                }
                _ => {}
            }

            delay = self.config.retry_delay();
        }
    }
}
