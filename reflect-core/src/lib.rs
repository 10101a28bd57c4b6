pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod history;
pub mod insights;
pub mod models;
pub mod poller;
pub mod progress;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{HttpReflectionClient, ReflectionApi};
pub use config::{ApiConfig, PollerConfig, ReflectConfig};
pub use dashboard::{DashboardSession, DashboardState};
pub use error::ReflectError;
pub use format::{format, FormattedBlock};
pub use models::{Analysis, Prompt, Reflection, ReflectionDraft};
pub use poller::{AnalysisPoller, PollState};
pub use progress::ProgressSummary;
