use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReflectConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Pre-issued bearer token, sent as-is on every request.
    pub auth_token: Option<String>,
    pub timeout_seconds: u64,
    pub max_retries: usize,
    /// First retry delay; each later retry doubles it, capped at 10s.
    pub retry_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/api".to_string(),
            auth_token: None,
            timeout_seconds: 30,
            max_retries: 3,
            retry_delay_ms: 500,
        }
    }
}

/// Timing and budget for the post-submission analysis poll.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    pub initial_delay_ms: u64,
    pub retry_delay_ms: u64,
    /// Empty fetches tolerated before giving up; one more fetch than this runs.
    pub max_attempts: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 2000,
            retry_delay_ms: 3000,
            max_attempts: 10,
        }
    }
}

impl PollerConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Longest a cycle can wait before giving up: the initial delay plus one
    /// retry delay per refetch.
    pub fn worst_case(&self) -> Duration {
        self.initial_delay() + self.retry_delay() * self.max_attempts
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    pub limit: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { limit: 30 }
    }
}

impl ReflectConfig {
    /// Load from an optional TOML file, then `REFLECT__SECTION__KEY` env overrides.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("REFLECT").separator("__"))
            .build()?;
        s.try_deserialize()
    }
}
