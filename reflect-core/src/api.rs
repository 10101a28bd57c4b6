//! Backend client for the reflection service.
//!
//! `ReflectionApi` is the seam the view-models talk to; `HttpReflectionClient`
//! implements it over the REST/JSON API:
//! - `POST /reflections` creates a reflection (never retried)
//! - `GET  /reflections/today`, `/reflections?limit=N`
//! - `GET  /analysis/latest`, `/analysis/reflection/{id}`, `/analysis?limit=N`
//!
//! Idempotent GETs retry transient failures with exponential backoff, except
//! `get_latest_analysis_once`, which the poller drives on its own schedule.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;

use crate::config::ApiConfig;
use crate::error::{ReflectError, Result};
use crate::models::{Analysis, Reflection, ReflectionDraft};

const SUBMIT_FALLBACK_MESSAGE: &str = "Failed to submit reflection. Please try again.";

// ============================================================================
// ReflectionApi trait
// ============================================================================

/// Operations the client needs from the reflection backend.
#[async_trait]
pub trait ReflectionApi: Send + Sync {
    async fn create_reflection(&self, draft: &ReflectionDraft) -> Result<Reflection>;

    async fn check_today_reflection_exists(&self) -> Result<bool>;

    /// `None` means the analysis has not been produced yet.
    async fn get_latest_analysis(&self) -> Result<Option<Analysis>>;

    /// Single request for the latest analysis, never retried.
    async fn get_latest_analysis_once(&self) -> Result<Option<Analysis>> {
        self.get_latest_analysis().await
    }

    async fn get_analysis_by_reflection_id(&self, reflection_id: &str)
        -> Result<Option<Analysis>>;

    /// Newest first.
    async fn list_reflections(&self, limit: u32) -> Result<Vec<Reflection>>;

    /// Newest first.
    async fn list_analyses(&self, limit: u32) -> Result<Vec<Analysis>>;
}

// ============================================================================
// Wire envelopes (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct ReflectionEnvelope {
    reflection: Reflection,
}

#[derive(Debug, Deserialize)]
struct TodayEnvelope {
    exists: bool,
}

#[derive(Debug, Deserialize)]
struct ReflectionsEnvelope {
    #[serde(default)]
    reflections: Vec<Reflection>,
}

#[derive(Debug, Deserialize)]
struct AnalysisEnvelope {
    #[serde(default)]
    analysis: Option<Analysis>,
}

#[derive(Debug, Deserialize)]
struct AnalysesEnvelope {
    #[serde(default)]
    analyses: Vec<Analysis>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

// ============================================================================
// HttpReflectionClient
// ============================================================================

#[derive(Debug, Clone)]
pub struct HttpReflectionClient {
    client: Client,
    config: ApiConfig,
    base_url: Url,
}

impl HttpReflectionClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let base_url = config.base_url.clone();
        Self::with_base_url(config, base_url)
    }

    /// Create a client against a custom base URL (for testing / staging).
    pub fn with_base_url(config: ApiConfig, base_url: String) -> Result<Self> {
        let base_url = Url::parse(&base_url)
            .map_err(|e| ReflectError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ReflectError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GET with retry on transient failures. Delays start at `retry_delay_ms`
    /// and double per retry.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T> {
        let retry_strategy = ExponentialBackoff::from_millis(2)
            .factor((self.config.retry_delay_ms / 2).max(1))
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.config.max_retries);

        let result = RetryIf::start(
            retry_strategy,
            || self.get_once(url.clone(), query),
            |e: &ReflectError| e.is_transient(),
        )
        .await;

        match result {
            Ok(value) => Ok(value),
            Err(e) if e.is_transient() => {
                let attempts = self.config.max_retries + 1;
                tracing::error!(path = url.path(), attempts, error = %e, "All request attempts failed");
                Err(ReflectError::RetryExhausted {
                    attempts,
                    last: Box::new(e),
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T> {
        let request = self.authorize(self.client.get(url).query(query));
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(backend_error(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
}

fn backend_error(status: StatusCode, body: &str) -> ReflectError {
    let message = error_message(body).unwrap_or_else(|| body.to_string());
    tracing::error!(code = status.as_u16(), message = %message, "Reflection API error");
    ReflectError::Backend {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl ReflectionApi for HttpReflectionClient {
    async fn create_reflection(&self, draft: &ReflectionDraft) -> Result<Reflection> {
        draft.validate()?;

        let request = self.authorize(self.client.post(self.url(&["reflections"])).json(draft));
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
            let message =
                error_message(&body).unwrap_or_else(|| SUBMIT_FALLBACK_MESSAGE.to_string());
            return Err(ReflectError::Validation(message));
        }
        if !status.is_success() {
            return Err(backend_error(status, &body));
        }

        let envelope: ReflectionEnvelope = serde_json::from_str(&body)?;
        tracing::info!(id = %envelope.reflection.id, "Reflection created");
        Ok(envelope.reflection)
    }

    async fn check_today_reflection_exists(&self) -> Result<bool> {
        let envelope: TodayEnvelope = self
            .get_json(self.url(&["reflections", "today"]), &[])
            .await?;
        Ok(envelope.exists)
    }

    async fn get_latest_analysis(&self) -> Result<Option<Analysis>> {
        let envelope: AnalysisEnvelope = self
            .get_json(self.url(&["analysis", "latest"]), &[])
            .await?;
        Ok(envelope.analysis)
    }

    async fn get_latest_analysis_once(&self) -> Result<Option<Analysis>> {
        let envelope: AnalysisEnvelope = self
            .get_once(self.url(&["analysis", "latest"]), &[])
            .await?;
        Ok(envelope.analysis)
    }

    async fn get_analysis_by_reflection_id(
        &self,
        reflection_id: &str,
    ) -> Result<Option<Analysis>> {
        let url = self.url(&["analysis", "reflection", reflection_id]);
        match self.get_json::<AnalysisEnvelope>(url, &[]).await {
            Ok(envelope) => Ok(envelope.analysis),
            Err(ReflectError::Backend { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_reflections(&self, limit: u32) -> Result<Vec<Reflection>> {
        let envelope: ReflectionsEnvelope = self
            .get_json(self.url(&["reflections"]), &[("limit", limit.to_string())])
            .await?;
        Ok(envelope.reflections)
    }

    async fn list_analyses(&self, limit: u32) -> Result<Vec<Analysis>> {
        let envelope: AnalysesEnvelope = self
            .get_json(self.url(&["analysis"]), &[("limit", limit.to_string())])
            .await?;
        Ok(envelope.analyses)
    }
}

// ============================================================================
// TESTS
// ============================================================================
