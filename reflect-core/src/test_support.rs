//! In-memory `ReflectionApi` used by unit tests.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::time::Instant;

use crate::api::ReflectionApi;
use crate::error::{ReflectError, Result};
use crate::models::{Analysis, Prompt, Reflection, ReflectionDraft};

pub(crate) fn sample_analysis(id: &str) -> Analysis {
    Analysis {
        id: id.to_string(),
        reflection_id: Some(format!("r-{}", id)),
        reflection_date: None,
        analysis_text: Some("You handled stress well.".to_string()),
        recommendations: Some("Next:\n- sleep early\n- walk".to_string()),
        motivational_message: Some("Keep going.".to_string()),
        day_summary: None,
    }
}

pub(crate) fn sample_reflection(id: &str, year: i32, month: u32, day: u32) -> Reflection {
    Reflection {
        id: id.to_string(),
        reflection_date: Utc.with_ymd_and_hms(year, month, day, 20, 0, 0).unwrap(),
        day_summary: format!("summary {}", id),
        social_media_time: "an hour".to_string(),
        truthfulness_kindness: "kind".to_string(),
        conscious_actions: "mostly".to_string(),
        overthinking_stress: "a little".to_string(),
        gratitude_expression: "thanked a friend".to_string(),
        proud_moment: format!("proud {}", id),
        created_at: None,
    }
}

pub(crate) fn filled_draft() -> ReflectionDraft {
    let mut draft = ReflectionDraft::default();
    for prompt in Prompt::ALL {
        draft.set(prompt, format!("answer {}", prompt.number()));
    }
    draft
}

/// Scripted backend. `get_latest_analysis` pops queued results and returns
/// `Ok(None)` once the queue is empty.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    latest: Mutex<VecDeque<Result<Option<Analysis>>>>,
    latest_times: Mutex<Vec<Instant>>,
    latest_calls: AtomicUsize,
    today_exists: Option<bool>,
    create_error: Mutex<Option<ReflectError>>,
    created: Mutex<Vec<ReflectionDraft>>,
    by_reflection: HashMap<String, Analysis>,
    reflections: Vec<Reflection>,
    analyses: Vec<Analysis>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_latest(self, results: Vec<Result<Option<Analysis>>>) -> Self {
        *self.latest.lock().unwrap() = results.into();
        self
    }

    /// `None` makes the today check fail.
    pub(crate) fn with_today(mut self, exists: Option<bool>) -> Self {
        self.today_exists = exists;
        self
    }

    pub(crate) fn with_create_error(self, error: ReflectError) -> Self {
        *self.create_error.lock().unwrap() = Some(error);
        self
    }

    pub(crate) fn with_analysis_for(mut self, reflection_id: &str, analysis: Analysis) -> Self {
        self.by_reflection.insert(reflection_id.to_string(), analysis);
        self
    }

    pub(crate) fn with_history(mut self, reflections: Vec<Reflection>, analyses: Vec<Analysis>) -> Self {
        self.reflections = reflections;
        self.analyses = analyses;
        self
    }

    pub(crate) fn latest_calls(&self) -> usize {
        self.latest_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn latest_fetch_times(&self) -> Vec<Instant> {
        self.latest_times.lock().unwrap().clone()
    }

    pub(crate) fn created(&self) -> Vec<ReflectionDraft> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReflectionApi for ScriptedApi {
    async fn create_reflection(&self, draft: &ReflectionDraft) -> Result<Reflection> {
        if let Some(error) = self.create_error.lock().unwrap().take() {
            return Err(error);
        }
        self.created.lock().unwrap().push(draft.clone());
        let mut reflection = sample_reflection("new", 2026, 3, 14);
        reflection.day_summary = draft.day_summary.clone();
        Ok(reflection)
    }

    async fn check_today_reflection_exists(&self) -> Result<bool> {
        self.today_exists.ok_or_else(|| ReflectError::Backend {
            status: 503,
            message: "unavailable".to_string(),
        })
    }

    async fn get_latest_analysis(&self) -> Result<Option<Analysis>> {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        self.latest_times.lock().unwrap().push(Instant::now());
        self.latest.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }

    async fn get_analysis_by_reflection_id(&self, reflection_id: &str) -> Result<Option<Analysis>> {
        if reflection_id == "broken" {
            return Err(ReflectError::Backend {
                status: 500,
                message: "boom".to_string(),
            });
        }
        Ok(self.by_reflection.get(reflection_id).cloned())
    }

    async fn list_reflections(&self, limit: u32) -> Result<Vec<Reflection>> {
        Ok(self.reflections.iter().take(limit as usize).cloned().collect())
    }

    async fn list_analyses(&self, limit: u32) -> Result<Vec<Analysis>> {
        Ok(self.analyses.iter().take(limit as usize).cloned().collect())
    }
}
