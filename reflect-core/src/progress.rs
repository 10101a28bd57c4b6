use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

use crate::api::ReflectionApi;
use crate::error::Result;
use crate::models::{Analysis, Reflection};

const ACTIVITY_WINDOW: usize = 7;
const RECENT_INSIGHTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityPoint {
    /// `Jan 12`
    pub label: String,
    pub cumulative: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub total_reflections: usize,
    pub insights_received: usize,
    pub days_active: usize,
    /// The newest reflections in the window, oldest first.
    pub activity: Vec<ActivityPoint>,
    pub recent_insights: Vec<Analysis>,
}

impl ProgressSummary {
    /// Both inputs are newest first, as the backend lists them.
    pub fn from_history(reflections: &[Reflection], analyses: &[Analysis]) -> Self {
        let days: HashSet<NaiveDate> = reflections
            .iter()
            .map(|r| r.reflection_date.date_naive())
            .collect();

        let activity = reflections
            .iter()
            .take(ACTIVITY_WINDOW)
            .rev()
            .enumerate()
            .map(|(i, r)| ActivityPoint {
                label: r.reflection_date.format("%b %-d").to_string(),
                cumulative: i + 1,
            })
            .collect();

        Self {
            total_reflections: reflections.len(),
            insights_received: analyses.len(),
            days_active: days.len(),
            activity,
            recent_insights: analyses.iter().take(RECENT_INSIGHTS).cloned().collect(),
        }
    }
}

pub async fn load_progress(api: &dyn ReflectionApi, limit: u32) -> Result<ProgressSummary> {
    let (reflections, analyses) =
        futures::try_join!(api.list_reflections(limit), api.list_analyses(limit))?;

    tracing::debug!(
        reflections = reflections.len(),
        analyses = analyses.len(),
        "Loaded progress data"
    );

    Ok(ProgressSummary::from_history(&reflections, &analyses))
}
