//! Past reflections: the newest-first list and the per-entry detail view.

use chrono::{DateTime, TimeZone};
use std::fmt;

use crate::api::ReflectionApi;
use crate::error::Result;
use crate::models::{Analysis, Prompt, Reflection};

pub const DEFAULT_HISTORY_LIMIT: u32 = 30;

/// A reflection with whatever analysis exists for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionDetail {
    pub reflection: Reflection,
    pub analysis: Option<Analysis>,
}

impl ReflectionDetail {
    /// Answers in form order, paired with their short headings.
    pub fn answers(&self) -> Vec<(Prompt, &str)> {
        Prompt::ALL
            .into_iter()
            .map(|p| (p, self.reflection.answer(p)))
            .collect()
    }
}

pub async fn recent_reflections(api: &dyn ReflectionApi, limit: u32) -> Result<Vec<Reflection>> {
    let reflections = api.list_reflections(limit).await?;
    tracing::debug!(count = reflections.len(), limit, "Loaded reflections");
    Ok(reflections)
}

/// Load the analysis for one reflection. A failed lookup is logged and
/// shown as "no analysis".
pub async fn reflection_detail(api: &dyn ReflectionApi, reflection: Reflection) -> ReflectionDetail {
    let analysis = match api.get_analysis_by_reflection_id(&reflection.id).await {
        Ok(analysis) => analysis,
        Err(e) => {
            tracing::warn!(id = %reflection.id, error = %e, "Failed to load analysis for reflection");
            None
        }
    };

    ReflectionDetail {
        reflection,
        analysis,
    }
}

/// Find one reflection by id among the recent ones.
pub async fn find_reflection(
    api: &dyn ReflectionApi,
    id: &str,
    limit: u32,
) -> Result<Option<Reflection>> {
    let reflections = recent_reflections(api, limit).await?;
    Ok(reflections.into_iter().find(|r| r.id == id))
}

/// `Monday, January 12, 2026`
pub fn long_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    date.format("%A, %B %-d, %Y").to_string()
}

/// Date pieces shown on a history card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDate {
    pub day: String,
    pub month: String,
    pub year: String,
    pub weekday: String,
}

impl CardDate {
    pub fn new<Tz: TimeZone>(date: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self {
            day: date.format("%-d").to_string(),
            month: date.format("%b").to_string(),
            year: date.format("%Y").to_string(),
            weekday: date.format("%a").to_string(),
        }
    }
}

impl fmt::Display for CardDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({}, {})", self.day, self.month, self.weekday, self.year)
    }
}
