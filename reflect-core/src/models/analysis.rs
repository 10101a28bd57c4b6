use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// AI-generated feedback for one reflection. Appears some time after the
/// reflection is created and is never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub id: String,
    #[serde(default)]
    pub reflection_id: Option<String>,
    #[serde(default)]
    pub reflection_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub analysis_text: Option<String>,
    #[serde(default)]
    pub recommendations: Option<String>,
    #[serde(default)]
    pub motivational_message: Option<String>,
    #[serde(default)]
    pub day_summary: Option<String>,
}
