//! Presentation of an analysis as titled sections.

use crate::format::{format, FormattedBlock};
use crate::models::Analysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    KeyInsights,
    ActionSteps,
    Encouragement,
}

impl InsightKind {
    pub fn title(self) -> &'static str {
        match self {
            InsightKind::KeyInsights => "Key Insights",
            InsightKind::ActionSteps => "Action Steps",
            InsightKind::Encouragement => "Words of Encouragement",
        }
    }

    pub fn subtitle(self) -> Option<&'static str> {
        match self {
            InsightKind::KeyInsights => Some("Understanding your reflection"),
            InsightKind::ActionSteps => Some("Practical guidance for growth"),
            InsightKind::Encouragement => None,
        }
    }

    fn text(self, analysis: &Analysis) -> Option<&str> {
        match self {
            InsightKind::KeyInsights => analysis.analysis_text.as_deref(),
            InsightKind::ActionSteps => analysis.recommendations.as_deref(),
            InsightKind::Encouragement => analysis.motivational_message.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightSection {
    pub kind: InsightKind,
    pub blocks: Vec<FormattedBlock>,
}

/// Sections for the fields that carry text, in display order.
pub fn sections(analysis: &Analysis) -> Vec<InsightSection> {
    [
        InsightKind::KeyInsights,
        InsightKind::ActionSteps,
        InsightKind::Encouragement,
    ]
    .into_iter()
    .filter_map(|kind| {
        let text = kind.text(analysis).filter(|t| !t.is_empty())?;
        Some(InsightSection {
            kind,
            blocks: format(Some(text)),
        })
    })
    .collect()
}

/// What to show in place of an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Analyzing,
    NoInsights,
}

impl Placeholder {
    pub fn for_loading(loading: bool) -> Self {
        if loading {
            Placeholder::Analyzing
        } else {
            Placeholder::NoInsights
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Placeholder::Analyzing => "Analyzing Your Reflection",
            Placeholder::NoInsights => "No Insights Yet",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Placeholder::Analyzing => {
                "We're processing your thoughts and generating personalized insights..."
            }
            Placeholder::NoInsights => {
                "Complete your daily reflection to receive personalized insights and guidance tailored to your journey."
            }
        }
    }
}
