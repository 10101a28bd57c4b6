use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReflectError;

/// A submitted daily reflection. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reflection {
    pub id: String,
    pub reflection_date: DateTime<Utc>,
    pub day_summary: String,
    pub social_media_time: String,
    pub truthfulness_kindness: String,
    pub conscious_actions: String,
    pub overthinking_stress: String,
    pub gratitude_expression: String,
    pub proud_moment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Reflection {
    pub fn answer(&self, prompt: Prompt) -> &str {
        match prompt {
            Prompt::DaySummary => &self.day_summary,
            Prompt::SocialMediaTime => &self.social_media_time,
            Prompt::TruthfulnessKindness => &self.truthfulness_kindness,
            Prompt::ConsciousActions => &self.conscious_actions,
            Prompt::OverthinkingStress => &self.overthinking_stress,
            Prompt::GratitudeExpression => &self.gratitude_expression,
            Prompt::ProudMoment => &self.proud_moment,
        }
    }
}

/// The seven fixed questions of the daily form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prompt {
    DaySummary,
    SocialMediaTime,
    TruthfulnessKindness,
    ConsciousActions,
    OverthinkingStress,
    GratitudeExpression,
    ProudMoment,
}

impl Prompt {
    pub const ALL: [Prompt; 7] = [
        Prompt::DaySummary,
        Prompt::SocialMediaTime,
        Prompt::TruthfulnessKindness,
        Prompt::ConsciousActions,
        Prompt::OverthinkingStress,
        Prompt::GratitudeExpression,
        Prompt::ProudMoment,
    ];

    /// Field name on the wire.
    pub fn key(self) -> &'static str {
        match self {
            Prompt::DaySummary => "daySummary",
            Prompt::SocialMediaTime => "socialMediaTime",
            Prompt::TruthfulnessKindness => "truthfulnessKindness",
            Prompt::ConsciousActions => "consciousActions",
            Prompt::OverthinkingStress => "overthinkingStress",
            Prompt::GratitudeExpression => "gratitudeExpression",
            Prompt::ProudMoment => "proudMoment",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Prompt::DaySummary => "How was your day?",
            Prompt::SocialMediaTime => {
                "How much time did you spend on social media, and how did it make you feel?"
            }
            Prompt::TruthfulnessKindness => {
                "Were you truthful and kind or lied and used harsh words?"
            }
            Prompt::ConsciousActions => "Did you act consciously or react impulsively today?",
            Prompt::OverthinkingStress => {
                "Did you overthink or stress about something? If yes, what was it?"
            }
            Prompt::GratitudeExpression => {
                "Did you express gratitude for what you have or to someone who made your day?"
            }
            Prompt::ProudMoment => "What is one thing you are proud of doing today?",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Prompt::DaySummary => "Describe briefly or in one word...",
            Prompt::SocialMediaTime => "Be honest about your usage and feelings...",
            Prompt::TruthfulnessKindness => "Describe in detail about the event and reaction...",
            Prompt::ConsciousActions => "Describe the event and reaction...",
            Prompt::OverthinkingStress => "Share what was on your mind...",
            Prompt::GratitudeExpression => "Who or what are you grateful for today?...",
            Prompt::ProudMoment => "Celebrate your achievement, big or small...",
        }
    }

    /// Short heading used when a stored reflection is shown in full.
    pub fn heading(self) -> &'static str {
        match self {
            Prompt::DaySummary => "How was your day?",
            Prompt::SocialMediaTime => "Social Media Usage",
            Prompt::TruthfulnessKindness => "Truthfulness & Kindness",
            Prompt::ConsciousActions => "Conscious Actions",
            Prompt::OverthinkingStress => "Overthinking/Stress",
            Prompt::GratitudeExpression => "Gratitude Expression",
            Prompt::ProudMoment => "Proud Moment",
        }
    }

    /// 1-based position on the form.
    pub fn number(self) -> usize {
        Prompt::ALL.iter().position(|p| *p == self).unwrap_or(0) + 1
    }
}

/// Answers being composed for a new reflection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionDraft {
    pub day_summary: String,
    pub social_media_time: String,
    pub truthfulness_kindness: String,
    pub conscious_actions: String,
    pub overthinking_stress: String,
    pub gratitude_expression: String,
    pub proud_moment: String,
}

impl ReflectionDraft {
    pub fn answer(&self, prompt: Prompt) -> &str {
        match prompt {
            Prompt::DaySummary => &self.day_summary,
            Prompt::SocialMediaTime => &self.social_media_time,
            Prompt::TruthfulnessKindness => &self.truthfulness_kindness,
            Prompt::ConsciousActions => &self.conscious_actions,
            Prompt::OverthinkingStress => &self.overthinking_stress,
            Prompt::GratitudeExpression => &self.gratitude_expression,
            Prompt::ProudMoment => &self.proud_moment,
        }
    }

    pub fn set(&mut self, prompt: Prompt, value: impl Into<String>) {
        let slot = match prompt {
            Prompt::DaySummary => &mut self.day_summary,
            Prompt::SocialMediaTime => &mut self.social_media_time,
            Prompt::TruthfulnessKindness => &mut self.truthfulness_kindness,
            Prompt::ConsciousActions => &mut self.conscious_actions,
            Prompt::OverthinkingStress => &mut self.overthinking_stress,
            Prompt::GratitudeExpression => &mut self.gratitude_expression,
            Prompt::ProudMoment => &mut self.proud_moment,
        };
        *slot = value.into();
    }

    /// First prompt left blank, in form order.
    pub fn first_missing(&self) -> Option<Prompt> {
        Prompt::ALL
            .into_iter()
            .find(|p| self.answer(*p).trim().is_empty())
    }

    pub fn validate(&self) -> Result<(), ReflectError> {
        match self.first_missing() {
            Some(prompt) => Err(ReflectError::Validation(format!(
                "Please answer question {}: {}",
                prompt.number(),
                prompt.label()
            ))),
            None => Ok(()),
        }
    }
}
