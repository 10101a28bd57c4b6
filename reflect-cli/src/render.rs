//! Plain-text rendering of core view-models for the terminal.

use chrono::Local;
use reflect_core::history::{long_date, CardDate, ReflectionDetail};
use reflect_core::insights::{sections, Placeholder};
use reflect_core::{Analysis, FormattedBlock, ProgressSummary, Reflection};
use std::fmt::Write;

const RULE: &str = "────────────────────────────────────────";

/// First `max` characters of `text`, with an ellipsis when cut.
pub fn clamp(text: &str, max: usize) -> String {
    let mut out: String = text.chars().take(max).collect();
    if text.chars().count() > max {
        out.push('…');
    }
    out
}

pub fn render_blocks(blocks: &[FormattedBlock]) -> String {
    let rendered: Vec<String> = blocks
        .iter()
        .map(|block| match block {
            FormattedBlock::Paragraph(text) => text.clone(),
            FormattedBlock::BulletList { title, items } => {
                let mut out = String::new();
                if let Some(title) = title {
                    let _ = writeln!(out, "{}", title);
                }
                for item in items {
                    let _ = writeln!(out, "  • {}", item);
                }
                out.trim_end().to_string()
            }
            FormattedBlock::NumberedList { title, .. } => {
                let mut out = String::new();
                if let Some(title) = title {
                    let _ = writeln!(out, "{}", title);
                }
                for (index, item) in block.numbered_items() {
                    let _ = writeln!(out, "  {}. {}", index, item);
                }
                out.trim_end().to_string()
            }
        })
        .collect();

    rendered.join("\n\n")
}

pub fn render_analysis(analysis: &Analysis) -> String {
    let mut out = String::new();
    for section in sections(analysis) {
        let _ = writeln!(out, "{}", section.kind.title());
        if let Some(subtitle) = section.kind.subtitle() {
            let _ = writeln!(out, "{}", subtitle);
        }
        let _ = writeln!(out, "{}", RULE);
        let _ = writeln!(out, "{}\n", render_blocks(&section.blocks));
    }
    out.trim_end().to_string()
}

pub fn render_placeholder(placeholder: Placeholder) -> String {
    format!("{}\n{}", placeholder.title(), placeholder.message())
}

/// Analysis when present, otherwise the matching placeholder.
pub fn render_insights(analysis: Option<&Analysis>, loading: bool) -> String {
    match analysis {
        Some(analysis) if !loading => render_analysis(analysis),
        _ => render_placeholder(Placeholder::for_loading(loading)),
    }
}

pub fn render_card(reflection: &Reflection) -> String {
    let date = CardDate::new(&reflection.reflection_date.with_timezone(&Local));
    format!(
        "{}  [{}]\n  Day summary:  {}\n  Proud moment: {}",
        date,
        reflection.id,
        clamp(&reflection.day_summary, 120),
        clamp(&reflection.proud_moment, 80)
    )
}

pub fn render_detail(detail: &ReflectionDetail) -> String {
    let mut out = String::new();
    let date = long_date(&detail.reflection.reflection_date.with_timezone(&Local));
    let _ = writeln!(out, "{}\n{}\n", date, RULE);

    for (prompt, answer) in detail.answers() {
        let _ = writeln!(out, "{}. {}\n   {}\n", prompt.number(), prompt.heading(), answer);
    }

    let _ = writeln!(out, "Personal Insights\n{}", RULE);
    match &detail.analysis {
        Some(analysis) => out.push_str(&render_analysis(analysis)),
        None => out.push_str(&render_placeholder(Placeholder::NoInsights)),
    }
    out
}

pub fn render_progress(summary: &ProgressSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total reflections:    {}", summary.total_reflections);
    let _ = writeln!(out, "AI insights received: {}", summary.insights_received);
    let _ = writeln!(out, "Days active:          {}", summary.days_active);

    if !summary.activity.is_empty() {
        let _ = writeln!(out, "\nReflection activity");
        for point in &summary.activity {
            let _ = writeln!(
                out,
                "  {:<7} {} {}",
                point.label,
                "█".repeat(point.cumulative),
                point.cumulative
            );
        }
    }

    let _ = writeln!(out, "\nRecent insights");
    if summary.recent_insights.is_empty() {
        let _ = writeln!(out, "  {}", Placeholder::NoInsights.title());
    }
    for (i, analysis) in summary.recent_insights.iter().enumerate() {
        let date = analysis
            .reflection_date
            .map(|d| d.with_timezone(&Local).format("%B %-d, %Y").to_string())
            .unwrap_or_else(|| "Undated".to_string());
        let _ = writeln!(out, "  {}. {}", i + 1, date);
        if let Some(summary) = &analysis.day_summary {
            let _ = writeln!(out, "     {}", clamp(summary, 100));
        }
        if let Some(message) = &analysis.motivational_message {
            let _ = writeln!(out, "     “{}”", clamp(message, 100));
        }
    }
    out.trim_end().to_string()
}
