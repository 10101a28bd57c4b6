//! Structured text rendering for free-form analysis fields.
//!
//! Backend text arrives as paragraphs separated by blank lines. Each
//! paragraph is classified independently, first match wins:
//! 1. bullet list: contains `"\n-"` or `"\n•"`
//! 2. numbered list: contains a newline followed by `<digits>.`
//! 3. plain paragraph
//!
//! A list paragraph that yields no items is rendered as a plain paragraph
//! rather than an empty list.

use regex::Regex;
use std::sync::OnceLock;

const PARAGRAPH_SEPARATOR: &str = "\n\n";
const BULLET_MARKERS: [char; 2] = ['-', '•'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattedBlock {
    Paragraph(String),
    BulletList {
        title: Option<String>,
        items: Vec<String>,
    },
    NumberedList {
        title: Option<String>,
        items: Vec<String>,
    },
}

impl FormattedBlock {
    pub fn title(&self) -> Option<&str> {
        match self {
            FormattedBlock::Paragraph(_) => None,
            FormattedBlock::BulletList { title, .. } | FormattedBlock::NumberedList { title, .. } => {
                title.as_deref()
            }
        }
    }

    pub fn items(&self) -> &[String] {
        match self {
            FormattedBlock::Paragraph(_) => &[],
            FormattedBlock::BulletList { items, .. } | FormattedBlock::NumberedList { items, .. } => {
                items
            }
        }
    }

    /// Items paired with their 1-based display index. The index is the
    /// position in the list, never the digits from the source text.
    pub fn numbered_items(&self) -> impl Iterator<Item = (usize, &str)> {
        self.items()
            .iter()
            .enumerate()
            .map(|(i, item)| (i + 1, item.as_str()))
    }
}

fn numbered_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\d+\.").expect("valid numbered marker regex"))
}

fn numbered_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s*").expect("valid numbered prefix regex"))
}

/// Split `text` into display blocks. Empty or absent text yields nothing.
pub fn format(text: Option<&str>) -> Vec<FormattedBlock> {
    let Some(text) = text else {
        return Vec::new();
    };

    text.split(PARAGRAPH_SEPARATOR)
        .filter(|p| !p.trim().is_empty())
        .map(classify)
        .collect()
}

fn classify(paragraph: &str) -> FormattedBlock {
    if paragraph.contains("\n-") || paragraph.contains("\n•") {
        let (title, items) = extract(paragraph, is_bullet_line, strip_bullet);
        if !items.is_empty() {
            return FormattedBlock::BulletList { title, items };
        }
        tracing::debug!("Bullet marker without bullet lines, rendering as paragraph");
    } else if numbered_marker().is_match(paragraph) {
        let (title, items) = extract(paragraph, is_numbered_line, strip_number);
        if !items.is_empty() {
            return FormattedBlock::NumberedList { title, items };
        }
        tracing::debug!("Numbered marker without numbered lines, rendering as paragraph");
    }

    FormattedBlock::Paragraph(paragraph.to_string())
}

/// Title is the first non-empty line when it is not itself an item.
fn extract(
    paragraph: &str,
    is_item: fn(&str) -> bool,
    strip: fn(&str) -> String,
) -> (Option<String>, Vec<String>) {
    let lines: Vec<&str> = paragraph
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let title = lines
        .first()
        .filter(|first| !is_item(first))
        .map(|first| first.to_string());

    let items = lines
        .iter()
        .filter(|l| is_item(l))
        .map(|l| strip(l))
        .collect();

    (title, items)
}

fn is_bullet_line(line: &str) -> bool {
    line.starts_with(BULLET_MARKERS)
}

fn strip_bullet(line: &str) -> String {
    line.strip_prefix(BULLET_MARKERS)
        .unwrap_or(line)
        .trim_start()
        .to_string()
}

fn is_numbered_line(line: &str) -> bool {
    numbered_prefix().is_match(line)
}

fn strip_number(line: &str) -> String {
    numbered_prefix().replace(line, "").into_owned()
}
