//! Display helpers shared by the TUI views and headless output.

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use ratatui::style::{Color, Modifier, Style};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::api::{Priority, Severity};

pub const SCORE_MAX: f64 = 10.0;

/// Scores outside `[0, 10]` (or NaN) are clamped before display.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, SCORE_MAX)
}

/// One decimal place: `7.95` -> `"8.0"`, `5.999` -> `"6.0"`.
pub fn format_score(score: f64) -> String {
    format!("{:.1}", clamp_score(score))
}

pub fn score_badge(score: f64) -> String {
    format!("{}/10", format_score(score))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreGrade {
    Good,
    Fair,
    Poor,
}

impl ScoreGrade {
    pub fn from_score(score: f64) -> Self {
        let score = clamp_score(score);
        if score >= 8.0 {
            ScoreGrade::Good
        } else if score >= 6.0 {
            ScoreGrade::Fair
        } else {
            ScoreGrade::Poor
        }
    }

    pub fn color(self) -> Color {
        match self {
            ScoreGrade::Good => Color::Green,
            ScoreGrade::Fair => Color::Yellow,
            ScoreGrade::Poor => Color::Red,
        }
    }
}

pub fn score_style(score: f64) -> Style {
    Style::default()
        .fg(ScoreGrade::from_score(score).color())
        .add_modifier(Modifier::BOLD)
}

pub fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Critical => Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        Severity::High => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        Severity::Medium => Style::default().fg(Color::Yellow),
        Severity::Low => Style::default().fg(Color::Blue),
        Severity::Info => Style::default().fg(Color::DarkGray),
    }
}

pub fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::High => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::Low => Style::default().fg(Color::Green),
    }
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Render a backend timestamp in local time.
///
/// The backend emits ISO-8601, with or without an offset; a timestamp
/// without one is UTC. Anything unparsable is shown as-is.
pub fn format_timestamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(utc) => utc.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Truncate to `max_width` terminal columns, appending `...` when cut.
pub fn truncate(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let budget = max_width.saturating_sub(3);
    let mut width = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push_str("...");
    out
}
