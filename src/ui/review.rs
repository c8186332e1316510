use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::common::{self, dim, section_title, text_lines};
use crate::api::{AnalyzeResponse, Severity};
use crate::format::{format_timestamp, priority_style, score_badge, score_style, severity_style};
use crate::query::RequestState;

/// Everything shown for one review, top to bottom.
pub fn analysis_lines(response: &AnalyzeResponse, theme: &str) -> Vec<Line<'static>> {
    let analysis = &response.analysis;
    let mut lines = Vec::new();

    let mut header = vec![
        Span::raw("Quality score "),
        Span::styled(
            format!(" {} ", score_badge(analysis.quality_score)),
            score_style(analysis.quality_score).add_modifier(Modifier::REVERSED),
        ),
        Span::raw("  "),
        Span::styled(response.language.clone(), Style::default().fg(Color::Yellow)),
    ];
    if let Some(ref filename) = response.filename {
        header.push(Span::raw("  "));
        header.push(Span::styled(filename.clone(), Style::default().fg(Color::Cyan)));
    }
    header.push(Span::raw("  "));
    header.push(dim(format_timestamp(&response.created_at)));
    lines.push(Line::from(header));
    lines.push(Line::from(""));

    lines.push(section_title("Summary"));
    if analysis.summary.trim().is_empty() {
        lines.push(Line::from(dim("  No summary")));
    } else {
        lines.extend(text_lines(&analysis.summary, 2, Style::default()));
    }
    lines.push(Line::from(""));

    lines.push(section_title(format!(
        "Security Concerns ({})",
        analysis.security_concerns.len()
    )));
    if analysis.security_concerns.is_empty() {
        lines.push(Line::from(dim("  No security concerns found")));
    }
    for concern in &analysis.security_concerns {
        let severity = Severity::from(concern.severity);
        lines.push(Line::from(vec![
            Span::raw("  "),
            severity_tag(severity),
            Span::raw(" "),
            Span::styled(
                concern.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.extend(text_lines(&concern.description, 4, Style::default()));
        if !concern.recommendation.trim().is_empty() {
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled("Recommendation: ", Style::default().fg(Color::Green)),
                Span::raw(concern.recommendation.clone()),
            ]));
        }
    }
    lines.push(Line::from(""));

    lines.push(section_title(format!("Issues ({})", analysis.issues.len())));
    if analysis.issues.is_empty() {
        lines.push(Line::from(dim("  No issues found")));
    }
    for issue in &analysis.issues {
        let mut spans = vec![
            Span::raw("  "),
            severity_tag(issue.severity),
            Span::raw(" "),
            Span::styled(issue.category.clone(), Style::default().fg(Color::Magenta)),
        ];
        if let Some(line) = issue.line_number {
            spans.push(dim(format!("  Line {}", line)));
        }
        lines.push(Line::from(spans));
        lines.extend(text_lines(&issue.description, 4, Style::default()));
        if !issue.suggestion.trim().is_empty() {
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled("Suggestion: ", Style::default().fg(Color::Green)),
                Span::raw(issue.suggestion.clone()),
            ]));
        }
    }
    lines.push(Line::from(""));

    lines.push(section_title(format!(
        "Suggestions ({})",
        analysis.suggestions.len()
    )));
    if analysis.suggestions.is_empty() {
        lines.push(Line::from(dim("  No suggestions")));
    }
    for suggestion in &analysis.suggestions {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!("[{}]", suggestion.priority.label()),
                priority_style(suggestion.priority),
            ),
            Span::raw(" "),
            Span::styled(
                suggestion.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.extend(text_lines(&suggestion.description, 4, Style::default()));
        if let Some(ref example) = suggestion.code_example {
            lines.extend(common::snippet(example, &response.language, theme, 4));
        }
    }
    lines.push(Line::from(""));

    lines.push(section_title("Code"));
    lines.extend(common::code_block(&response.code, &response.language, theme));

    lines
}

fn severity_tag(severity: Severity) -> Span<'static> {
    Span::styled(
        format!("[{}]", severity.label().to_uppercase()),
        severity_style(severity),
    )
}

/// Right-hand panel of the Review tab.
pub fn render_result(
    frame: &mut Frame,
    area: Rect,
    state: &RequestState<AnalyzeResponse>,
    theme: &str,
    scroll: u16,
    spinner: &str,
) {
    const TITLE: &str = "Review";
    match state {
        RequestState::Idle => {
            let hint = Paragraph::new(vec![
                Line::from("Load or write some code, then press Enter to review it."),
                Line::from(""),
                Line::from(dim("e: edit in $EDITOR | o: open file | l: language | p: provider")),
            ])
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(TITLE));
            frame.render_widget(hint, area);
        }
        RequestState::Loading => {
            common::render_loading(frame, area, TITLE, spinner, "Analyzing code...")
        }
        RequestState::Error(message) => common::render_error(frame, area, TITLE, message),
        RequestState::Success(response) => {
            let title = format!("{} {}", TITLE, response.review_id);
            common::render_lines(frame, area, title, analysis_lines(response, theme), scroll);
        }
    }
}

/// Stored review opened from history.
pub fn render_detail(
    frame: &mut Frame,
    area: Rect,
    state: &RequestState<AnalyzeResponse>,
    theme: &str,
    scroll: u16,
    spinner: &str,
) {
    const TITLE: &str = "Review Detail";
    match state {
        RequestState::Idle | RequestState::Loading => {
            common::render_loading(frame, area, TITLE, spinner, "Loading review...")
        }
        RequestState::Error(message) => common::render_error(frame, area, TITLE, message),
        RequestState::Success(response) => {
            let title = format!("{} {}", TITLE, response.review_id);
            common::render_lines(frame, area, title, analysis_lines(response, theme), scroll);
        }
    }
}
