use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::syntax;

/// Width of the `NNNN │ ` gutter in front of code lines.
pub const GUTTER_WIDTH: usize = 7;

pub fn section_title(title: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(
        title.into(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    ))
}

pub fn dim(text: impl Into<String>) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(Color::DarkGray))
}

/// Indent every line of `text` by `indent` spaces, keeping one `Line` per
/// source line.
pub fn text_lines(text: &str, indent: usize, style: Style) -> Vec<Line<'static>> {
    let pad = " ".repeat(indent);
    text.lines()
        .map(|l| Line::from(Span::styled(format!("{}{}", pad, l), style)))
        .collect()
}

/// Syntax-highlighted code with a line-number gutter.
pub fn code_block(code: &str, language: &str, theme: &str) -> Vec<Line<'static>> {
    syntax::highlight_code(code, language, theme)
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let mut spans = vec![dim(format!("{:>4} │ ", i + 1))];
            spans.extend(line.spans);
            Line::from(spans)
        })
        .collect()
}

/// Highlighted snippet without a gutter (suggestion and usage examples).
pub fn snippet(code: &str, language: &str, theme: &str, indent: usize) -> Vec<Line<'static>> {
    let pad = " ".repeat(indent);
    syntax::highlight_code(code, language, theme)
        .into_iter()
        .map(|line| {
            let mut spans = vec![Span::raw(pad.clone()), dim("│ ")];
            spans.extend(line.spans);
            Line::from(spans)
        })
        .collect()
}

pub fn render_error(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let lines = vec![
        Line::from(Span::styled(
            "Error",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(dim("Press r to retry")),
    ];
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(title.to_string()),
        );
    frame.render_widget(paragraph, area);
}

pub fn render_loading(frame: &mut Frame, area: Rect, title: &str, spinner: &str, message: &str) {
    let loading = Paragraph::new(format!("{} {}", spinner, message))
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    frame.render_widget(loading, area);
}

/// Scrollable, wrapped panel of prepared lines.
pub fn render_lines(frame: &mut Frame, area: Rect, title: String, lines: Vec<Line<'static>>, scroll: u16) {
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, area);
}
