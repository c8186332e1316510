use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::common::{dim, section_title};
use crate::app::App;
use crate::config::Config;

const KEYS: &[(&str, &[(&str, &str)])] = &[
    (
        "Global",
        &[
            ("Tab / 1 2 3", "Switch between Review, Docs and History"),
            ("?", "Toggle this help"),
            ("q / Ctrl-c", "Quit"),
        ],
    ),
    (
        "Review & Docs",
        &[
            ("e", "Edit the code in $EDITOR"),
            ("o", "Load code from a file"),
            ("x", "Clear the code"),
            ("l", "Next language"),
            ("p", "Next provider"),
            ("s", "Next docstring style"),
            ("Enter", "Submit for review / documentation"),
            ("j/k PgUp/PgDn", "Scroll the result"),
            ("r", "Reload the provider list"),
        ],
    ),
    (
        "History",
        &[
            ("j/k", "Select review"),
            ("h / l", "Previous / next page"),
            ("f", "Cycle language filter"),
            ("Enter", "Open review"),
            ("d", "Delete review (confirm with y)"),
            ("r", "Refresh"),
        ],
    ),
    (
        "Review detail",
        &[
            ("Esc / q", "Back to history"),
            ("d", "Delete this review"),
            ("r", "Reload"),
        ],
    ),
];

pub fn help_lines(docs_url: &str, base_url: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (section, keys) in KEYS {
        lines.push(section_title(*section));
        for (key, description) in keys.iter() {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:<16}", key),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(description.to_string()),
            ]));
        }
        lines.push(Line::from(""));
    }

    lines.push(section_title("Backend"));
    lines.push(Line::from(vec![
        Span::raw(format!("  {:<16}", "API")),
        Span::raw(base_url.to_string()),
    ]));
    lines.push(Line::from(vec![
        Span::raw(format!("  {:<16}", "API docs")),
        Span::styled(
            docs_url.to_string(),
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
        ),
    ]));
    if let Some(path) = Config::config_path() {
        lines.push(Line::from(vec![
            Span::raw(format!("  {:<16}", "Config")),
            dim(path.display().to_string()),
        ]));
    }
    lines
}

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let lines = help_lines(&app.client().docs_url(), app.client().base_url().as_str());
    let help = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.help_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help (Esc to close)"),
        );
    frame.render_widget(help, area);
}
