use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::common::{self, dim};
use crate::api::{LlmProvider, ProvidersResponse};
use crate::app::{App, CodeForm, Tab};
use crate::query::RequestState;

/// Left pane of the Review and Docs tabs: options on top, code below.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let option_rows = if app.tab == Tab::Docs { 4 } else { 3 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(option_rows + 2), Constraint::Min(0)])
        .split(area);

    let options = option_lines(&app.form, app.providers.state(), app.tab, app.spinner_char());
    let panel = Paragraph::new(options)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Options"));
    frame.render_widget(panel, chunks[0]);

    render_code(frame, chunks[1], &app.form, &app.config.theme);
}

pub fn option_lines(
    form: &CodeForm,
    providers: &RequestState<ProvidersResponse>,
    tab: Tab,
    spinner: &str,
) -> Vec<Line<'static>> {
    let label = |text: &str| Span::styled(format!("{:<10}", text), Style::default().fg(Color::Cyan));

    let mut lines = vec![
        Line::from(vec![
            label("Language"),
            Span::styled(
                form.language.display_name().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            dim("  (l)"),
        ]),
        provider_line(form, providers, spinner, label("Provider")),
    ];
    if tab == Tab::Docs {
        lines.push(Line::from(vec![
            label("Style"),
            Span::styled(
                form.doc_style.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            dim("  (s)"),
        ]));
    }
    lines.push(Line::from(vec![
        label("File"),
        Span::raw(form.filename.clone().unwrap_or_else(|| "untitled".to_string())),
        dim("  (o)"),
    ]));
    lines
}

/// Providers as badges: the selected one reversed, the backend default in green.
fn provider_line(
    form: &CodeForm,
    providers: &RequestState<ProvidersResponse>,
    spinner: &str,
    label: Span<'static>,
) -> Line<'static> {
    let mut spans = vec![label];
    match providers {
        RequestState::Success(response) if !response.providers.is_empty() => {
            for provider in &response.providers {
                spans.push(provider_badge(provider, form.provider.as_deref()));
                spans.push(Span::raw(" "));
            }
            spans.push(dim(" (p)"));
        }
        RequestState::Idle | RequestState::Loading => {
            spans.push(Span::raw(form.provider.clone().unwrap_or_default()));
            spans.push(dim(format!("  {}", spinner)));
        }
        RequestState::Success(_) | RequestState::Error(_) => {
            spans.push(Span::raw(
                form.provider.clone().unwrap_or_else(|| "default".to_string()),
            ));
            spans.push(dim("  (provider list unavailable)"));
        }
    }
    Line::from(spans)
}

fn provider_badge(provider: &LlmProvider, selected: Option<&str>) -> Span<'static> {
    let text = if provider.default {
        format!(" {} * ", provider.name)
    } else {
        format!(" {} ", provider.name)
    };
    let mut style = if provider.default {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    if selected == Some(provider.id.as_str()) {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(text, style)
}

fn render_code(frame: &mut Frame, area: Rect, form: &CodeForm, theme: &str) {
    let title = format!("Code ({} lines)", form.code.lines().count());
    if form.code.trim().is_empty() {
        let placeholder = Paragraph::new(vec![
            Line::from(dim("No code yet.")),
            Line::from(""),
            Line::from(dim("e: write it in $EDITOR")),
            Line::from(dim("o: load a file")),
        ])
        .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(placeholder, area);
        return;
    }

    let lines = common::code_block(&form.code, form.language.as_str(), theme);
    let code = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(code, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;

    fn providers() -> ProvidersResponse {
        ProvidersResponse {
            providers: vec![
                LlmProvider {
                    id: "gemini".to_string(),
                    name: "Google Gemini".to_string(),
                    models: vec![],
                    default: true,
                },
                LlmProvider {
                    id: "openai".to_string(),
                    name: "OpenAI".to_string(),
                    models: vec!["gpt-4o".to_string()],
                    default: false,
                },
            ],
        }
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_provider_badges_mark_default_and_selection() {
        let mut form = CodeForm::new(Some("openai".to_string()));
        form.language = Language::Go;
        let state = RequestState::Success(providers());
        let lines = option_lines(&form, &state, Tab::Review, "⠋");

        let provider_spans = &lines[1].spans;
        let gemini = provider_spans
            .iter()
            .find(|s| s.content.contains("Google Gemini"))
            .unwrap();
        assert!(gemini.content.contains('*'));
        assert_eq!(gemini.style.fg, Some(Color::Green));
        assert!(!gemini.style.add_modifier.contains(Modifier::REVERSED));

        let openai = provider_spans
            .iter()
            .find(|s| s.content.contains("OpenAI"))
            .unwrap();
        assert!(openai.style.add_modifier.contains(Modifier::REVERSED));
        assert!(line_text(&lines[0]).contains("Go"));
    }

    #[test]
    fn test_style_row_only_on_docs_tab() {
        let form = CodeForm::new(None);
        let state = RequestState::Loading;
        assert_eq!(option_lines(&form, &state, Tab::Review, "⠋").len(), 3);
        let docs = option_lines(&form, &state, Tab::Docs, "⠋");
        assert_eq!(docs.len(), 4);
        assert!(line_text(&docs[2]).contains("google"));
    }

    #[test]
    fn test_provider_error_falls_back_to_configured_id() {
        let form = CodeForm::new(Some("gemini".to_string()));
        let state = RequestState::Error("Network error".to_string());
        let lines = option_lines(&form, &state, Tab::Review, "⠋");
        let text = line_text(&lines[1]);
        assert!(text.contains("gemini"));
        assert!(text.contains("unavailable"));
    }
}
