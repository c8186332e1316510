pub mod common;
pub mod documentation;
pub mod form;
pub mod help;
pub mod history;
pub mod review;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame, Terminal,
};
use std::io::{self, Stdout};

use crate::app::{App, AppState, InputMode, NoticeLevel, Tab};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

pub fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

pub fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_tabs(frame, chunks[0], app);

    match app.state {
        AppState::Help => help::render(frame, chunks[1], app),
        AppState::ReviewDetail => review::render_detail(
            frame,
            chunks[1],
            app.review_detail.state(),
            &app.config.theme,
            app.detail_scroll,
            app.spinner_char(),
        ),
        AppState::Main => render_tab_body(frame, chunks[1], app),
    }

    render_footer(frame, chunks[2], app);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|tab| Line::from(format!(" {} ", tab.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("coddoc · {}", app.client().base_url())),
        );
    frame.render_widget(tabs, area);
}

fn render_tab_body(frame: &mut Frame, area: Rect, app: &App) {
    if app.tab == Tab::History {
        history::render(
            frame,
            area,
            app.history.state(),
            &app.pager,
            app.selected_review,
            app.spinner_char(),
        );
        return;
    }

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    form::render(frame, panes[0], app);

    if app.tab == Tab::Docs {
        documentation::render_result(
            frame,
            panes[1],
            app.document.state(),
            &app.config.theme,
            app.result_scroll,
            app.spinner_char(),
        );
    } else {
        review::render_result(
            frame,
            panes[1],
            app.analyze.state(),
            &app.config.theme,
            app.result_scroll,
            app.spinner_char(),
        );
    }
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let (line, border) = match &app.input_mode {
        InputMode::FilePath(buffer) => (
            Line::from(vec![
                Span::styled("Open file: ", Style::default().fg(Color::Cyan)),
                Span::raw(buffer.clone()),
                Span::styled("│", Style::default().fg(Color::DarkGray)),
            ]),
            Color::Cyan,
        ),
        InputMode::ConfirmDelete(id) => (
            Line::from(Span::styled(
                format!("Delete review {}? (y/N)", id),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Color::Red,
        ),
        InputMode::Normal => match &app.notice {
            Some(notice) => {
                let color = match notice.level {
                    NoticeLevel::Info => Color::Green,
                    NoticeLevel::Warning => Color::Yellow,
                    NoticeLevel::Error => Color::Red,
                };
                (
                    Line::from(Span::styled(notice.message.clone(), Style::default().fg(color))),
                    color,
                )
            }
            None => (Line::from(key_hints(app)), Color::Reset),
        },
    };

    let footer = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(footer, area);
}

fn key_hints(app: &App) -> String {
    match (app.state, app.tab) {
        (AppState::Help, _) => "j/k: scroll | Esc/?: close".to_string(),
        (AppState::ReviewDetail, _) => {
            "j/k: scroll | d: delete | r: reload | Esc: back | ?: help".to_string()
        }
        (AppState::Main, Tab::History) => {
            "j/k: move | Enter: open | h/l: page | f: filter | d: delete | r: refresh | Tab: switch | q: quit | ?: help"
                .to_string()
        }
        (AppState::Main, _) => {
            "e: edit | o: open | Enter: submit | l/p/s: language/provider/style | Tab: switch | q: quit | ?: help"
                .to_string()
        }
    }
}
