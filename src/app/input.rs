use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::PathBuf;
use std::time::Duration;

use crate::editor;
use crate::ui::{self, Tui};

use super::{App, AppState, InputMode, NoticeLevel, Tab, TerminalAction};

const SCROLL_STEP: u16 = 1;
const PAGE_SCROLL_STEP: u16 = 15;

impl App {
    pub(crate) fn handle_input(&mut self, terminal: &mut Tui) -> Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Kitty keyboard protocol reports Release/Repeat too; act on Press only.
                if key.kind != KeyEventKind::Press {
                    return Ok(());
                }
                if let Some(TerminalAction::OpenEditor) = self.handle_key(key) {
                    self.edit_code_in_editor(terminal)?;
                }
            }
        }
        Ok(())
    }

    /// Apply one key press. Anything needing the real terminal is returned
    /// to the caller instead of being performed here.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<TerminalAction> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }

        match self.input_mode.clone() {
            InputMode::FilePath(buffer) => {
                self.handle_file_path_input(key, buffer);
                return None;
            }
            InputMode::ConfirmDelete(review_id) => {
                self.handle_confirm_delete_input(key, review_id);
                return None;
            }
            InputMode::Normal => {}
        }

        match self.state {
            AppState::Help => {
                self.handle_help_input(key);
                None
            }
            AppState::ReviewDetail => {
                self.handle_review_detail_input(key);
                None
            }
            AppState::Main => self.handle_main_input(key),
        }
    }

    fn handle_main_input(&mut self, key: KeyEvent) -> Option<TerminalAction> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return None;
            }
            KeyCode::Char('?') => {
                self.open_help();
                return None;
            }
            KeyCode::Tab => {
                self.switch_tab(self.tab.next());
                return None;
            }
            KeyCode::Char('1') => {
                self.switch_tab(Tab::Review);
                return None;
            }
            KeyCode::Char('2') => {
                self.switch_tab(Tab::Docs);
                return None;
            }
            KeyCode::Char('3') => {
                self.switch_tab(Tab::History);
                return None;
            }
            _ => {}
        }

        match self.tab {
            Tab::Review | Tab::Docs => self.handle_form_input(key),
            Tab::History => {
                self.handle_history_input(key);
                None
            }
        }
    }

    pub(crate) fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.result_scroll = 0;
        if tab == Tab::History {
            // served from cache unless something invalidated it
            self.load_history();
        }
    }

    fn handle_form_input(&mut self, key: KeyEvent) -> Option<TerminalAction> {
        match key.code {
            KeyCode::Char('e') => return Some(TerminalAction::OpenEditor),
            KeyCode::Char('o') => {
                self.input_mode = InputMode::FilePath(String::new());
            }
            KeyCode::Char('l') => {
                self.form.language = self.form.language.next();
            }
            KeyCode::Char('p') => {
                let providers = self.provider_list().to_vec();
                if providers.is_empty() {
                    self.set_notice(NoticeLevel::Warning, "No providers loaded (r to retry)");
                } else {
                    self.form.cycle_provider(&providers);
                }
            }
            KeyCode::Char('s') => {
                self.form.doc_style = self.form.doc_style.next();
            }
            KeyCode::Char('x') => {
                self.form.filename = None;
                self.set_code(String::new());
            }
            KeyCode::Char('r') => self.reload_providers(),
            KeyCode::Enter => match self.tab {
                Tab::Docs => self.submit_document(),
                _ => self.submit_analyze(),
            },
            KeyCode::Char('j') | KeyCode::Down => {
                self.result_scroll = self.result_scroll.saturating_add(SCROLL_STEP);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.result_scroll = self.result_scroll.saturating_sub(SCROLL_STEP);
            }
            KeyCode::PageDown => {
                self.result_scroll = self.result_scroll.saturating_add(PAGE_SCROLL_STEP);
            }
            KeyCode::PageUp => {
                self.result_scroll = self.result_scroll.saturating_sub(PAGE_SCROLL_STEP);
            }
            _ => {}
        }
        None
    }

    fn handle_history_input(&mut self, key: KeyEvent) {
        let count = self.history_reviews().len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if count > 0 {
                    self.selected_review = (self.selected_review + 1).min(count - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_review = self.selected_review.saturating_sub(1);
            }
            KeyCode::Char('h') | KeyCode::Left => self.history_prev_page(),
            KeyCode::Char('l') | KeyCode::Right => self.history_next_page(),
            KeyCode::Char('f') => self.cycle_history_filter(),
            KeyCode::Char('r') => self.refresh_history(),
            KeyCode::Enter => {
                if let Some(id) = self.selected_review_summary().map(|r| r.review_id.clone()) {
                    self.open_review(id);
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_review_summary().map(|r| r.review_id.clone()) {
                    self.request_delete(id);
                }
            }
            _ => {}
        }
    }

    fn handle_review_detail_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => self.back_to_history(),
            KeyCode::Char('?') => self.open_help(),
            KeyCode::Char('j') | KeyCode::Down => {
                self.detail_scroll = self.detail_scroll.saturating_add(SCROLL_STEP);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.detail_scroll = self.detail_scroll.saturating_sub(SCROLL_STEP);
            }
            KeyCode::PageDown => {
                self.detail_scroll = self.detail_scroll.saturating_add(PAGE_SCROLL_STEP);
            }
            KeyCode::PageUp => {
                self.detail_scroll = self.detail_scroll.saturating_sub(PAGE_SCROLL_STEP);
            }
            KeyCode::Char('r') => self.reload_review(),
            KeyCode::Char('d') => {
                if let Some(id) = self.review_detail.key().cloned() {
                    self.request_delete(id);
                }
            }
            _ => {}
        }
    }

    fn handle_help_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => self.close_help(),
            KeyCode::Char('j') | KeyCode::Down => {
                self.help_scroll = self.help_scroll.saturating_add(SCROLL_STEP);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.help_scroll = self.help_scroll.saturating_sub(SCROLL_STEP);
            }
            _ => {}
        }
    }

    fn handle_file_path_input(&mut self, key: KeyEvent, mut buffer: String) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                let path = PathBuf::from(buffer.trim());
                if path.as_os_str().is_empty() {
                    return;
                }
                match self.load_file(&path) {
                    Ok(()) => self.set_notice(
                        NoticeLevel::Info,
                        format!("Loaded {} ({})", path.display(), self.form.language),
                    ),
                    Err(e) => self.set_notice(NoticeLevel::Error, format!("{:#}", e)),
                }
            }
            KeyCode::Backspace => {
                buffer.pop();
                self.input_mode = InputMode::FilePath(buffer);
            }
            KeyCode::Char(c) => {
                buffer.push(c);
                self.input_mode = InputMode::FilePath(buffer);
            }
            _ => {}
        }
    }

    fn handle_confirm_delete_input(&mut self, key: KeyEvent, review_id: String) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => self.confirm_delete(review_id),
            _ => {
                self.input_mode = InputMode::Normal;
                self.set_notice(NoticeLevel::Info, "Delete cancelled");
            }
        }
    }

    /// Suspend the TUI, edit the code buffer externally, then resume.
    fn edit_code_in_editor(&mut self, terminal: &mut Tui) -> Result<()> {
        ui::restore_terminal(terminal)?;
        let result = editor::open_code_editor(
            self.config.editor.as_deref(),
            self.form.language,
            &self.form.code,
        );
        // re-enter the TUI regardless of the editor outcome
        *terminal = ui::setup_terminal()?;

        match result {
            Ok(Some(code)) => self.set_code(code),
            Ok(None) => self.set_notice(NoticeLevel::Warning, "Editor exited with an error; code unchanged"),
            Err(e) => {
                tracing::warn!(error = %e, "editor failed");
                self.set_notice(NoticeLevel::Error, format!("Editor failed: {}", e));
            }
        }
        Ok(())
    }
}
