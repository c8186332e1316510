use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{
    validate_code, AnalyzeResponse, ApiClient, DocumentResponse, ProvidersResponse,
    ReviewSummary, ReviewsListResponse, ReviewsQuery,
};
use crate::config::Config;
use crate::editor;
use crate::language::Language;
use crate::query::{Mutation, Query, QueryCache};
use crate::ui;

mod history;
pub use history::{HistoryPager, HISTORY_FILTERS};

mod types;
pub use types::*;

mod input;
mod polling;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// How long a status-line notice stays visible.
const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Query caches shared by every view of the session.
#[derive(Clone, Default)]
pub struct QueryCaches {
    pub providers: QueryCache<(), ProvidersResponse>,
    pub reviews: QueryCache<ReviewsQuery, ReviewsListResponse>,
    pub review: QueryCache<String, AnalyzeResponse>,
}

impl QueryCaches {
    /// Anything that lists or shows stored reviews.
    pub fn invalidate_reviews(&self) {
        self.reviews.invalidate_all();
        self.review.invalidate_all();
    }
}

pub struct App {
    pub config: Arc<Config>,
    client: ApiClient,
    caches: QueryCaches,
    pub state: AppState,
    /// State to return to when help is closed.
    help_return: AppState,
    pub tab: Tab,
    pub input_mode: InputMode,
    pub form: CodeForm,
    pub analyze: Mutation<AnalyzeResponse>,
    pub document: Mutation<DocumentResponse>,
    /// Resolves to the id of the deleted review.
    pub delete: Mutation<String>,
    pub providers: Query<(), ProvidersResponse>,
    pub history: Query<ReviewsQuery, ReviewsListResponse>,
    pub review_detail: Query<String, AnalyzeResponse>,
    pub pager: HistoryPager,
    pub selected_review: usize,
    pub result_scroll: u16,
    pub detail_scroll: u16,
    pub help_scroll: u16,
    pub notice: Option<Notice>,
    pub spinner_frame: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Arc<Config>, client: ApiClient) -> Self {
        let caches = QueryCaches::default();
        let provider = Some(config.default_provider.clone()).filter(|p| !p.is_empty());
        Self {
            pager: HistoryPager::new(config.page_limit),
            providers: Query::new(caches.providers.clone()),
            history: Query::new(caches.reviews.clone()),
            review_detail: Query::new(caches.review.clone()),
            caches,
            config,
            client,
            state: AppState::Main,
            help_return: AppState::Main,
            tab: Tab::Review,
            input_mode: InputMode::Normal,
            form: CodeForm::new(provider),
            analyze: Mutation::new(),
            document: Mutation::new(),
            delete: Mutation::new(),
            selected_review: 0,
            result_scroll: 0,
            detail_scroll: 0,
            help_scroll: 0,
            notice: None,
            spinner_frame: 0,
            should_quit: false,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;

        self.load_providers();
        self.load_history();

        while !self.should_quit {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
            self.poll_updates();
            terminal.draw(|frame| ui::render(frame, self))?;
            self.handle_input(&mut terminal)?;
        }

        ui::restore_terminal(&mut terminal)?;
        Ok(())
    }

    /// Get the current spinner character for loading animations
    pub fn spinner_char(&self) -> &str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    pub fn set_notice(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notice = Some(Notice::new(level, message));
    }

    pub fn set_code(&mut self, code: String) {
        self.form.code = code;
        self.result_scroll = 0;
    }

    /// Load a source file into the form, detecting its language.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let code = editor::read_code_file(path)?;
        self.form.language = Language::detect(path);
        self.form.filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);
        self.set_code(code);
        Ok(())
    }

    pub fn load_providers(&mut self) {
        let client = self.client.clone();
        self.providers.set((), move || async move {
            client.list_providers().await.map_err(|e| e.to_string())
        });
    }

    pub fn reload_providers(&mut self) {
        let client = self.client.clone();
        self.providers.refetch(move || async move {
            client.list_providers().await.map_err(|e| e.to_string())
        });
    }

    /// Point the history list at the pager's current page and filter.
    pub fn load_history(&mut self) {
        loop {
            let query = self.pager.query();
            let client = self.client.clone();
            let key = query.clone();
            self.history.set(key, move || async move {
                client.list_reviews(&query).await.map_err(|e| e.to_string())
            });
            // Cache hits are shown immediately and never pass through polling.
            if !self.sync_history_pager() {
                break;
            }
        }
    }

    /// Take the page count from the displayed list. Returns `true` when the
    /// requested page fell out of range and has to be loaded again.
    pub(crate) fn sync_history_pager(&mut self) -> bool {
        let Some(list) = self.history.data() else {
            return false;
        };
        let pagination = list.pagination;
        let count = list.reviews.len();

        let requested = self.pager.page;
        self.pager.apply(&pagination);
        self.selected_review = self.selected_review.min(count.saturating_sub(1));
        self.pager.page != requested
    }

    pub fn refresh_history(&mut self) {
        self.caches.reviews.invalidate_all();
        self.load_history();
    }

    pub fn history_prev_page(&mut self) {
        if self.pager.prev() {
            self.selected_review = 0;
            self.load_history();
        }
    }

    pub fn history_next_page(&mut self) {
        if self.pager.next() {
            self.selected_review = 0;
            self.load_history();
        }
    }

    pub fn cycle_history_filter(&mut self) {
        self.pager.cycle_filter();
        self.selected_review = 0;
        // only the active filter's pages are worth keeping
        let language = self.pager.language();
        self.caches
            .reviews
            .retain(|key| key.language.as_deref() == language);
        self.load_history();
    }

    pub fn history_reviews(&self) -> &[ReviewSummary] {
        self.history
            .data()
            .map(|list| list.reviews.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_review_summary(&self) -> Option<&ReviewSummary> {
        self.history_reviews().get(self.selected_review)
    }

    /// Submit the form for review. Blank code is rejected without a request.
    pub fn submit_analyze(&mut self) {
        if let Err(e) = validate_code(&self.form.code) {
            self.analyze.fail(e.to_string());
            return;
        }
        let request = self.form.analyze_request();
        let client = self.client.clone();
        tracing::info!(language = %request.language, "submitting code for review");
        self.result_scroll = 0;
        self.analyze.mutate(async move {
            client.analyze(&request).await.map_err(|e| e.to_string())
        });
    }

    pub fn submit_document(&mut self) {
        if let Err(e) = validate_code(&self.form.code) {
            self.document.fail(e.to_string());
            return;
        }
        let request = self.form.document_request();
        let client = self.client.clone();
        tracing::info!(language = %request.language, "submitting code for documentation");
        self.result_scroll = 0;
        self.document.mutate(async move {
            client.document(&request).await.map_err(|e| e.to_string())
        });
    }

    pub fn open_review(&mut self, review_id: String) {
        self.state = AppState::ReviewDetail;
        self.detail_scroll = 0;
        let client = self.client.clone();
        let id = review_id.clone();
        self.review_detail.set(review_id, move || async move {
            client.get_review(&id).await.map_err(|e| e.to_string())
        });
    }

    pub fn reload_review(&mut self) {
        let Some(id) = self.review_detail.key().cloned() else {
            return;
        };
        let client = self.client.clone();
        self.review_detail.refetch(move || async move {
            client.get_review(&id).await.map_err(|e| e.to_string())
        });
    }

    /// Ask for confirmation before deleting `review_id`.
    pub fn request_delete(&mut self, review_id: String) {
        if self.delete.is_pending() {
            self.set_notice(NoticeLevel::Warning, "A delete is already in progress");
            return;
        }
        self.input_mode = InputMode::ConfirmDelete(review_id);
    }

    pub fn confirm_delete(&mut self, review_id: String) {
        self.input_mode = InputMode::Normal;
        let client = self.client.clone();
        tracing::info!(review_id = %review_id, "deleting review");
        self.delete.mutate(async move {
            client
                .delete_review(&review_id)
                .await
                .map_err(|e| e.to_string())?;
            Ok(review_id)
        });
    }

    pub fn open_help(&mut self) {
        if self.state != AppState::Help {
            self.help_return = self.state;
        }
        self.help_scroll = 0;
        self.state = AppState::Help;
    }

    pub fn close_help(&mut self) {
        self.state = self.help_return;
    }

    pub fn back_to_history(&mut self) {
        self.state = AppState::Main;
        self.tab = Tab::History;
        self.review_detail.clear();
    }

    /// Provider list for the form badges, or empty while loading/failed.
    pub fn provider_list(&self) -> &[crate::api::LlmProvider] {
        self.providers
            .data()
            .map(|p| p.providers.as_slice())
            .unwrap_or(&[])
    }

    #[cfg(test)]
    pub fn new_for_test() -> Self {
        let client = ApiClient::new("http://127.0.0.1:9", Some(Duration::from_millis(200)))
            .unwrap_or_else(|e| panic!("test client: {}", e));
        Self::new(Arc::new(Config::default()), client)
    }
}
