use std::time::Instant;

use crate::api::{AnalyzeRequest, DocumentRequest, LlmProvider};
use crate::language::{DocStyle, Language};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Review,
    Docs,
    History,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Review, Tab::Docs, Tab::History];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Review => "Review",
            Tab::Docs => "Docs",
            Tab::History => "History",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Review => 0,
            Tab::Docs => 1,
            Tab::History => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// One of the three tabs.
    Main,
    /// A single stored review opened from history.
    ReviewDetail,
    Help,
}

/// Modal text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing a path for `o` (load file).
    FilePath(String),
    /// Waiting for `y` to delete the given review.
    ConfirmDelete(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Transient status line message.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: Instant,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            at: Instant::now(),
        }
    }
}

/// Work that needs the real terminal (suspend/resume), handled by the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalAction {
    OpenEditor,
}

/// Inputs shared by the Review and Docs tabs.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeForm {
    pub code: String,
    pub language: Language,
    pub filename: Option<String>,
    /// Provider id; `None` leaves the choice to the backend default.
    pub provider: Option<String>,
    pub doc_style: DocStyle,
}

impl CodeForm {
    pub fn new(provider: Option<String>) -> Self {
        Self {
            code: String::new(),
            language: Language::default(),
            filename: None,
            provider,
            doc_style: DocStyle::default(),
        }
    }

    pub fn analyze_request(&self) -> AnalyzeRequest {
        AnalyzeRequest {
            code: self.code.clone(),
            language: self.language,
            filename: self.filename.clone(),
            llm_provider: self.provider.clone(),
        }
    }

    pub fn document_request(&self) -> DocumentRequest {
        DocumentRequest {
            code: self.code.clone(),
            language: self.language,
            filename: self.filename.clone(),
            doc_style: Some(self.doc_style),
            llm_provider: self.provider.clone(),
        }
    }

    /// Step to the next provider in `providers`, wrapping around.
    pub fn cycle_provider(&mut self, providers: &[LlmProvider]) {
        if providers.is_empty() {
            return;
        }
        let current = self
            .provider
            .as_deref()
            .and_then(|id| providers.iter().position(|p| p.id == id));
        let next = match current {
            Some(idx) => (idx + 1) % providers.len(),
            None => 0,
        };
        self.provider = Some(providers[next].id.clone());
    }
}
