use crate::api::{Pagination, ReviewsQuery};

/// Language filter choices offered on the history tab; `None` is "All".
pub const HISTORY_FILTERS: [Option<&str>; 6] = [
    None,
    Some("python"),
    Some("javascript"),
    Some("typescript"),
    Some("java"),
    Some("go"),
];

/// Page/filter position of the history list.
///
/// `pages` is whatever the last response reported; until one arrives the
/// pager assumes a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPager {
    pub page: u32,
    pub limit: u32,
    filter_index: usize,
    pages: u32,
}

impl HistoryPager {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            filter_index: 0,
            pages: 1,
        }
    }

    pub fn language(&self) -> Option<&'static str> {
        HISTORY_FILTERS[self.filter_index]
    }

    pub fn filter_label(&self) -> &'static str {
        self.language().unwrap_or("All")
    }

    pub fn query(&self) -> ReviewsQuery {
        ReviewsQuery::new(self.page, self.limit, self.language())
    }

    pub fn last_page(&self) -> u32 {
        self.pages.max(1)
    }

    /// Controls are only worth showing when there is somewhere to go.
    pub fn has_multiple_pages(&self) -> bool {
        self.pages > 1
    }

    pub fn can_prev(&self) -> bool {
        self.page > 1
    }

    pub fn can_next(&self) -> bool {
        self.page < self.last_page()
    }

    /// Move back one page. Returns `true` when the page changed.
    pub fn prev(&mut self) -> bool {
        self.go_to(self.page.saturating_sub(1))
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.page.saturating_add(1))
    }

    fn go_to(&mut self, page: u32) -> bool {
        let clamped = page.clamp(1, self.last_page());
        let changed = clamped != self.page;
        self.page = clamped;
        changed
    }

    /// Select the next language filter; always returns to page 1.
    pub fn cycle_filter(&mut self) {
        self.filter_index = (self.filter_index + 1) % HISTORY_FILTERS.len();
        self.page = 1;
        self.pages = 1;
    }

    pub fn set_filter(&mut self, language: Option<&str>) {
        self.filter_index = HISTORY_FILTERS
            .iter()
            .position(|f| *f == language)
            .unwrap_or(0);
        self.page = 1;
        self.pages = 1;
    }

    /// Take the page count from a response, pulling `page` back in range if
    /// the result set shrank (e.g. after a delete).
    pub fn apply(&mut self, pagination: &Pagination) {
        self.pages = pagination.pages;
        self.page = self.page.clamp(1, self.last_page());
    }
}
