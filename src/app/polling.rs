use crate::query::RequestState;

use super::{App, AppState, NoticeLevel, NOTICE_TTL};

impl App {
    /// Drain every background result that has arrived since the last tick.
    pub(crate) fn poll_updates(&mut self) {
        self.poll_history_updates();
        self.providers.poll();
        self.review_detail.poll();
        self.poll_analyze_updates();
        self.poll_document_updates();
        self.poll_delete_updates();
        self.expire_notice();
    }

    fn poll_history_updates(&mut self) {
        // The page we asked for no longer exists (e.g. last item deleted).
        if self.history.poll() && self.sync_history_pager() {
            self.load_history();
        }
    }

    fn poll_analyze_updates(&mut self) {
        let caches = &self.caches;
        let settled = self.analyze.poll(|response| {
            tracing::info!(review_id = %response.review_id, "review completed");
            // the backend stores every analysis, so history is now stale
            caches.reviews.invalidate_all();
        });
        if settled {
            if let RequestState::Error(message) = self.analyze.state() {
                tracing::warn!(error = %message, "review failed");
            }
        }
    }

    fn poll_document_updates(&mut self) {
        let settled = self.document.poll(|response| {
            tracing::info!(doc_id = %response.doc_id, "documentation completed");
        });
        if settled {
            if let RequestState::Error(message) = self.document.state() {
                tracing::warn!(error = %message, "documentation failed");
            }
        }
    }

    fn poll_delete_updates(&mut self) {
        let mut deleted: Option<String> = None;
        if !self.delete.poll(|id| deleted = Some(id.clone())) {
            return;
        }

        match deleted {
            Some(id) => {
                self.caches.invalidate_reviews();
                self.set_notice(NoticeLevel::Info, format!("Deleted review {}", id));
                if self.state == AppState::ReviewDetail
                    && self.review_detail.key().is_some_and(|k| *k == id)
                {
                    self.back_to_history();
                }
                self.load_history();
            }
            None => {
                let message = self
                    .delete
                    .state()
                    .error()
                    .unwrap_or("Delete failed")
                    .to_string();
                self.set_notice(NoticeLevel::Error, format!("Delete failed: {}", message));
            }
        }
    }

    fn expire_notice(&mut self) {
        if self
            .notice
            .as_ref()
            .is_some_and(|n| n.at.elapsed() >= NOTICE_TTL)
        {
            self.notice = None;
        }
    }
}
