//! Search dialog session.
//!
//! The dialog runs in its own modal context. It accumulates result
//! pages for the current keyword and returns exactly one outcome to the
//! field through a one-shot channel: the selected [`SearchResult`], or
//! `None` when the editor cancels or the dialog goes away.

use std::sync::Arc;

use brandlink_core::SearchResult;
use tokio::sync::oneshot;

use crate::api::{MediaSearch, SearchFailure, SearchQuery};

/// Result of loading a page into the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// A page was loaded and `appended` results were added.
    Loaded { appended: usize, has_more: bool },
    /// No further pages exist; nothing was requested.
    Exhausted,
    /// The request failed; previously loaded results are kept.
    Failed(SearchFailure),
}

/// Receiving side of the dialog's close channel.
pub struct DialogReturn {
    receiver: oneshot::Receiver<Option<SearchResult>>,
}

impl DialogReturn {
    /// Wait for the dialog to close.
    pub async fn selection(self) -> Option<SearchResult> {
        self.receiver.await.ok().flatten()
    }
}

/// State of an open search dialog.
pub struct SearchDialog {
    search: Arc<dyn MediaSearch>,
    page_size: u32,
    keyword: String,
    results: Vec<SearchResult>,
    next_page: u32,
    has_more: bool,
    searched: bool,
    last_failure: Option<SearchFailure>,
    closer: Option<oneshot::Sender<Option<SearchResult>>>,
}

impl SearchDialog {
    /// Open a dialog; the returned [`DialogReturn`] resolves when it closes.
    pub fn open(search: Arc<dyn MediaSearch>, page_size: u32) -> (Self, DialogReturn) {
        let (closer, receiver) = oneshot::channel();
        let dialog = Self {
            search,
            page_size: page_size.max(1),
            keyword: String::new(),
            results: Vec::new(),
            next_page: 1,
            has_more: false,
            searched: false,
            last_failure: None,
            closer: Some(closer),
        };
        (dialog, DialogReturn { receiver })
    }

    /// Start a new search for `keyword`, replacing the current results
    /// once the first page arrives.
    pub async fn search(&mut self, keyword: &str) -> SearchStatus {
        let query = SearchQuery::new(keyword, 1, self.page_size);
        match self.search.search(&query).await {
            Ok(page) => {
                let has_more = page.has_more();
                let appended = page.results.len();
                self.keyword = keyword.to_string();
                self.results = page.results;
                self.next_page = 2;
                self.has_more = has_more;
                self.searched = true;
                self.last_failure = None;
                SearchStatus::Loaded { appended, has_more }
            }
            Err(e) => self.record_failure(&e),
        }
    }

    /// Append the next page of the current search.
    pub async fn load_more(&mut self) -> SearchStatus {
        if !self.has_more {
            return SearchStatus::Exhausted;
        }
        let query = SearchQuery::new(self.keyword.clone(), self.next_page, self.page_size);
        match self.search.search(&query).await {
            Ok(page) => {
                let has_more = page.has_more();
                let appended = page.results.len();
                self.results.extend(page.results);
                self.next_page += 1;
                self.has_more = has_more;
                self.last_failure = None;
                SearchStatus::Loaded { appended, has_more }
            }
            Err(e) => self.record_failure(&e),
        }
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Message for the last failed request, if the last request failed.
    pub fn error_message(&self) -> Option<&'static str> {
        self.last_failure.map(|f| f.message())
    }

    /// A non-blank search completed and found nothing.
    pub fn shows_no_results(&self) -> bool {
        self.searched && !self.keyword.trim().is_empty() && self.results.is_empty()
    }

    pub fn is_open(&self) -> bool {
        self.closer.is_some()
    }

    /// Close the dialog with the result whose id is `id`.
    ///
    /// Returns the selected result, or `None` if no loaded result has
    /// that id or the dialog is already closed.
    pub fn select(&mut self, id: &str) -> Option<SearchResult> {
        let selected = self.results.iter().find(|r| r.id == id)?.clone();
        let closer = self.closer.take()?;
        tracing::info!(media_id = %selected.id, "Brand portal asset selected");
        let _ = closer.send(Some(selected.clone()));
        Some(selected)
    }

    /// Close the dialog without a selection.
    pub fn cancel(&mut self) {
        if let Some(closer) = self.closer.take() {
            let _ = closer.send(None);
        }
    }

    fn record_failure(&mut self, error: &crate::api::SearchError) -> SearchStatus {
        let failure = error.failure();
        tracing::warn!(error = %error, ?failure, "Brand portal search failed");
        self.last_failure = Some(failure);
        SearchStatus::Failed(failure)
    }
}
