//! The review list.
//!
//! The list is fetched once and kept until it is invalidated, which happens
//! whenever the operator leaves the editor.

use tracing::instrument;

use crate::{
    backend::Backend,
    controller::Message,
    domain::{ReviewSummary, labels},
};

/// Holds the review list.
#[derive(Debug, Clone, Default)]
pub struct ListController {
    reviews: Vec<ReviewSummary>,
    loaded: bool,
    message: Option<Message>,
}

impl ListController {
    /// Creates an empty, not yet loaded list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the summaries, unless they were already fetched.
    pub async fn load<B: Backend>(&mut self, backend: &B) {
        if !self.loaded {
            self.refresh(backend).await;
        }
    }

    /// Fetches the summaries again.
    ///
    /// A failed fetch leaves the list empty and sets an error banner.
    #[instrument(skip_all)]
    pub async fn refresh<B: Backend>(&mut self, backend: &B) {
        match backend.list_reviews().await {
            Ok(reviews) => {
                tracing::debug!(count = reviews.len(), "review list loaded");
                self.reviews = reviews;
                if self.message.as_ref().is_some_and(Message::is_error) {
                    self.message = None;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load review list");
                self.reviews.clear();
                self.message = Some(Message::Error(labels::MESSAGE_REVIEW_ERROR.to_string()));
            }
        }
        self.loaded = true;
    }

    /// Marks the list as stale so the next [`ListController::load`] fetches
    /// it again.
    pub const fn invalidate(&mut self) {
        self.loaded = false;
    }

    /// Whether the list has been fetched.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The fetched summaries.
    #[must_use]
    pub fn reviews(&self) -> &[ReviewSummary] {
        &self.reviews
    }

    /// The id of the review at `index`.
    #[must_use]
    pub fn select(&self, index: usize) -> Option<&str> {
        self.reviews.get(index).map(|review| review.id.as_str())
    }

    /// The banner to show, if any.
    #[must_use]
    pub const fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    /// Sets the banner to show.
    pub fn notify(&mut self, message: Message) {
        self.message = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::testing::{Call, RecordingBackend, inapplicable_review};

    #[tokio::test]
    async fn load_fetches_once() {
        let backend = RecordingBackend::default()
            .with_review(inapplicable_review("b"))
            .with_review(inapplicable_review("a"));
        let mut list = ListController::new();

        list.load(&backend).await;
        list.load(&backend).await;

        assert_eq!(backend.calls(), vec![Call::List]);
        assert_eq!(list.reviews().len(), 2);
        assert_eq!(list.select(0), Some("a"));
        assert_eq!(list.select(2), None);
    }

    #[tokio::test]
    async fn invalidated_list_is_fetched_again() {
        let backend = RecordingBackend::default();
        let mut list = ListController::new();

        list.load(&backend).await;
        list.invalidate();
        list.load(&backend).await;

        assert_eq!(backend.calls(), vec![Call::List, Call::List]);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_list_empty() {
        let backend = RecordingBackend::failing(503);
        let mut list = ListController::new();

        list.load(&backend).await;

        assert!(list.reviews().is_empty());
        assert!(list.is_loaded());
        assert!(list.message().is_some_and(Message::is_error));
    }
}
