use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::app::effects::Effects;
use crate::app::store::{Action, DUPLICATE_BOOK_MESSAGE, Store, ViewState};
use crate::catalog::{Catalog, Outcome};

pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_millis(3000);

/// The Book Lookup & Analysis view: user intents in, store transitions out.
#[derive(Clone)]
pub struct View {
    store: Arc<Store>,
    catalog: Arc<dyn Catalog>,
    effects: Effects,
    notification_ttl: Duration,
}

impl View {
    pub fn new(catalog: Arc<dyn Catalog>, notification_ttl: Duration) -> Self {
        Self {
            store: Arc::new(Store::default()),
            catalog,
            effects: Effects::new(),
            notification_ttl,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn snapshot(&self) -> Arc<ViewState> {
        self.store.snapshot()
    }

    pub fn notification_ttl(&self) -> Duration {
        self.notification_ttl
    }

    /// Loads the initial listing. Failures are logged and leave the list empty.
    pub fn mount(&self) -> JoinHandle<()> {
        let view = self.clone();
        self.effects.spawn(async move {
            match view.catalog.list_books().await {
                Outcome::Found(books) => {
                    tracing::info!(count = books.len(), "loaded book listing");
                    view.store.dispatch(Action::BooksListed(books));
                }
                Outcome::NotFound => {
                    tracing::error!("error fetching books: listing endpoint not found");
                }
                Outcome::Failed(err) => tracing::error!(?err, "error fetching books"),
            }
        })
    }

    /// Returns the handle of the issued request, or `None` when the input
    /// was rejected locally and nothing was sent.
    pub fn fetch_book(&self, input: &str) -> Option<JoinHandle<()>> {
        self.store.dispatch(Action::SetPendingId(input.to_owned()));

        let book_id = input.trim().to_owned();
        if book_id.is_empty() {
            return None;
        }
        if self.store.snapshot().contains(&book_id) {
            tracing::info!(book_id = %book_id, "book already listed");
            self.notify(DUPLICATE_BOOK_MESSAGE);
            return None;
        }

        self.store.dispatch(Action::FetchStarted);
        let view = self.clone();
        Some(self.effects.spawn(async move {
            let action = match view.catalog.get_book(&book_id).await {
                Outcome::Found(book) => {
                    tracing::info!(book_id = %book.book_id, title = %book.title, "fetched book");
                    Action::FetchSucceeded(book)
                }
                Outcome::NotFound => {
                    tracing::info!(book_id = %book_id, "book not found");
                    Action::FetchNotFound
                }
                Outcome::Failed(err) => {
                    tracing::error!(book_id = %book_id, ?err, "error fetching book");
                    Action::FetchFailed
                }
            };
            view.dispatch_with_expiry(action);
        }))
    }

    /// Requests an analysis for a listed book. Returns `None` when the book
    /// is not listed or an analysis for it is already in flight.
    pub fn analyze_book(&self, book_id: &str) -> Option<JoinHandle<()>> {
        let snapshot = self.store.snapshot();
        if !snapshot.contains(book_id) {
            tracing::warn!(book_id, "analyze requested for unlisted book");
            return None;
        }
        if snapshot.is_analyzing(book_id) {
            tracing::debug!(book_id, "analysis already in flight");
            return None;
        }

        let book_id = book_id.to_owned();
        self.store.dispatch(Action::AnalysisStarted(book_id.clone()));

        let view = self.clone();
        Some(self.effects.spawn(async move {
            let action = match view.catalog.analyze_book(&book_id).await {
                Outcome::Found(analysis) => {
                    tracing::info!(book_id = %book_id, "analysis ready");
                    Action::AnalysisSucceeded { book_id, analysis }
                }
                Outcome::NotFound => {
                    tracing::error!(book_id = %book_id, "error analyzing book: not found");
                    Action::AnalysisFailed(book_id)
                }
                Outcome::Failed(err) => {
                    tracing::error!(book_id = %book_id, ?err, "error analyzing book");
                    Action::AnalysisFailed(book_id)
                }
            };
            view.store.dispatch(action);
        }))
    }

    pub fn toggle_analysis(&self, book_id: &str) {
        self.store.dispatch(Action::ToggleExpanded(book_id.to_owned()));
    }

    pub fn notify(&self, message: &str) {
        let snapshot = self.store.dispatch(Action::Notify(message.to_owned()));
        self.schedule_expiry(&snapshot);
    }

    pub fn dismiss_notification(&self, id: u64) {
        self.store.dispatch(Action::DismissNotification(id));
    }

    /// Abandons every outstanding request; their completions are never applied.
    pub fn shutdown(&self) {
        tracing::info!("view shutting down");
        self.effects.shutdown();
    }

    // Completions may raise a warning (not found, or an id the catalog
    // normalized onto a listed book); each new one gets its own timer.
    fn dispatch_with_expiry(&self, action: Action) {
        let before = self.store.snapshot().notification.as_ref().map(|n| n.id);
        let snapshot = self.store.dispatch(action);
        if snapshot.notification.as_ref().map(|n| n.id) != before {
            self.schedule_expiry(&snapshot);
        }
    }

    fn schedule_expiry(&self, snapshot: &ViewState) {
        let Some(notification) = &snapshot.notification else {
            return;
        };
        let id = notification.id;
        let ttl = self.notification_ttl;
        let store = Arc::clone(&self.store);
        self.effects.spawn(async move {
            tokio::time::sleep(ttl).await;
            store.dispatch(Action::ExpireNotification(id));
        });
    }
}
