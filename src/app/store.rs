use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::app::model::{Analysis, Book};

pub const DUPLICATE_BOOK_MESSAGE: &str = "This book is already in the list!";
pub const BOOK_NOT_FOUND_MESSAGE: &str = "Book not found. Please check the Book ID.";

/// One immutable snapshot of everything the page shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub pending_id: String,
    pub books: Vec<Book>,
    pub fetching: bool,
    pub analyzing: BTreeSet<String>,
    pub expanded: Option<String>,
    pub notification: Option<Notification>,
    #[serde(skip)]
    next_notification_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
}

impl ViewState {
    pub fn contains(&self, book_id: &str) -> bool {
        self.books.iter().any(|book| book.book_id == book_id)
    }

    pub fn book(&self, book_id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.book_id == book_id)
    }

    pub fn is_analyzing(&self, book_id: &str) -> bool {
        self.analyzing.contains(book_id)
    }

    /// The analysis whose panel is open, if the expanded book has one.
    pub fn expanded_analysis(&self) -> Option<(&Book, &Analysis)> {
        let book = self.book(self.expanded.as_deref()?)?;
        Some((book, book.analysis.as_ref()?))
    }

    pub fn is_busy(&self) -> bool {
        self.fetching || !self.analyzing.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetPendingId(String),
    BooksListed(Vec<Book>),
    FetchStarted,
    FetchSucceeded(Book),
    FetchNotFound,
    FetchFailed,
    AnalysisStarted(String),
    AnalysisSucceeded { book_id: String, analysis: Analysis },
    AnalysisFailed(String),
    ToggleExpanded(String),
    Notify(String),
    /// Clears the notification with this id; a newer one is left alone.
    DismissNotification(u64),
    ExpireNotification(u64),
}

pub fn reduce(state: &ViewState, action: Action) -> ViewState {
    let mut next = state.clone();
    match action {
        Action::SetPendingId(value) => next.pending_id = value,
        Action::BooksListed(books) => {
            next.books = books.into_iter().map(Book::without_analysis).collect();
        }
        Action::FetchStarted => next.fetching = true,
        Action::FetchSucceeded(book) => {
            next.fetching = false;
            // The catalog normalizes ids ("084" comes back as "84").
            if next.contains(&book.book_id) {
                tracing::info!(book_id = %book.book_id, "fetched book is already listed");
                notify(&mut next, DUPLICATE_BOOK_MESSAGE.to_owned());
            } else {
                next.books.push(book.without_analysis());
            }
        }
        Action::FetchNotFound => {
            next.fetching = false;
            notify(&mut next, BOOK_NOT_FOUND_MESSAGE.to_owned());
        }
        Action::FetchFailed => next.fetching = false,
        Action::AnalysisStarted(book_id) => {
            next.analyzing.insert(book_id);
        }
        Action::AnalysisSucceeded { book_id, analysis } => {
            match next.books.iter_mut().find(|book| book.book_id == book_id) {
                Some(book) => book.analysis = Some(analysis),
                None => tracing::warn!(book_id = %book_id, "analyzed book is not listed"),
            }
            next.analyzing.remove(&book_id);
        }
        Action::AnalysisFailed(book_id) => {
            next.analyzing.remove(&book_id);
        }
        Action::ToggleExpanded(book_id) => {
            let has_analysis = next
                .book(&book_id)
                .is_some_and(|book| book.analysis.is_some());
            if has_analysis {
                next.expanded = if next.expanded.as_deref() == Some(book_id.as_str()) {
                    None
                } else {
                    Some(book_id)
                };
            }
        }
        Action::Notify(message) => notify(&mut next, message),
        Action::DismissNotification(id) | Action::ExpireNotification(id) => {
            if next.notification.as_ref().is_some_and(|n| n.id == id) {
                next.notification = None;
            }
        }
    }
    next
}

fn notify(state: &mut ViewState, message: String) {
    state.next_notification_id += 1;
    state.notification = Some(Notification {
        id: state.next_notification_id,
        message,
    });
}

/// Holds the current snapshot; every transition replaces it whole.
#[derive(Debug)]
pub struct Store {
    tx: watch::Sender<Arc<ViewState>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(ViewState::default())
    }
}

impl Store {
    pub fn new(initial: ViewState) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self { tx }
    }

    pub fn snapshot(&self) -> Arc<ViewState> {
        Arc::clone(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ViewState>> {
        self.tx.subscribe()
    }

    /// Applies `action` and returns the snapshot it produced.
    pub fn dispatch(&self, action: Action) -> Arc<ViewState> {
        tracing::debug!(?action, "dispatch");
        let mut produced = self.snapshot();
        self.tx.send_modify(|current| {
            produced = Arc::new(reduce(current, action));
            *current = Arc::clone(&produced);
        });
        produced
    }
}
