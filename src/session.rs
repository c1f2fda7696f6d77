use crate::book::{self, Book, Bookmark};
use crate::constants::{MAX_DISPLAY_LINE_LENGTH, MAX_SEARCH_RESULTS, MIN_SEARCH_QUERY_LENGTH};
use crate::error::{LoadError, StoreError};
use crate::notifier::{FanOut, ObserverId, SelectionNotifier};
use crate::observers::{BookmarkObserver, LogObserver, TranslationObserver};
use crate::paginator::{PageSize, Paginator};
use crate::store::BookmarkRepository;
use crate::translate::{RequestSequence, TranslationUpdate, Translator};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub line: usize,
    pub page: usize,
    pub context: String,
}

/// State of the one book being read: its pages, the selection observers,
/// and the translation sequence that outstanding requests are checked against.
pub struct ReadingSession {
    paginator: Paginator,
    notifier: SelectionNotifier,
    book: Option<Book>,
    bookmarks: Rc<dyn BookmarkRepository>,
    bookmark_observer: ObserverId,
    sequence: RequestSequence,
    status_message: String,
}

impl ReadingSession {
    pub fn new(page_size: PageSize, bookmarks: Rc<dyn BookmarkRepository>) -> Self {
        let mut notifier = SelectionNotifier::new(page_size);
        notifier.register(Box::new(LogObserver));
        let bookmark_observer =
            notifier.register(Box::new(BookmarkObserver::new(Rc::clone(&bookmarks), None)));

        Self {
            paginator: Paginator::new(page_size),
            notifier,
            book: None,
            bookmarks,
            bookmark_observer,
            sequence: RequestSequence::new(),
            status_message: "Ready to load a book".to_string(),
        }
    }

    /// Registers the translation observer and returns the channel its
    /// requests and results arrive on.
    pub fn enable_translation(
        &mut self,
        translator: Arc<dyn Translator>,
        source_lang: &str,
        target_lang: &str,
    ) -> Receiver<TranslationUpdate> {
        let (tx, rx) = mpsc::channel();
        self.notifier.register(Box::new(TranslationObserver::new(
            translator,
            source_lang,
            target_lang,
            self.sequence.clone(),
            tx,
        )));
        rx
    }

    /// Loads `book`. On failure nothing about the current session changes.
    pub fn open_book(&mut self, book: Book) -> Result<usize, LoadError> {
        let lines = match book::read_lines(&book.file_path) {
            Ok(lines) => lines,
            Err(err) => {
                warn!("Failed to load {:?}: {}", book.file_path, err);
                self.status_message = "Failed to load book".to_string();
                return Err(err);
            }
        };

        let line_count = lines.len();
        self.paginator.load_lines(lines);
        let observer = BookmarkObserver::new(Rc::clone(&self.bookmarks), Some(book.id));
        if let Err(observer) = self.notifier.replace(self.bookmark_observer, Box::new(observer)) {
            self.bookmark_observer = self.notifier.register(observer);
        }
        self.sequence.invalidate();

        info!("Opened '{}' with {} lines", book.title, line_count);
        self.status_message = format!("Book loaded! Lines: {}", line_count);
        self.book = Some(book);
        Ok(line_count)
    }

    pub fn book(&self) -> Option<&Book> {
        self.book.as_ref()
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn notifier(&self) -> &SelectionNotifier {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut SelectionNotifier {
        &mut self.notifier
    }

    pub fn sequence(&self) -> &RequestSequence {
        &self.sequence
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn go_to(&mut self, page: i64) {
        self.paginator.go_to(page);
    }

    pub fn next_page(&mut self) {
        self.paginator.next_page();
    }

    pub fn previous_page(&mut self) {
        self.paginator.previous_page();
    }

    pub fn first_page(&mut self) {
        self.paginator.first_page();
    }

    pub fn last_page(&mut self) {
        self.paginator.last_page();
    }

    pub fn go_to_line(&mut self, absolute_line: usize) {
        let page = self.paginator.page_for_line(absolute_line);
        self.paginator.go_to(page as i64);
    }

    /// Publishes a selection made on the current page.
    pub fn select(&mut self, text: &str, in_page_offset: usize) -> FanOut {
        self.notifier
            .handle_selection_changed(text, self.paginator.page_index(), in_page_offset)
    }

    /// Stops any in-flight translation from being shown.
    pub fn cancel_translations(&self) {
        self.sequence.invalidate();
    }

    pub fn bookmarks(&self) -> Result<Vec<Bookmark>, StoreError> {
        match &self.book {
            Some(book) => self.bookmarks.list_bookmarks(book.id),
            None => Ok(Vec::new()),
        }
    }

    /// Case-insensitive search over the loaded lines.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_QUERY_LENGTH {
            return Vec::new();
        }
        let query_lower = query.to_lowercase();

        self.paginator
            .lines()
            .iter()
            .enumerate()
            .filter(|(_, line)| line.to_lowercase().contains(&query_lower))
            .take(MAX_SEARCH_RESULTS)
            .map(|(line, text)| SearchHit {
                line,
                page: self.paginator.page_for_line(line),
                context: truncate_for_display(text.trim()),
            })
            .collect()
    }
}

pub fn truncate_for_display(line: &str) -> String {
    if line.chars().count() > MAX_DISPLAY_LINE_LENGTH {
        let truncated: String = line.chars().take(MAX_DISPLAY_LINE_LENGTH - 3).collect();
        format!("{}...", truncated)
    } else {
        line.to_string()
    }
}
