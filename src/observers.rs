use crate::book::BookId;
use crate::constants::BOOKMARK_MIN_TEXT_LENGTH;
use crate::error::ObserverError;
use crate::notifier::{SelectionEvent, SelectionObserver};
use crate::store::BookmarkRepository;
use crate::translate::{RequestSequence, TranslationUpdate, Translator};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use tracing::{debug, info};
use unicode_segmentation::UnicodeSegmentation;

/// Writes every selection to the tracing log.
#[derive(Debug, Default)]
pub struct LogObserver;

impl SelectionObserver for LogObserver {
    fn name(&self) -> &str {
        "log"
    }

    fn on_text_selected(&mut self, event: &SelectionEvent) -> Result<(), ObserverError> {
        info!(
            page = event.page,
            line = event.absolute_line,
            "Selected text: {:?}",
            event.text
        );
        Ok(())
    }
}

/// Saves a bookmark when the selected text is long enough.
pub struct BookmarkObserver {
    repository: Rc<dyn BookmarkRepository>,
    book_id: Option<BookId>,
}

impl BookmarkObserver {
    pub fn new(repository: Rc<dyn BookmarkRepository>, book_id: Option<BookId>) -> Self {
        Self {
            repository,
            book_id,
        }
    }

    pub fn qualifies(text: &str) -> bool {
        text.graphemes(true).count() > BOOKMARK_MIN_TEXT_LENGTH
    }
}

impl SelectionObserver for BookmarkObserver {
    fn name(&self) -> &str {
        "bookmark"
    }

    fn on_text_selected(&mut self, event: &SelectionEvent) -> Result<(), ObserverError> {
        let Some(book_id) = self.book_id else {
            return Ok(());
        };
        if !Self::qualifies(&event.text) {
            debug!("Selection too short for a bookmark");
            return Ok(());
        }

        self.repository.add_bookmark(
            book_id,
            event.page,
            event.absolute_line,
            Some(&event.text),
        )?;
        Ok(())
    }
}

/// Translates selections on a worker thread and reports through a channel.
///
/// Each dispatch draws a number from the shared [`RequestSequence`]; the
/// receiving side should drop completions that are no longer current.
pub struct TranslationObserver {
    translator: Arc<dyn Translator>,
    source_lang: String,
    target_lang: String,
    sequence: RequestSequence,
    updates: Sender<TranslationUpdate>,
}

impl TranslationObserver {
    pub fn new(
        translator: Arc<dyn Translator>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        sequence: RequestSequence,
        updates: Sender<TranslationUpdate>,
    ) -> Self {
        Self {
            translator,
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            sequence,
            updates,
        }
    }
}

impl SelectionObserver for TranslationObserver {
    fn name(&self) -> &str {
        "translation"
    }

    fn on_text_selected(&mut self, event: &SelectionEvent) -> Result<(), ObserverError> {
        let seq = self.sequence.next();
        self.updates
            .send(TranslationUpdate::Requested {
                seq,
                text: event.text.clone(),
                absolute_line: event.absolute_line,
            })
            .map_err(|_| ObserverError::Disconnected)?;

        let translator = Arc::clone(&self.translator);
        let tx = self.updates.clone();
        let text = event.text.clone();
        let source = self.source_lang.clone();
        let target = self.target_lang.clone();

        std::thread::spawn(move || {
            let result = translator
                .translate(&text, &source, &target)
                .map_err(|err| err.to_string());
            debug!("Translation {} finished (ok: {})", seq, result.is_ok());
            let _ = tx.send(TranslationUpdate::Completed { seq, result });
        });

        Ok(())
    }
}
