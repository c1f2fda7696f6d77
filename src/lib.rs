pub mod book;
pub mod config;
pub mod constants;
pub mod error;
pub mod notifier;
pub mod observers;
pub mod paginator;
pub mod selection;
pub mod session;
pub mod store;
pub mod translate;
pub mod ui;

pub use book::{Book, BookId, Bookmark};
pub use config::Config;
pub use error::{ConfigError, LoadError, ObserverError, StoreError, TranslateError, UiError};
pub use notifier::{FanOut, ObserverId, SelectionEvent, SelectionNotifier, SelectionObserver};
pub use paginator::{PageSize, Paginator};
pub use session::ReadingSession;
pub use store::{BookRepository, BookmarkRepository, LibraryStore};
pub use translate::{HttpTranslator, RequestSequence, TranslationUpdate, Translator};
pub use ui::App;
